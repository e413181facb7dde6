//! Durations written as a number followed by a unit, e.g. `"1d"` or `"2.5h"`.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::{ParseError, Result};

const MICROS_PER_MS: u64 = 1_000;
const MICROS_PER_S: u64 = 1_000_000;
const MICROS_PER_MIN: u64 = 60 * MICROS_PER_S;
const MICROS_PER_H: u64 = 60 * MICROS_PER_MIN;
const MICROS_PER_D: u64 = 24 * MICROS_PER_H;

const UNITS: &[(&str, u64)] = &[
    ("us", 1),
    ("microseconds", 1),
    ("ms", MICROS_PER_MS),
    ("milliseconds", MICROS_PER_MS),
    ("s", MICROS_PER_S),
    ("sec", MICROS_PER_S),
    ("seconds", MICROS_PER_S),
    ("min", MICROS_PER_MIN),
    ("minutes", MICROS_PER_MIN),
    ("h", MICROS_PER_H),
    ("hours", MICROS_PER_H),
    ("d", MICROS_PER_D),
    ("days", MICROS_PER_D),
];

/// A non-negative duration parsed from a unit-suffixed expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePeriod(Duration);

impl TimePeriod {
    /// Refresh period meaning "fetch on every build".
    pub const ALWAYS: TimePeriod = TimePeriod(Duration::ZERO);

    /// Refresh period meaning "never fetch again" (1000 years).
    pub const NEVER: TimePeriod = TimePeriod(Duration::from_secs(1000 * 365 * 24 * 60 * 60));

    pub const fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Parse an expression such as `"500ms"`, `"1.5 h"` or `"1d"`.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = |reason: String| ParseError::TimePeriod {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let unit = unit.trim();

        if number.is_empty() {
            return Err(invalid("expected a non-negative number".into()));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| invalid(format!("'{number}' is not a number")))?;

        if unit.is_empty() {
            return Err(invalid("expected time period with unit".into()));
        }
        let scale = UNITS
            .iter()
            .find(|(name, _)| *name == unit)
            .map(|(_, scale)| *scale)
            .ok_or_else(|| invalid(format!("unknown unit '{unit}'")))?;

        let micros = (value * scale as f64).round();
        if !micros.is_finite() || micros > u64::MAX as f64 {
            return Err(invalid("value is out of range".into()));
        }
        Ok(Self(Duration::from_micros(micros as u64)))
    }

    /// Parse a source refresh interval: `always`, `never`, or a time period.
    pub fn parse_refresh(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::ALWAYS),
            "never" => Ok(Self::NEVER),
            _ => Self::parse(s),
        }
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let micros = self.0.as_micros();
        if micros == 0 {
            return write!(f, "0s");
        }
        for (unit, scale) in [
            ("d", MICROS_PER_D),
            ("h", MICROS_PER_H),
            ("min", MICROS_PER_MIN),
            ("s", MICROS_PER_S),
            ("ms", MICROS_PER_MS),
        ] {
            let scale = u128::from(scale);
            if micros % scale == 0 {
                return write!(f, "{}{unit}", micros / scale);
            }
        }
        write!(f, "{micros}us")
    }
}

impl Serialize for TimePeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_days() {
        let p = TimePeriod::parse("1d").unwrap();
        assert_eq!(p.as_duration(), Duration::from_secs(86_400));
        assert_eq!(p.to_string(), "1d");
    }

    #[test]
    fn parse_long_units_and_whitespace() {
        assert_eq!(
            TimePeriod::parse("30 seconds").unwrap().as_duration(),
            Duration::from_secs(30)
        );
        assert_eq!(
            TimePeriod::parse(" 2 hours ").unwrap().as_duration(),
            Duration::from_secs(7_200)
        );
        assert_eq!(
            TimePeriod::parse("250ms").unwrap().as_duration(),
            Duration::from_millis(250)
        );
    }

    #[test]
    fn parse_fractional() {
        let p = TimePeriod::parse("1.5h").unwrap();
        assert_eq!(p.as_duration(), Duration::from_secs(5_400));
        assert_eq!(p.to_string(), "90min");
    }

    #[test]
    fn reject_missing_unit() {
        let err = TimePeriod::parse("10").unwrap_err();
        assert!(err.to_string().contains("unit"));
    }

    #[test]
    fn reject_unknown_unit_and_garbage() {
        assert!(TimePeriod::parse("10 fortnights").is_err());
        assert!(TimePeriod::parse("-5s").is_err());
        assert!(TimePeriod::parse("").is_err());
        assert!(TimePeriod::parse("1.2.3s").is_err());
    }

    #[test]
    fn refresh_keywords() {
        assert_eq!(TimePeriod::parse_refresh("always").unwrap(), TimePeriod::ALWAYS);
        assert_eq!(TimePeriod::parse_refresh("Never").unwrap(), TimePeriod::NEVER);
        assert_eq!(
            TimePeriod::parse_refresh("12h").unwrap().as_duration(),
            Duration::from_secs(43_200)
        );
        assert_eq!(TimePeriod::ALWAYS.to_string(), "0s");
    }

    #[test]
    fn display_falls_back_to_smaller_units() {
        assert_eq!(TimePeriod::parse("90s").unwrap().to_string(), "90s");
        assert_eq!(TimePeriod::parse("1500us").unwrap().to_string(), "1500us");
        assert_eq!(TimePeriod::parse("2000us").unwrap().to_string(), "2ms");
    }
}
