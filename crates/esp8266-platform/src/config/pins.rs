//! GPIO declarations.
//!
//! Each `[[pins]]` entry names a GPIO and how it should be driven. Pins below
//! 16 also contribute a boot-time initial state to the build context.

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// Highest GPIO number on the ESP8266.
pub const MAX_GPIO: u8 = 16;

/// How a GPIO is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PinMode {
    Input,
    InputPullup,
    /// Only available on GPIO16.
    InputPulldown,
    Output,
    OutputOpenDrain,
}

impl PinMode {
    const ALL: [PinMode; 5] = [
        PinMode::Input,
        PinMode::InputPullup,
        PinMode::InputPulldown,
        PinMode::Output,
        PinMode::OutputOpenDrain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PinMode::Input => "input",
            PinMode::InputPullup => "input_pullup",
            PinMode::InputPulldown => "input_pulldown",
            PinMode::Output => "output",
            PinMode::OutputOpenDrain => "output_open_drain",
        }
    }

    /// The Arduino `pinMode` constant for this mode.
    pub fn arduino_constant(&self) -> &'static str {
        match self {
            PinMode::Input => "INPUT",
            PinMode::InputPullup => "INPUT_PULLUP",
            PinMode::InputPulldown => "INPUT_PULLDOWN_16",
            PinMode::Output => "OUTPUT",
            PinMode::OutputOpenDrain => "OUTPUT_OPEN_DRAIN",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|m| m.as_str() == lower)
    }
}

/// A `[[pins]]` entry as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPin {
    pub number: PinNumber,
    /// `input` when absent.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub inverted: bool,
}

/// A GPIO given as a bare number or as a `GPIOn` name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinNumber {
    Index(i64),
    Name(String),
}

impl PinNumber {
    fn resolve(&self) -> Option<u8> {
        match self {
            PinNumber::Index(n) => u8::try_from(*n).ok().filter(|n| *n <= MAX_GPIO),
            PinNumber::Name(name) => parse_gpio_name(name),
        }
    }
}

/// A validated GPIO declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinConfig {
    pub number: u8,
    pub mode: PinMode,
    pub inverted: bool,
}

/// Validate one `[[pins]]` entry.
pub fn validate_pin(raw: &RawPin, path: &str) -> Result<PinConfig> {
    let number_path = format!("{path}.number");
    let number = raw.number.resolve().ok_or_else(|| {
        PlatformError::schema(&number_path, format!("expected a GPIO between 0 and {MAX_GPIO}"))
    })?;

    if (6..=11).contains(&number) {
        return Err(PlatformError::schema(
            number_path,
            "This pin cannot be used on ESP8266s and is already used by the flash interface \
             (function: SPI flash)",
        ));
    }

    let mode_path = format!("{path}.mode");
    let mode = match &raw.mode {
        Some(s) => PinMode::parse(s).ok_or_else(|| {
            PlatformError::schema(
                &mode_path,
                format!(
                    "unknown pin mode '{s}', expected one of: {}",
                    PinMode::ALL.map(|m| m.as_str()).join(", ")
                ),
            )
        })?,
        None => PinMode::Input,
    };

    match (number, mode) {
        (MAX_GPIO, PinMode::InputPullup) => {
            return Err(PlatformError::schema(mode_path, "GPIO16 does not support pullup pin mode"))
        }
        (n, PinMode::InputPulldown) if n != MAX_GPIO => {
            return Err(PlatformError::schema(mode_path, "Only GPIO16 supports pulldown pin mode"))
        }
        _ => {}
    }

    Ok(PinConfig {
        number,
        mode,
        inverted: raw.inverted,
    })
}

fn parse_gpio_name(s: &str) -> Option<u8> {
    let upper = s.trim().to_ascii_uppercase();
    let digits = upper.strip_prefix("GPIO")?;
    digits.parse::<u8>().ok().filter(|n| *n <= MAX_GPIO)
}
