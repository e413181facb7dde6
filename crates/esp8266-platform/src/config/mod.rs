//! Normalized configuration for the `esp8266` block and its neighbours.
//!
//! `Raw*` records deserialized from TOML go in, typed records come out.
//! Every default has been applied and every alias resolved by the time a
//! [`PlatformConfig`] exists.

pub mod document;
pub mod final_validate;
pub mod pins;
pub mod schema;
pub mod source;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use esp8266_boards::FlashSize;
use esp8266_core::{TimePeriod, Version};
use serde::Serialize;

use crate::framework::FrameworkKind;

pub use document::{ConfigDocument, CoreSection, DEFAULT_CONFIG_FILE};
pub use final_validate::final_validate;
pub use pins::{PinConfig, PinMode, PinNumber, RawPin};
pub use schema::{validate_platform, RawFramework, RawPlatform, SchemaOptions};
pub use source::{ComponentSource, RawSource};

/// The normalized `esp8266` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformConfig {
    pub board: String,
    pub flash_size: FlashSize,
    /// Partition table file, resolved against the configuration directory.
    pub partitions: Option<PathBuf>,
    pub framework: FrameworkConfig,
}

/// Exactly one framework variant is active per build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum FrameworkConfig {
    #[serde(rename = "arduino")]
    Arduino(ArduinoFramework),
    #[serde(rename = "esp8266-rtos-sdk")]
    RtosSdk(RtosSdkFramework),
}

impl FrameworkConfig {
    pub fn kind(&self) -> FrameworkKind {
        match self {
            FrameworkConfig::Arduino(_) => FrameworkKind::Arduino,
            FrameworkConfig::RtosSdk(_) => FrameworkKind::RtosSdk,
        }
    }

    pub fn version(&self) -> &Version {
        match self {
            FrameworkConfig::Arduino(a) => &a.version,
            FrameworkConfig::RtosSdk(r) => &r.version,
        }
    }

    pub fn source(&self) -> &str {
        match self {
            FrameworkConfig::Arduino(a) => &a.source,
            FrameworkConfig::RtosSdk(r) => &r.source,
        }
    }

    pub fn platform_version(&self) -> &str {
        match self {
            FrameworkConfig::Arduino(a) => &a.platform_version,
            FrameworkConfig::RtosSdk(r) => &r.platform_version,
        }
    }
}

/// Arduino core framework settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArduinoFramework {
    pub version: Version,
    pub source: String,
    pub platform_version: String,
    /// Persist preferences in flash instead of RTC memory.
    pub restore_from_flash: bool,
    /// Apply pin initial states as early as possible during boot.
    pub early_pin_init: bool,
    pub board_flash_mode: FlashMode,
}

/// ESP8266 RTOS SDK framework settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtosSdkFramework {
    pub version: Version,
    pub source: String,
    pub platform_version: String,
    /// User sdkconfig entries, passed through verbatim.
    pub sdkconfig_options: BTreeMap<String, String>,
    pub components: Vec<ComponentRef>,
}

/// An external SDK component to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentRef {
    pub name: String,
    pub source: ComponentSource,
    /// Sub-directory of the source holding the component.
    pub path: Option<String>,
    pub refresh: TimePeriod,
}

/// SPI flash access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Qio,
    Qout,
    Dio,
    Dout,
}

impl FlashMode {
    pub const ALL: [FlashMode; 4] = [FlashMode::Qio, FlashMode::Qout, FlashMode::Dio, FlashMode::Dout];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlashMode::Qio => "qio",
            FlashMode::Qout => "qout",
            FlashMode::Dio => "dio",
            FlashMode::Dout => "dout",
        }
    }
}

impl fmt::Display for FlashMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlashMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lower)
            .ok_or_else(|| format!("unknown value '{s}', expected one of: qio, qout, dio, dout"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_mode_parse() {
        assert_eq!("DIO".parse::<FlashMode>().unwrap(), FlashMode::Dio);
        assert_eq!("dout".parse::<FlashMode>().unwrap(), FlashMode::Dout);
        assert!("fast".parse::<FlashMode>().is_err());
    }

    #[test]
    fn framework_accessors() {
        let fw = FrameworkConfig::Arduino(ArduinoFramework {
            version: Version::new(3, 0, 2),
            source: "~3.30002.0".into(),
            platform_version: "platformio/espressif8266@3.2.0".into(),
            restore_from_flash: false,
            early_pin_init: true,
            board_flash_mode: FlashMode::Dout,
        });
        assert_eq!(fw.kind(), FrameworkKind::Arduino);
        assert_eq!(fw.version(), &Version::new(3, 0, 2));
        assert_eq!(fw.source(), "~3.30002.0");
        assert_eq!(fw.platform_version(), "platformio/espressif8266@3.2.0");
    }
}
