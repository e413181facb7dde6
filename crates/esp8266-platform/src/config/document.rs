//! Device configuration document (`device.toml`).
//!
//! The sections this platform owns are deserialized into their `Raw*`
//! shapes; blocks belonging to other components are kept as plain TOML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::pins::RawPin;
use crate::config::schema::RawPlatform;
use crate::error::Result;
use crate::power::RawPowerManagement;

/// File name searched for by [`ConfigDocument::find_and_load`].
pub const DEFAULT_CONFIG_FILE: &str = "device.toml";

/// A parsed device configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigDocument {
    /// Core settings shared by every platform.
    #[serde(default)]
    pub esphome: CoreSection,
    /// The ESP8266 platform block.
    #[serde(default)]
    pub esp8266: Option<RawPlatform>,
    /// Power-management component block.
    #[serde(default)]
    pub esp8266_pm: Option<RawPowerManagement>,
    /// GPIO declarations.
    #[serde(default)]
    pub pins: Vec<RawPin>,
    /// Blocks of other components (`wifi`, `logger`, ...), keyed by name.
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

/// The `[esphome]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreSection {
    /// Device name, used for download file names.
    #[serde(default = "default_name")]
    pub name: String,
    /// User-supplied build options. Only cross-checked against the
    /// `esp8266` block; they are not copied into the generated files.
    #[serde(default)]
    pub platformio_options: BTreeMap<String, toml::Value>,
}

impl Default for CoreSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            platformio_options: BTreeMap::new(),
        }
    }
}

impl CoreSection {
    /// Look up a build option by its dotted name.
    ///
    /// Matches both a quoted key (`"board_build.partitions" = ..`) and the
    /// nested tables TOML builds from an unquoted dotted key.
    pub fn option(&self, dotted: &str) -> Option<&toml::Value> {
        if let Some(value) = self.platformio_options.get(dotted) {
            return Some(value);
        }
        let mut parts = dotted.split('.');
        let first = parts.next()?;
        parts.try_fold(self.platformio_options.get(first)?, |value, part| {
            value.as_table()?.get(part)
        })
    }
}

fn default_name() -> String {
    "esp8266-device".to_string()
}

impl ConfigDocument {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let document = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(document)
    }

    /// Parse a configuration from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Search upward from `start_dir` for a `device.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(DEFAULT_CONFIG_FILE);
            if candidate.is_file() {
                return Ok(Some((Self::load(&candidate)?, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_document() {
        let doc = ConfigDocument::from_toml(
            r#"
[esphome]
name = "living-room"

[esphome.platformio_options]
upload_speed = 460800
build_flags = ["-DFOO"]

[esp8266]
board = "nodemcuv2"

[esp8266.framework]
type = "arduino"

[esp8266_pm]
min_loop_interval_ms = 20

[[pins]]
number = 4
mode = "output"

[[pins]]
number = "GPIO5"
"#,
        )
        .unwrap();
        assert_eq!(doc.esphome.name, "living-room");
        assert_eq!(doc.esphome.platformio_options.len(), 2);
        assert_eq!(doc.esp8266.unwrap().board, "nodemcuv2");
        assert_eq!(doc.esp8266_pm.unwrap().min_loop_interval_ms, 20);
        assert_eq!(doc.pins.len(), 2);
        assert!(doc.other.is_empty());
    }

    #[test]
    fn parse_minimal_document() {
        let doc = ConfigDocument::from_toml("[esp8266]\nboard = \"d1_mini\"\n").unwrap();
        assert_eq!(doc.esphome.name, "esp8266-device");
        assert!(doc.esphome.platformio_options.is_empty());
        assert!(doc.esp8266_pm.is_none());
        assert!(doc.pins.is_empty());
    }

    #[test]
    fn option_lookup_quoted_and_nested() {
        let doc = ConfigDocument::from_toml(
            r#"
[esphome.platformio_options]
"board_upload.flash_size" = "4MB"
board_build.partitions = "p.csv"
upload_speed = 115200
"#,
        )
        .unwrap();
        assert!(doc.esphome.option("board_upload.flash_size").is_some());
        assert!(doc.esphome.option("board_build.partitions").is_some());
        assert!(doc.esphome.option("upload_speed").is_some());
        assert!(doc.esphome.option("board_build.ldscript").is_none());
        assert!(doc.esphome.option("upload_speed.x").is_none());
    }

    #[test]
    fn other_component_blocks_are_kept() {
        let doc = ConfigDocument::from_toml(
            "[esphome]\nname = \"porch\"\n[esp8266]\nboard = \"nodemcuv2\"\n[wifi]\nssid = \"home\"\n[logger]\n",
        )
        .unwrap();
        assert_eq!(doc.other.keys().collect::<Vec<_>>(), vec!["logger", "wifi"]);
        assert_eq!(doc.other["wifi"]["ssid"].as_str(), Some("home"));
    }

    #[test]
    fn owned_blocks_are_still_strict() {
        let err = ConfigDocument::from_toml("[esp8266]\nboard = \"x\"\ncpu = 160\n").unwrap_err();
        assert!(err.to_string().contains("unknown field `cpu`"));
        assert!(ConfigDocument::from_toml("[[pins]]\nnumber = 4\nspeed = 1\n").is_err());
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(ConfigDocument::from_toml("this is not valid toml [[[").is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[esphome]\nname = \"parent\"\n",
        )
        .unwrap();

        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (doc, found_dir) = ConfigDocument::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(doc.esphome.name, "parent");
        assert_eq!(found_dir, dir.path());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigDocument::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, crate::error::PlatformError::Io(_)));
    }
}
