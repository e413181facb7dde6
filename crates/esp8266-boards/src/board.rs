//! Flash sizes, board records and the board catalog.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use esp8266_core::Version;
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::ld_script::select_ld_script;

/// Size of the SPI flash chip attached to an ESP8266.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FlashSize {
    #[serde(rename = "512KB")]
    Kb512,
    #[serde(rename = "1MB")]
    Mb1,
    #[serde(rename = "2MB")]
    Mb2,
    #[serde(rename = "4MB")]
    Mb4,
    #[serde(rename = "8MB")]
    Mb8,
    #[serde(rename = "16MB")]
    Mb16,
}

impl FlashSize {
    /// Sizes a user may select for the `flash_size` option.
    pub const USER_SELECTABLE: [FlashSize; 4] =
        [FlashSize::Mb2, FlashSize::Mb4, FlashSize::Mb8, FlashSize::Mb16];

    /// Canonical upper-case label, e.g. `"4MB"`.
    pub fn label(&self) -> &'static str {
        match self {
            FlashSize::Kb512 => "512KB",
            FlashSize::Mb1 => "1MB",
            FlashSize::Mb2 => "2MB",
            FlashSize::Mb4 => "4MB",
            FlashSize::Mb8 => "8MB",
            FlashSize::Mb16 => "16MB",
        }
    }

    /// Size in bytes.
    pub fn bytes(&self) -> u64 {
        const MB: u64 = 1024 * 1024;
        match self {
            FlashSize::Kb512 => MB / 2,
            FlashSize::Mb1 => MB,
            FlashSize::Mb2 => 2 * MB,
            FlashSize::Mb4 => 4 * MB,
            FlashSize::Mb8 => 8 * MB,
            FlashSize::Mb16 => 16 * MB,
        }
    }

    pub fn is_user_selectable(&self) -> bool {
        Self::USER_SELECTABLE.contains(self)
    }
}

impl fmt::Display for FlashSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FlashSize {
    type Err = BoardError;

    /// Case-insensitive: `"4mb"` and `"4MB"` are the same size.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        [
            FlashSize::Kb512,
            FlashSize::Mb1,
            FlashSize::Mb2,
            FlashSize::Mb4,
            FlashSize::Mb8,
            FlashSize::Mb16,
        ]
        .into_iter()
        .find(|size| size.label() == upper)
        .ok_or_else(|| BoardError::UnknownFlashSize {
            label: s.to_string(),
        })
    }
}

/// Static hardware metadata for one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Board {
    /// Board identifier as used in configuration (e.g. "nodemcuv2").
    pub id: String,
    /// Human-readable board name.
    pub name: String,
    /// Flash chip size.
    pub flash_size: FlashSize,
}

impl Board {
    pub fn new(id: impl Into<String>, name: impl Into<String>, flash_size: FlashSize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            flash_size,
        }
    }
}

const BUILTIN_BOARDS: &[(&str, &str, FlashSize)] = &[
    ("d1", "WEMOS D1 R1", FlashSize::Mb4),
    ("d1_mini", "WeMos D1 R2 and mini", FlashSize::Mb4),
    ("d1_mini_lite", "WeMos D1 mini Lite", FlashSize::Mb1),
    ("d1_mini_pro", "WeMos D1 mini Pro", FlashSize::Mb16),
    ("esp01", "Espressif Generic ESP8266 ESP-01 512k", FlashSize::Kb512),
    ("esp01_1m", "Espressif Generic ESP8266 ESP-01 1M", FlashSize::Mb1),
    ("esp07", "Espressif Generic ESP8266 ESP-07", FlashSize::Mb4),
    ("esp12e", "Espressif ESP8266 ESP-12E", FlashSize::Mb4),
    ("esp210", "SweetPea ESP-210", FlashSize::Mb4),
    ("esp8285", "Generic ESP8285 Module", FlashSize::Mb1),
    ("esp_wroom_02", "ESP-WROOM-02", FlashSize::Mb2),
    ("espduino", "ESPDuino (ESP-13 Module)", FlashSize::Mb4),
    ("espectro", "ESPectro Core", FlashSize::Mb4),
    ("espino", "ESPino", FlashSize::Mb4),
    ("espresso_lite_v1", "ESPresso Lite 1.0", FlashSize::Mb4),
    ("espresso_lite_v2", "ESPresso Lite 2.0", FlashSize::Mb4),
    ("gen4iod", "4D Systems gen4 IoD Range", FlashSize::Kb512),
    ("heltec_wifi_kit_8", "Heltec Wifi kit 8", FlashSize::Mb4),
    ("huzzah", "Adafruit HUZZAH ESP8266", FlashSize::Mb4),
    ("inventone", "Invent One", FlashSize::Mb4),
    ("modwifi", "Olimex MOD-WIFI-ESP8266(-DEV)", FlashSize::Mb2),
    ("nodemcu", "NodeMCU 0.9 (ESP-12 Module)", FlashSize::Mb4),
    ("nodemcuv2", "NodeMCU 1.0 (ESP-12E Module)", FlashSize::Mb4),
    ("oak", "DigiStump Oak", FlashSize::Mb4),
    ("phoenix_v1", "Phoenix 1.0", FlashSize::Mb4),
    ("phoenix_v2", "Phoenix 2.0", FlashSize::Mb4),
    ("sonoff_basic", "Sonoff Basic", FlashSize::Mb1),
    ("sonoff_s20", "Sonoff S20", FlashSize::Mb1),
    ("sonoff_sv", "Sonoff SV", FlashSize::Mb1),
    ("sonoff_th", "Sonoff TH", FlashSize::Mb1),
    ("sparkfunBlynk", "SparkFun Blynk Board", FlashSize::Mb4),
    ("thing", "SparkFun ESP8266 Thing", FlashSize::Kb512),
    ("thingdev", "SparkFun ESP8266 Thing Dev", FlashSize::Kb512),
    ("wifi_slot", "WiFi Slot", FlashSize::Mb1),
    ("wifiduino", "WiFiduino", FlashSize::Mb4),
    ("wifinfo", "WifInfo", FlashSize::Mb1),
    ("wio_link", "Wio Link", FlashSize::Mb4),
    ("wio_node", "Wio Node", FlashSize::Mb4),
    ("xinabox_cw01", "XinaBox CW01", FlashSize::Mb4),
];

/// Board metadata indexed by board identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardCatalog {
    boards: BTreeMap<String, Board>,
}

impl BoardCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated builtin board table.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for (id, name, flash_size) in BUILTIN_BOARDS {
            catalog.insert(Board::new(*id, *name, *flash_size));
        }
        catalog
    }

    /// Add or replace a board definition.
    pub fn insert(&mut self, board: Board) {
        self.boards.insert(board.id.clone(), board);
    }

    /// Merge boards from another catalog, replacing entries with the same id.
    pub fn merge(&mut self, other: BoardCatalog) {
        self.boards.extend(other.boards);
    }

    /// Look up a board by identifier.
    pub fn get(&self, id: &str) -> Option<&Board> {
        self.boards.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.boards.contains_key(id)
    }

    /// Boards in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Board> {
        self.boards.values()
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Linker script for `board` under the given framework version.
    ///
    /// Returns `None` for boards without catalog metadata.
    pub fn ld_script(&self, board: &str, version: &Version) -> Option<&'static str> {
        let board = self.get(board)?;
        select_ld_script(version, board.flash_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_size_parse_is_case_insensitive() {
        assert_eq!("4mb".parse::<FlashSize>().unwrap(), FlashSize::Mb4);
        assert_eq!("16MB".parse::<FlashSize>().unwrap(), FlashSize::Mb16);
        assert_eq!("512kb".parse::<FlashSize>().unwrap(), FlashSize::Kb512);
        assert!("3MB".parse::<FlashSize>().is_err());
    }

    #[test]
    fn user_selectable_sizes() {
        assert!(FlashSize::Mb2.is_user_selectable());
        assert!(FlashSize::Mb16.is_user_selectable());
        assert!(!FlashSize::Mb1.is_user_selectable());
        assert!(!FlashSize::Kb512.is_user_selectable());
    }

    #[test]
    fn flash_size_bytes() {
        assert_eq!(FlashSize::Kb512.bytes(), 512 * 1024);
        assert_eq!(FlashSize::Mb4.bytes(), 4 * 1024 * 1024);
    }

    #[test]
    fn builtin_lookup() {
        let catalog = BoardCatalog::builtin();
        let board = catalog.get("nodemcuv2").unwrap();
        assert_eq!(board.flash_size, FlashSize::Mb4);
        assert_eq!(catalog.get("esp01").unwrap().flash_size, FlashSize::Kb512);
        assert!(catalog.get("not_a_board").is_none());
        assert!(catalog.len() > 30);
    }

    #[test]
    fn ld_script_for_known_board() {
        let catalog = BoardCatalog::builtin();
        assert_eq!(
            catalog.ld_script("d1_mini_lite", &Version::new(2, 7, 4)),
            Some("eagle.flash.1m.ld")
        );
        assert_eq!(
            catalog.ld_script("d1_mini_lite", &Version::new(2, 4, 0)),
            Some("eagle.flash.1m0.ld")
        );
        assert_eq!(catalog.ld_script("d1_mini_lite", &Version::new(2, 2, 0)), None);
    }

    #[test]
    fn ld_script_for_unknown_board_is_none() {
        let catalog = BoardCatalog::builtin();
        assert_eq!(catalog.ld_script("custom_pcb", &Version::new(3, 0, 2)), None);
    }

    #[test]
    fn insert_replaces_existing() {
        let mut catalog = BoardCatalog::builtin();
        catalog.insert(Board::new("nodemcuv2", "Patched", FlashSize::Mb16));
        assert_eq!(catalog.get("nodemcuv2").unwrap().flash_size, FlashSize::Mb16);
    }
}
