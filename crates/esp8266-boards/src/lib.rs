//! Board metadata for ESP8266 targets.
//!
//! Maps a board identifier to its flash size, and a flash size plus framework
//! version to the linker script the Arduino core should use. Boards missing
//! from the catalog are not an error: they simply get no linker script.
//!
//! - [`board`]: flash sizes, board records and the catalog
//! - [`ld_script`]: legacy/current linker-script table and selection policy
//! - [`parse`]: custom board definitions loaded from `*.boards.toml` files

pub mod board;
pub mod error;
pub mod ld_script;
pub mod parse;

pub use board::{Board, BoardCatalog, FlashSize};
pub use error::{BoardError, Result};
pub use ld_script::{select_ld_script, LinkerScripts};
