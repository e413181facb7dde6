//! Build directive generation.
//!
//! Directives are collected into a [`Directives`] value rather than written
//! straight to disk, so a failed build leaves nothing behind. Renderers turn
//! the collection into `platformio.ini`, a defines header, C++ source and
//! `sdkconfig.defaults` text.

pub mod directives;
pub mod emit;
pub mod expr;
pub mod files;
pub mod pins;

pub use directives::{render_sdkconfig, BuildOption, Define, Directives};
pub use emit::{emit_platform, PARTITIONS_FILE, POST_BUILD_SCRIPT};
pub use expr::Expression;
pub use files::{copy_extra_build_files, copy_files, download_types, BundledAsset, DownloadType};
pub use pins::emit_pin_arrays;
