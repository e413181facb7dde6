//! Shared primitives for the ESP8266 platform definition.
//!
//! - [`version`]: dotted `major.minor.patch` framework versions and
//!   package version constraints
//! - [`time_period`]: unit-suffixed durations such as `"1d"` or `"500ms"`
//! - [`warning`]: non-fatal diagnostics collected during a build
//! - [`error`]: scalar parse failures

pub mod error;
pub mod time_period;
pub mod version;
pub mod warning;

pub use error::{ParseError, Result};
pub use time_period::TimePeriod;
pub use version::{
    parse_constraint, parse_version, version_code, ConstraintOp, Version, VersionConstraint,
};
pub use warning::{Warning, Warnings};
