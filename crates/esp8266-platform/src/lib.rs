//! ESP8266 platform definition.
//!
//! Validates the `esp8266` configuration block and turns it into build
//! directives for the firmware build orchestrator: build options, compiler
//! flags, preprocessor defines, `sdkconfig` entries, external SDK components,
//! extra build files and generated setup code.
//!
//! The work happens in one synchronous pass: normalize, cross-validate,
//! collect, emit. See [`pipeline`].

pub mod codegen;
pub mod config;
pub mod context;
pub mod error;
pub mod framework;
pub mod pipeline;
pub mod power;

pub use codegen::{download_types, BuildOption, Directives, DownloadType, Expression};
pub use config::{
    final_validate, validate_platform, ConfigDocument, CoreSection, FrameworkConfig, PinConfig,
    PinMode, PlatformConfig, RawPin, RawPlatform, SchemaOptions, DEFAULT_CONFIG_FILE,
};
pub use context::{BuildContext, ExtraFile, IdfComponent, Registry, SdkconfigValue};
pub use error::{PlatformError, Result};
pub use framework::{resolve_version, FrameworkKind, ResolvedVersion};
pub use pipeline::{normalize, run, Build, BuildOutput, NormalizedConfig};
pub use power::{PowerManagementConfig, RawPowerManagement};
