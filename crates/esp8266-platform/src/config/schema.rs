//! Schema validation and normalization of the `esp8266` block.
//!
//! The block is deserialized into [`RawPlatform`] first, which fixes its
//! shape: unknown keys and wrong value types fail there with the TOML
//! location. [`validate_platform`] then checks values, applies defaults and
//! resolves the framework variant, reporting dotted field paths.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use esp8266_boards::FlashSize;
use esp8266_core::{TimePeriod, Warnings};
use serde::{Deserialize, Serialize};

use crate::config::source::{validate_source, RawSource};
use crate::config::{
    ArduinoFramework, ComponentRef, FlashMode, FrameworkConfig, PlatformConfig, RtosSdkFramework,
};
use crate::error::{PlatformError, Result};
use crate::framework::{resolve_version, DeclaredVersion, FrameworkKind};

/// Dotted path of the platform block.
pub const PLATFORM_KEY: &str = "esp8266";

const DEFAULT_FLASH_SIZE: FlashSize = FlashSize::Mb4;
const DEFAULT_REFRESH: TimePeriod = TimePeriod::from_duration(Duration::from_secs(24 * 60 * 60));

/// The `esp8266` block as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPlatform {
    pub board: String,
    #[serde(default)]
    pub flash_size: Option<String>,
    /// Partition table file, relative to the configuration directory.
    #[serde(default)]
    pub partitions: Option<String>,
    #[serde(default)]
    pub framework: RawFramework,
}

/// The `esp8266.framework` block as written.
///
/// Variant-specific keys are all accepted here; [`validate_platform`]
/// rejects the ones that do not belong to the selected `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFramework {
    /// Framework discriminator, `arduino` when absent.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Literal version or alias, `recommended` when absent.
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub platform_version: Option<String>,

    #[serde(default)]
    pub restore_from_flash: Option<bool>,
    #[serde(default)]
    pub early_pin_init: Option<bool>,
    #[serde(default)]
    pub board_flash_mode: Option<String>,

    #[serde(default)]
    pub sdkconfig_options: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub components: Option<ComponentList>,
}

/// `components` holds either one table or a list of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ComponentList {
    One(RawComponent),
    Many(Vec<RawComponent>),
}

impl ComponentList {
    fn as_slice(&self) -> &[RawComponent] {
        match self {
            ComponentList::One(component) => std::slice::from_ref(component),
            ComponentList::Many(components) => components,
        }
    }
}

/// One external SDK component as written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawComponent {
    pub name: String,
    pub source: RawSource,
    /// Sub-directory of the source holding the component.
    #[serde(default)]
    pub path: Option<String>,
    /// Re-fetch interval, `1d` when absent.
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Options that influence normalization but are not part of the block itself.
#[derive(Debug, Clone, Default)]
pub struct SchemaOptions {
    /// Directory that relative paths are resolved against.
    pub base_dir: PathBuf,
}

impl SchemaOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

/// Validate and normalize an `esp8266` block.
///
/// Defaults are applied, the framework variant is resolved and every path
/// is checked. Non-fatal findings go into `warnings`.
pub fn validate_platform(
    raw: &RawPlatform,
    options: &SchemaOptions,
    warnings: &mut Warnings,
) -> Result<PlatformConfig> {
    let flash_size = match &raw.flash_size {
        Some(label) => parse_flash_size(label, &format!("{PLATFORM_KEY}.flash_size"))?,
        None => DEFAULT_FLASH_SIZE,
    };

    let partitions = match &raw.partitions {
        Some(file) => {
            let resolved = options.base_dir.join(file);
            if !resolved.is_file() {
                return Err(PlatformError::schema(
                    format!("{PLATFORM_KEY}.partitions"),
                    format!("file '{}' does not exist", resolved.display()),
                ));
            }
            Some(resolved)
        }
        None => None,
    };

    let framework_path = format!("{PLATFORM_KEY}.framework");
    let framework = validate_framework(&raw.framework, &framework_path, options, warnings)?;

    tracing::debug!(board = %raw.board, %flash_size, framework = %framework.kind(), "normalized esp8266 block");

    Ok(PlatformConfig {
        board: raw.board.clone(),
        flash_size,
        partitions,
        framework,
    })
}

fn parse_flash_size(label: &str, path: &str) -> Result<FlashSize> {
    let size: FlashSize = label
        .parse()
        .map_err(|e: esp8266_boards::BoardError| PlatformError::schema(path, e.to_string()))?;
    if !size.is_user_selectable() {
        let allowed: Vec<&str> = FlashSize::USER_SELECTABLE.iter().map(|s| s.label()).collect();
        return Err(PlatformError::schema(
            path,
            format!("unsupported flash size '{label}', expected one of: {}", allowed.join(", ")),
        ));
    }
    Ok(size)
}

fn validate_framework(
    raw: &RawFramework,
    path: &str,
    options: &SchemaOptions,
    warnings: &mut Warnings,
) -> Result<FrameworkConfig> {
    let kind = match &raw.kind {
        Some(name) => FrameworkKind::from_type_name(name).ok_or_else(|| {
            PlatformError::schema(
                format!("{path}.type"),
                format!("unknown framework '{name}', expected one of: arduino, esp8266-rtos-sdk"),
            )
        })?,
        None => FrameworkKind::Arduino,
    };
    deny_foreign_keys(raw, kind, path)?;

    let declared = DeclaredVersion {
        version: raw.version.as_deref().unwrap_or("recommended"),
        source: raw.source.as_deref(),
        platform_version: raw.platform_version.as_deref(),
    };
    let resolved = resolve_version(kind, declared, path, warnings)?;

    match kind {
        FrameworkKind::Arduino => {
            let board_flash_mode = match &raw.board_flash_mode {
                Some(mode) => mode.parse::<FlashMode>().map_err(|detail| {
                    PlatformError::schema(format!("{path}.board_flash_mode"), detail)
                })?,
                None => FlashMode::Dout,
            };
            Ok(FrameworkConfig::Arduino(ArduinoFramework {
                version: resolved.version,
                source: resolved.source,
                platform_version: resolved.platform_version,
                restore_from_flash: raw.restore_from_flash.unwrap_or(false),
                early_pin_init: raw.early_pin_init.unwrap_or(true),
                board_flash_mode,
            }))
        }
        FrameworkKind::RtosSdk => {
            let components = match &raw.components {
                Some(list) => validate_components(list, &format!("{path}.components"), options)?,
                None => Vec::new(),
            };
            Ok(FrameworkConfig::RtosSdk(RtosSdkFramework {
                version: resolved.version,
                source: resolved.source,
                platform_version: resolved.platform_version,
                sdkconfig_options: raw.sdkconfig_options.clone().unwrap_or_default(),
                components,
            }))
        }
    }
}

/// Reject keys that belong to the other framework variant.
fn deny_foreign_keys(raw: &RawFramework, kind: FrameworkKind, path: &str) -> Result<()> {
    let foreign: &[(&str, bool)] = match kind {
        FrameworkKind::Arduino => &[
            ("sdkconfig_options", raw.sdkconfig_options.is_some()),
            ("components", raw.components.is_some()),
        ],
        FrameworkKind::RtosSdk => &[
            ("restore_from_flash", raw.restore_from_flash.is_some()),
            ("early_pin_init", raw.early_pin_init.is_some()),
            ("board_flash_mode", raw.board_flash_mode.is_some()),
        ],
    };
    match foreign.iter().find(|(_, present)| *present) {
        Some((key, _)) => Err(PlatformError::schema(
            format!("{path}.{key}"),
            format!("unknown option for the {kind} framework"),
        )),
        None => Ok(()),
    }
}

fn validate_components(
    list: &ComponentList,
    path: &str,
    options: &SchemaOptions,
) -> Result<Vec<ComponentRef>> {
    let single = matches!(list, ComponentList::One(_));
    list.as_slice()
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let item_path = if single {
                path.to_string()
            } else {
                format!("{path}[{i}]")
            };
            validate_component(raw, &item_path, options)
        })
        .collect()
}

fn validate_component(raw: &RawComponent, path: &str, options: &SchemaOptions) -> Result<ComponentRef> {
    let source = validate_source(&raw.source, &format!("{path}.source"), &options.base_dir)?;
    let refresh = match &raw.refresh {
        Some(s) => TimePeriod::parse_refresh(s)
            .map_err(|e| PlatformError::parse(format!("{path}.refresh"), e))?,
        None => DEFAULT_REFRESH,
    };

    Ok(ComponentRef {
        name: raw.name.clone(),
        source,
        path: raw.path.clone(),
        refresh,
    })
}
