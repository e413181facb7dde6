//! The `esp8266_pm` power-management component.
//!
//! Lets the main loop sleep between iterations, bounded by a minimum and a
//! maximum loop interval.

use serde::{Deserialize, Serialize};

use crate::codegen::{Directives, Expression};
use crate::error::{PlatformError, Result};

/// Configuration key of the component block.
pub const POWER_MANAGEMENT_KEY: &str = "esp8266_pm";

const DEFAULT_ID: &str = "esp8266powermanagement_id";
const DEFAULT_MIN_LOOP_INTERVAL_MS: u16 = 16;
const DEFAULT_MAX_LOOP_INTERVAL_MS: u16 = 200;
const CLASS: &str = "esp8266_pm::ESP8266PowerManagement";

/// Normalized `esp8266_pm` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PowerManagementConfig {
    /// Variable name of the generated component instance.
    pub id: String,
    pub min_loop_interval_ms: u16,
    pub max_loop_interval_ms: u16,
}

impl Default for PowerManagementConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID.to_string(),
            min_loop_interval_ms: DEFAULT_MIN_LOOP_INTERVAL_MS,
            max_loop_interval_ms: DEFAULT_MAX_LOOP_INTERVAL_MS,
        }
    }
}

/// The `esp8266_pm` block as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPowerManagement {
    #[serde(default = "default_id")]
    pub id: String,
    #[serde(default = "default_min_loop_interval")]
    pub min_loop_interval_ms: u16,
    #[serde(default = "default_max_loop_interval")]
    pub max_loop_interval_ms: u16,
}

fn default_id() -> String {
    DEFAULT_ID.to_string()
}

fn default_min_loop_interval() -> u16 {
    DEFAULT_MIN_LOOP_INTERVAL_MS
}

fn default_max_loop_interval() -> u16 {
    DEFAULT_MAX_LOOP_INTERVAL_MS
}

/// Validate an `esp8266_pm` block.
pub fn validate_power_management(raw: &RawPowerManagement) -> Result<PowerManagementConfig> {
    if !is_identifier(&raw.id) {
        return Err(PlatformError::schema(
            format!("{POWER_MANAGEMENT_KEY}.id"),
            format!("'{}' is not a valid identifier", raw.id),
        ));
    }
    Ok(PowerManagementConfig {
        id: raw.id.clone(),
        min_loop_interval_ms: raw.min_loop_interval_ms,
        max_loop_interval_ms: raw.max_loop_interval_ms,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Emit the component instance, its loop interval and registration.
pub fn emit_power_management(config: &PowerManagementConfig, out: &mut Directives) {
    let id = &config.id;
    out.add_define("USE_PM");
    out.add_global(Expression::raw(format!("{CLASS} *{id}")));
    out.add_statement(Expression::raw(format!("{id} = new {CLASS}()")));
    out.add_statement(Expression::call(
        format!("{id}->set_loop_interval"),
        vec![
            Expression::Int(config.min_loop_interval_ms.into()),
            Expression::Int(config.max_loop_interval_ms.into()),
        ],
    ));
    out.add_statement(Expression::call(
        "App.register_component",
        vec![Expression::raw(id.as_str())],
    ));
    out.add_global(Expression::raw("using namespace esphome::esp8266_pm"));
}
