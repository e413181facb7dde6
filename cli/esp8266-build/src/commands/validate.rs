//! `esp8266-build validate`: normalize and cross-validate a configuration.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use esp8266_platform::config::FrameworkConfig;
use esp8266_platform::{normalize, ConfigDocument, NormalizedConfig};

use crate::Format;

pub fn run(document: &ConfigDocument, base_dir: &Path, format: Format) -> Result<()> {
    let config = normalize(document, base_dir)?;
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        Format::Text => {
            print!("{}", render_text(&config));
            super::print_warnings(&config.warnings);
        }
    }
    Ok(())
}

/// Human-readable summary of a normalized configuration.
pub fn render_text(config: &NormalizedConfig) -> String {
    let platform = &config.platform;
    let framework = &platform.framework;
    let mut out = String::new();

    let _ = writeln!(out, "=== Device: {} ===", config.core.name);
    let _ = writeln!(out, "Board:      {}", platform.board);
    let _ = writeln!(out, "Flash size: {}", platform.flash_size);
    if let Some(partitions) = &platform.partitions {
        let _ = writeln!(out, "Partitions: {}", partitions.display());
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "--- Framework ---");
    let _ = writeln!(out, "  Type:     {}", framework.kind());
    let _ = writeln!(out, "  Version:  {}", framework.version());
    let _ = writeln!(out, "  Source:   {}", framework.source());
    let _ = writeln!(out, "  Platform: {}", framework.platform_version());
    match framework {
        FrameworkConfig::Arduino(arduino) => {
            let _ = writeln!(out, "  Restore from flash: {}", arduino.restore_from_flash);
            let _ = writeln!(out, "  Early pin init:     {}", arduino.early_pin_init);
            let _ = writeln!(out, "  Flash mode:         {}", arduino.board_flash_mode);
        }
        FrameworkConfig::RtosSdk(sdk) => {
            if !sdk.sdkconfig_options.is_empty() {
                let _ = writeln!(out, "  sdkconfig options:");
                for (key, value) in &sdk.sdkconfig_options {
                    let _ = writeln!(out, "    {key} = {value}");
                }
            }
            if !sdk.components.is_empty() {
                let _ = writeln!(out, "  Components:");
                for component in &sdk.components {
                    let _ = writeln!(out, "    {}", component.name);
                }
            }
        }
    }

    if let Some(pm) = &config.power_management {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Power management ---");
        let _ = writeln!(
            out,
            "  Loop interval: {}-{} ms",
            pm.min_loop_interval_ms, pm.max_loop_interval_ms
        );
    }

    if !config.pins.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Pins ---");
        for pin in &config.pins {
            let inverted = if pin.inverted { " (inverted)" } else { "" };
            let _ = writeln!(out, "  GPIO{:<3} {}{inverted}", pin.number, pin.mode.as_str());
        }
    }
    out
}
