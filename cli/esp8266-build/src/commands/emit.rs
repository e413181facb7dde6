//! `esp8266-build emit`: run the pipeline and print or write the directives.

use std::path::Path;

use anyhow::{Context, Result};
use esp8266_boards::BoardCatalog;
use esp8266_platform::codegen::files::write_if_changed;
use esp8266_platform::codegen::{copy_extra_build_files, render_sdkconfig};
use esp8266_platform::{run as run_pipeline, BuildOutput, ConfigDocument};

use crate::Format;

pub const PLATFORMIO_INI: &str = "platformio.ini";
pub const DEFINES_HEADER: &str = "esphome_defines.h";
pub const SETUP_SOURCE: &str = "main.cpp";
pub const SDKCONFIG_DEFAULTS: &str = "sdkconfig.defaults";

pub fn run(
    document: &ConfigDocument,
    base_dir: &Path,
    boards: &BoardCatalog,
    format: Format,
    build_dir: Option<&Path>,
) -> Result<()> {
    let output = run_pipeline(document, base_dir, boards)?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&output)?),
        Format::Text => {
            for (name, contents) in rendered_files(&output) {
                println!("--- {name} ---");
                print!("{contents}");
                println!();
            }
            super::print_warnings(&output.warnings);
        }
    }

    if let Some(dir) = build_dir {
        let written = write_build_dir(&output, dir)?;
        tracing::info!(dir = %dir.display(), written, "build directory updated");
    }
    Ok(())
}

/// Every generated file as `(file name, contents)`, in a fixed order.
pub fn rendered_files(output: &BuildOutput) -> Vec<(&'static str, String)> {
    let mut files = vec![
        (PLATFORMIO_INI, output.directives.render_platformio_ini()),
        (DEFINES_HEADER, output.directives.render_defines_header()),
        (SETUP_SOURCE, output.directives.render_cpp()),
    ];
    if let Some(sdkconfig) = &output.sdkconfig {
        files.push((SDKCONFIG_DEFAULTS, render_sdkconfig(sdkconfig)));
    }
    files
}

/// Write generated, bundled and registered files into `dir`.
///
/// Unchanged files are left alone. Returns how many files were written.
pub fn write_build_dir(output: &BuildOutput, dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut written = 0;
    for (name, contents) in rendered_files(output) {
        let dest = dir.join(name);
        if write_if_changed(contents.as_bytes(), &dest)
            .with_context(|| format!("writing {}", dest.display()))?
        {
            written += 1;
        }
    }
    written += copy_extra_build_files(&output.extra_build_files, dir)
        .context("copying extra build files")?;
    Ok(written)
}
