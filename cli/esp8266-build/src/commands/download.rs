//! `esp8266-build download-types`: firmware files offered after a build.

use anyhow::Result;
use esp8266_platform::{download_types, ConfigDocument};

use crate::Format;

pub fn run(document: &ConfigDocument, format: Format) -> Result<()> {
    let types = download_types(&document.esphome.name);
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&types)?),
        Format::Text => {
            for t in &types {
                println!("{}: {}", t.title, t.description);
                println!("  {} -> {}", t.file, t.download);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_device_name() {
        let document = ConfigDocument::from_toml("[esphome]\nname = \"porch\"\n").unwrap();
        assert!(run(&document, Format::Json).is_ok());
        assert_eq!(download_types(&document.esphome.name)[0].download, "porch.bin");
    }
}
