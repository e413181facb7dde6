//! Cross-checks between the `esp8266` block and the global build options.

use crate::config::{CoreSection, PlatformConfig};
use crate::error::{PlatformError, Result};

/// Build option that selects the partition table file.
pub const PARTITIONS_OPTION: &str = "board_build.partitions";
/// Build option that overrides the flash size.
pub const FLASH_SIZE_OPTION: &str = "board_upload.flash_size";

/// Reject user build options that would fight with directives derived from
/// the `esp8266` block.
pub fn final_validate(config: &PlatformConfig, core: &CoreSection) -> Result<()> {
    if config.partitions.is_some() && core.option(PARTITIONS_OPTION).is_some() {
        return Err(PlatformError::Conflict {
            first: "esp8266.partitions".into(),
            second: format!("esphome.platformio_options.{PARTITIONS_OPTION}"),
            detail: "Set the partition table in the esp8266 block only".into(),
        });
    }

    if core.option(FLASH_SIZE_OPTION).is_some() {
        return Err(PlatformError::Conflict {
            first: "esp8266.flash_size".into(),
            second: format!("esphome.platformio_options.{FLASH_SIZE_OPTION}"),
            detail: "Please specify flash_size within the esp8266 block only".into(),
        });
    }

    Ok(())
}
