//! Linker-script selection for the Arduino core.
//!
//! Arduino core releases up to 2.3.0 take no linker-script override,
//! releases up to 2.4.2 use the legacy script names, and later releases use
//! the current names.

use esp8266_core::Version;

use crate::board::FlashSize;

/// Legacy and current linker-script names for one flash size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkerScripts {
    /// Script used by Arduino core 2.3.1 to 2.4.2.
    pub legacy: &'static str,
    /// Script used by Arduino core after 2.4.2.
    pub current: &'static str,
}

impl LinkerScripts {
    /// Table entry for `flash`, if one exists.
    pub fn for_flash_size(flash: FlashSize) -> Option<Self> {
        let (legacy, current) = match flash {
            FlashSize::Kb512 => ("eagle.flash.512k0.ld", "eagle.flash.512k.ld"),
            FlashSize::Mb1 => ("eagle.flash.1m0.ld", "eagle.flash.1m.ld"),
            FlashSize::Mb2 => ("eagle.flash.2m.ld", "eagle.flash.2m.ld"),
            FlashSize::Mb4 => ("eagle.flash.4m.ld", "eagle.flash.4m.ld"),
            FlashSize::Mb16 => ("eagle.flash.16m.ld", "eagle.flash.16m14m.ld"),
            FlashSize::Mb8 => return None,
        };
        Some(Self { legacy, current })
    }
}

/// Last Arduino core release without linker-script support.
pub const LAST_WITHOUT_LD_SCRIPT: Version = Version::new(2, 3, 0);

/// Last Arduino core release using the legacy script names.
pub const LAST_LEGACY_LD_SCRIPT: Version = Version::new(2, 4, 2);

/// Pick the linker script for a framework version and flash size.
pub fn select_ld_script(version: &Version, flash: FlashSize) -> Option<&'static str> {
    if *version <= LAST_WITHOUT_LD_SCRIPT {
        return None;
    }
    let scripts = LinkerScripts::for_flash_size(flash)?;
    if *version <= LAST_LEGACY_LD_SCRIPT {
        Some(scripts.legacy)
    } else {
        Some(scripts.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_script_up_to_2_3_0() {
        assert_eq!(select_ld_script(&Version::new(2, 2, 0), FlashSize::Mb4), None);
        assert_eq!(select_ld_script(&Version::new(2, 3, 0), FlashSize::Mb16), None);
    }

    #[test]
    fn legacy_script_up_to_2_4_2() {
        assert_eq!(
            select_ld_script(&Version::new(2, 4, 0), FlashSize::Mb4),
            Some("eagle.flash.4m.ld")
        );
        assert_eq!(
            select_ld_script(&Version::new(2, 4, 2), FlashSize::Mb16),
            Some("eagle.flash.16m.ld")
        );
        assert_eq!(
            select_ld_script(&Version::new(2, 3, 1), FlashSize::Kb512),
            Some("eagle.flash.512k0.ld")
        );
    }

    #[test]
    fn current_script_after_2_4_2() {
        assert_eq!(
            select_ld_script(&Version::new(2, 7, 0), FlashSize::Mb4),
            Some("eagle.flash.4m.ld")
        );
        assert_eq!(
            select_ld_script(&Version::new(2, 4, 3), FlashSize::Mb16),
            Some("eagle.flash.16m14m.ld")
        );
        assert_eq!(
            select_ld_script(&Version::new(3, 0, 2), FlashSize::Mb1),
            Some("eagle.flash.1m.ld")
        );
    }

    #[test]
    fn flash_size_without_table_entry() {
        assert!(LinkerScripts::for_flash_size(FlashSize::Mb8).is_none());
        assert_eq!(select_ld_script(&Version::new(3, 0, 2), FlashSize::Mb8), None);
    }
}
