//! Framework variant resolution.
//!
//! Turns the declared `version`/`source`/`platform_version` of a framework
//! block into concrete values: version aliases are looked up in a
//! per-framework table, a package source is synthesized when none is given,
//! and the build platform package is derived from the framework version.

use std::fmt;

use esp8266_core::{parse_constraint, parse_version, Version, Warning, Warnings};
use serde::Serialize;

use crate::error::{PlatformError, Result};

/// Recommended Arduino core release.
pub const RECOMMENDED_ARDUINO_VERSION: Version = Version::new(3, 0, 2);
/// Platform package used with Arduino 3.x cores.
pub const ARDUINO_3_PLATFORM_VERSION: Version = Version::new(3, 2, 0);
/// Platform package used with Arduino 2.5 to 2.7 cores.
pub const ARDUINO_2_PLATFORM_VERSION: Version = Version::new(2, 6, 3);
/// Platform package used with older Arduino cores.
pub const LEGACY_ARDUINO_PLATFORM_VERSION: Version = Version::new(1, 8, 0);

/// Recommended ESP8266 RTOS SDK release.
pub const RECOMMENDED_RTOS_SDK_VERSION: Version = Version::new(3, 4, 0);
/// Platform package used with the RTOS SDK.
pub const RTOS_SDK_PLATFORM_VERSION: Version = Version::new(4, 2, 1);

/// Package that platform version constraints are attached to.
pub const PLATFORM_PACKAGE: &str = "platformio/espressif8266";

const ARDUINO_GIT: &str = "https://github.com/esp8266/Arduino.git";
const RTOS_SDK_GIT: &str = "https://github.com/espressif/ESP8266_RTOS_SDK.git";

/// The SDK the firmware links against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FrameworkKind {
    /// The Arduino core for ESP8266.
    #[serde(rename = "arduino")]
    Arduino,
    /// Espressif's FreeRTOS-based ESP8266 RTOS SDK.
    #[serde(rename = "esp8266-rtos-sdk")]
    RtosSdk,
}

impl FrameworkKind {
    /// The `type` discriminator used in configuration.
    pub fn type_name(&self) -> &'static str {
        match self {
            FrameworkKind::Arduino => "arduino",
            FrameworkKind::RtosSdk => "esp8266-rtos-sdk",
        }
    }

    /// Tag recorded as the build's target framework.
    pub fn target_framework(&self) -> &'static str {
        match self {
            FrameworkKind::Arduino => "arduino",
            FrameworkKind::RtosSdk => "esp-idf",
        }
    }

    /// Parse a `type` discriminator, lower-casing and mapping spaces to `-`.
    pub fn from_type_name(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(' ', "-");
        match normalized.as_str() {
            "arduino" => Some(FrameworkKind::Arduino),
            "esp8266-rtos-sdk" => Some(FrameworkKind::RtosSdk),
            _ => None,
        }
    }

    pub fn recommended_version(&self) -> Version {
        match self {
            FrameworkKind::Arduino => RECOMMENDED_ARDUINO_VERSION,
            FrameworkKind::RtosSdk => RECOMMENDED_RTOS_SDK_VERSION,
        }
    }

    /// Resolve a symbolic version (`dev`, `latest`, `recommended`).
    pub fn alias(&self, name: &str) -> Option<(Version, Option<&'static str>)> {
        match (self, name) {
            (FrameworkKind::Arduino, "dev") => Some((Version::new(3, 0, 2), Some(ARDUINO_GIT))),
            (FrameworkKind::Arduino, "latest") => Some((Version::new(3, 0, 2), None)),
            (FrameworkKind::Arduino, "recommended") => Some((RECOMMENDED_ARDUINO_VERSION, None)),
            (FrameworkKind::RtosSdk, "dev" | "latest") => {
                Some((Version::new(3, 4, 0), Some(RTOS_SDK_GIT)))
            }
            (FrameworkKind::RtosSdk, "recommended") => {
                Some((RECOMMENDED_RTOS_SDK_VERSION, Some(RTOS_SDK_GIT)))
            }
            _ => None,
        }
    }

    /// Package source for `version` when none was given explicitly.
    pub fn default_source(&self, version: &Version) -> String {
        match self {
            FrameworkKind::Arduino => format_arduino_source(version),
            FrameworkKind::RtosSdk => format_rtos_sdk_source(version),
        }
    }

    /// Platform package version paired with `version` by default.
    pub fn default_platform_version(&self, version: &Version) -> Version {
        match self {
            FrameworkKind::Arduino if *version >= Version::new(3, 0, 0) => {
                ARDUINO_3_PLATFORM_VERSION
            }
            FrameworkKind::Arduino if *version >= Version::new(2, 5, 0) => {
                ARDUINO_2_PLATFORM_VERSION
            }
            FrameworkKind::Arduino => LEGACY_ARDUINO_PLATFORM_VERSION,
            FrameworkKind::RtosSdk => RTOS_SDK_PLATFORM_VERSION,
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            FrameworkKind::Arduino => "Arduino",
            FrameworkKind::RtosSdk => "ESP8266 RTOS SDK",
        }
    }
}

impl fmt::Display for FrameworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Map an Arduino core release to its framework package version.
///
/// The package registry encodes the core version as `MAJOR` followed by
/// two-digit minor and patch, under a package-series prefix that changed at
/// 2.4.1 and again at 2.6.2.
pub fn format_arduino_source(version: &Version) -> String {
    let series = if *version <= Version::new(2, 4, 1) {
        1
    } else if *version <= Version::new(2, 6, 2) {
        2
    } else {
        3
    };
    format!(
        "~{series}.{}{:02}{:02}.0",
        version.major, version.minor, version.patch
    )
}

/// Map an RTOS SDK release to its framework package version.
pub fn format_rtos_sdk_source(version: &Version) -> String {
    format!("~v{}.{}", version.major, version.minor)
}

/// Qualify a platform version constraint with the platform package name.
///
/// Values that are not version constraints (URLs, custom package specs) are
/// returned unchanged with an [`Warning::UnknownPlatformVersion`].
pub fn format_platform_version(value: &str, warnings: &mut Warnings) -> String {
    match parse_constraint(value) {
        Ok(_) => format!("{PLATFORM_PACKAGE}@{value}"),
        Err(_) => {
            warnings.push(Warning::UnknownPlatformVersion {
                value: value.to_string(),
            });
            value.to_string()
        }
    }
}

/// Version fields of a framework block as declared by the user.
#[derive(Debug, Clone, Copy)]
pub struct DeclaredVersion<'a> {
    /// Literal version or alias.
    pub version: &'a str,
    pub source: Option<&'a str>,
    pub platform_version: Option<&'a str>,
}

/// Fully resolved framework version fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedVersion {
    pub version: Version,
    pub source: String,
    pub platform_version: String,
}

/// Resolve the declared version fields of a framework block.
///
/// `path` is the dotted path of the framework block, used in errors.
pub fn resolve_version(
    kind: FrameworkKind,
    declared: DeclaredVersion<'_>,
    path: &str,
    warnings: &mut Warnings,
) -> Result<ResolvedVersion> {
    let (version, source) = match kind.alias(declared.version) {
        Some(_) if declared.source.is_some() => {
            return Err(PlatformError::Conflict {
                first: format!("{path}.version"),
                second: format!("{path}.source"),
                detail: "Framework version needs to be explicitly specified when custom source is used."
                    .into(),
            });
        }
        Some((version, source)) => (version, source.map(str::to_string)),
        None => {
            let version = parse_version(declared.version)
                .map_err(|e| PlatformError::parse(format!("{path}.version"), e))?;
            (version, declared.source.map(str::to_string))
        }
    };

    let source = source
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| kind.default_source(&version));

    let platform_version = match declared.platform_version {
        Some(explicit) => format_platform_version(explicit, warnings),
        None => format_platform_version(
            &kind.default_platform_version(&version).to_string(),
            warnings,
        ),
    };

    let recommended = kind.recommended_version();
    if version != recommended {
        warnings.push(Warning::NonRecommendedVersion {
            framework: kind.display_name().to_string(),
            version: version.clone(),
            recommended,
        });
    }

    tracing::debug!(framework = %kind, %version, %source, %platform_version, "resolved framework version");

    Ok(ResolvedVersion {
        version,
        source,
        platform_version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared(version: &str) -> DeclaredVersion<'_> {
        DeclaredVersion {
            version,
            source: None,
            platform_version: None,
        }
    }

    #[test]
    fn arduino_source_buckets() {
        assert_eq!(format_arduino_source(&Version::new(2, 4, 1)), "~1.20401.0");
        assert_eq!(format_arduino_source(&Version::new(2, 3, 0)), "~1.20300.0");
        assert_eq!(format_arduino_source(&Version::new(2, 4, 2)), "~2.20402.0");
        assert_eq!(format_arduino_source(&Version::new(2, 6, 2)), "~2.20602.0");
        assert_eq!(format_arduino_source(&Version::new(2, 7, 4)), "~3.20704.0");
        assert_eq!(format_arduino_source(&Version::new(3, 0, 2)), "~3.30002.0");
    }

    #[test]
    fn rtos_sdk_source() {
        assert_eq!(format_rtos_sdk_source(&Version::new(3, 4, 0)), "~v3.4");
        assert_eq!(format_rtos_sdk_source(&Version::new(3, 3, 9)), "~v3.3");
    }

    #[test]
    fn type_name_normalization() {
        assert_eq!(FrameworkKind::from_type_name("Arduino"), Some(FrameworkKind::Arduino));
        assert_eq!(
            FrameworkKind::from_type_name("ESP8266 RTOS SDK"),
            Some(FrameworkKind::RtosSdk)
        );
        assert_eq!(
            FrameworkKind::from_type_name("esp8266-rtos-sdk"),
            Some(FrameworkKind::RtosSdk)
        );
        assert_eq!(FrameworkKind::from_type_name("esp-idf"), None);
    }

    #[test]
    fn recommended_arduino_resolves_without_warnings() {
        let mut warnings = Warnings::new();
        let r = resolve_version(
            FrameworkKind::Arduino,
            declared("recommended"),
            "esp8266.framework",
            &mut warnings,
        )
        .unwrap();
        assert_eq!(r.version, Version::new(3, 0, 2));
        assert_eq!(r.source, "~3.30002.0");
        assert_eq!(r.platform_version, "platformio/espressif8266@3.2.0");
        assert!(warnings.is_empty());
    }

    #[test]
    fn dev_alias_uses_git_source() {
        let mut warnings = Warnings::new();
        let r = resolve_version(FrameworkKind::Arduino, declared("dev"), "f", &mut warnings)
            .unwrap();
        assert_eq!(r.source, "https://github.com/esp8266/Arduino.git");
    }

    #[test]
    fn rtos_sdk_aliases() {
        let mut warnings = Warnings::new();
        for alias in ["dev", "latest", "recommended"] {
            let r = resolve_version(FrameworkKind::RtosSdk, declared(alias), "f", &mut warnings)
                .unwrap();
            assert_eq!(r.version, Version::new(3, 4, 0));
            assert_eq!(r.source, "https://github.com/espressif/ESP8266_RTOS_SDK.git");
            assert_eq!(r.platform_version, "platformio/espressif8266@4.2.1");
        }
        assert!(warnings.is_empty());
    }

    #[test]
    fn alias_with_source_conflicts_for_both_frameworks() {
        for kind in [FrameworkKind::Arduino, FrameworkKind::RtosSdk] {
            for alias in ["dev", "latest", "recommended"] {
                let mut warnings = Warnings::new();
                let input = DeclaredVersion {
                    version: alias,
                    source: Some("https://example.com/fork.git"),
                    platform_version: None,
                };
                let err = resolve_version(kind, input, "esp8266.framework", &mut warnings)
                    .unwrap_err();
                match err {
                    PlatformError::Conflict { first, second, .. } => {
                        assert_eq!(first, "esp8266.framework.version");
                        assert_eq!(second, "esp8266.framework.source");
                    }
                    other => panic!("expected conflict, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn literal_version_keeps_explicit_source() {
        let mut warnings = Warnings::new();
        let input = DeclaredVersion {
            version: "2.7.4",
            source: Some("https://example.com/fork.git"),
            platform_version: None,
        };
        let r = resolve_version(FrameworkKind::Arduino, input, "f", &mut warnings).unwrap();
        assert_eq!(r.source, "https://example.com/fork.git");
        assert_eq!(r.platform_version, "platformio/espressif8266@2.6.3");
    }

    #[test]
    fn platform_version_thresholds() {
        let kind = FrameworkKind::Arduino;
        assert_eq!(kind.default_platform_version(&Version::new(3, 0, 0)), ARDUINO_3_PLATFORM_VERSION);
        assert_eq!(kind.default_platform_version(&Version::new(2, 5, 0)), ARDUINO_2_PLATFORM_VERSION);
        assert_eq!(
            kind.default_platform_version(&Version::new(2, 4, 2)),
            LEGACY_ARDUINO_PLATFORM_VERSION
        );
        assert_eq!(
            FrameworkKind::RtosSdk.default_platform_version(&Version::new(3, 3, 0)),
            RTOS_SDK_PLATFORM_VERSION
        );
    }

    #[test]
    fn non_recommended_version_warns() {
        let mut warnings = Warnings::new();
        resolve_version(FrameworkKind::Arduino, declared("2.7.4"), "f", &mut warnings).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings.iter().next(),
            Some(Warning::NonRecommendedVersion { .. })
        ));
    }

    #[test]
    fn malformed_literal_version_is_parse_error() {
        let mut warnings = Warnings::new();
        let err = resolve_version(
            FrameworkKind::Arduino,
            declared("2.7"),
            "esp8266.framework",
            &mut warnings,
        )
        .unwrap_err();
        match err {
            PlatformError::Parse { path, .. } => assert_eq!(path, "esp8266.framework.version"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn explicit_platform_version_constraint_is_qualified() {
        let mut warnings = Warnings::new();
        let input = DeclaredVersion {
            version: "recommended",
            source: None,
            platform_version: Some("^3.0.0"),
        };
        let r = resolve_version(FrameworkKind::Arduino, input, "f", &mut warnings).unwrap();
        assert_eq!(r.platform_version, "platformio/espressif8266@^3.0.0");
    }

    #[test]
    fn unknown_platform_version_passes_through() {
        let mut warnings = Warnings::new();
        let raw = "https://github.com/platformio/platform-espressif8266.git";
        assert_eq!(format_platform_version(raw, &mut warnings), raw);
        assert!(matches!(
            warnings.iter().next(),
            Some(Warning::UnknownPlatformVersion { .. })
        ));
    }

    #[test]
    fn spaced_range_is_not_a_constraint() {
        let mut warnings = Warnings::new();
        let raw = ">=1.0.0, <2.0.0";
        assert_eq!(format_platform_version(raw, &mut warnings), raw);
        assert_eq!(warnings.len(), 1);

        let mut warnings = Warnings::new();
        assert_eq!(
            format_platform_version(">=1.0.0,<2.0.0", &mut warnings),
            "platformio/espressif8266@>=1.0.0,<2.0.0"
        );
        assert!(warnings.is_empty());
    }
}
