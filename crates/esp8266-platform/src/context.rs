//! Per-build state shared between the platform and its collaborators.
//!
//! A [`BuildContext`] is created from the normalized `esp8266` block and
//! then mutated in place while components register SDK options, external
//! components, extra files and pin states. It lives for exactly one build.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use esp8266_core::{TimePeriod, Version, Warnings};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::codegen::BundledAsset;
use crate::config::{PinConfig, PinMode, PlatformConfig};
use crate::error::{PlatformError, Result};
use crate::framework::FrameworkKind;

/// Target platform tag recorded for every build.
pub const TARGET_PLATFORM: &str = "esp8266";

/// Number of GPIOs with a boot-time initial state.
pub const PIN_STATE_SLOTS: usize = 16;

/// Ordered map where the first registration of a key wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under `key` unless the key is already present.
    ///
    /// Returns `true` when the value was inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, value));
        true
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Serialize> Serialize for Registry<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Source of a file copied into the build tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFile {
    /// Shipped with this crate.
    Bundled(BundledAsset),
    /// Read from disk at copy time.
    Path(PathBuf),
}

/// A typed `sdkconfig` entry.
///
/// The platform never writes `Hex` itself. Components registering through
/// [`BuildContext::add_sdkconfig_option`] use it for addresses and offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SdkconfigValue {
    Bool(bool),
    Int(i64),
    /// Rendered in hexadecimal.
    Hex(u64),
    /// Rendered as a quoted string.
    Str(String),
    /// Passed through verbatim.
    Raw(String),
}

impl fmt::Display for SdkconfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkconfigValue::Bool(true) => f.write_str("y"),
            SdkconfigValue::Bool(false) => f.write_str("n"),
            SdkconfigValue::Int(i) => write!(f, "{i}"),
            SdkconfigValue::Hex(h) => write!(f, "{h:#x}"),
            SdkconfigValue::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            SdkconfigValue::Raw(raw) => f.write_str(raw),
        }
    }
}

impl From<bool> for SdkconfigValue {
    fn from(b: bool) -> Self {
        SdkconfigValue::Bool(b)
    }
}

impl From<i64> for SdkconfigValue {
    fn from(i: i64) -> Self {
        SdkconfigValue::Int(i)
    }
}

impl From<&str> for SdkconfigValue {
    fn from(s: &str) -> Self {
        SdkconfigValue::Str(s.to_string())
    }
}

/// An external SDK component to be fetched by the build orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdfComponent {
    pub repo: String,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub path: Option<String>,
    pub refresh: Option<TimePeriod>,
    /// Sub-components to build from the repository; empty means all.
    pub components: Vec<String>,
    pub submodules: Option<Vec<String>>,
}

impl IdfComponent {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            git_ref: None,
            path: None,
            refresh: None,
            components: Vec::new(),
            submodules: None,
        }
    }
}

/// Desired boot-time state of one GPIO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PinInitialState {
    pub mode: PinMode,
    /// Output level, `true` for high.
    pub level: bool,
}

/// State that only exists for RTOS SDK builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RtosSdkState {
    pub sdkconfig: BTreeMap<String, SdkconfigValue>,
    pub components: Registry<IdfComponent>,
}

/// Mutable per-build state.
#[derive(Debug, Clone, Serialize)]
pub struct BuildContext {
    target_platform: &'static str,
    framework: FrameworkKind,
    framework_version: Version,
    board: String,
    pin_states: [Option<PinInitialState>; PIN_STATE_SLOTS],
    rtos_sdk: Option<RtosSdkState>,
    extra_build_files: Registry<ExtraFile>,
    #[serde(skip)]
    warnings: Warnings,
}

impl BuildContext {
    /// Fresh context for a normalized platform block.
    pub fn new(config: &PlatformConfig) -> Self {
        let framework = config.framework.kind();
        Self {
            target_platform: TARGET_PLATFORM,
            framework,
            framework_version: config.framework.version().clone(),
            board: config.board.clone(),
            pin_states: [None; PIN_STATE_SLOTS],
            rtos_sdk: (framework == FrameworkKind::RtosSdk).then(RtosSdkState::default),
            extra_build_files: Registry::new(),
            warnings: Warnings::new(),
        }
    }

    pub fn target_platform(&self) -> &'static str {
        self.target_platform
    }

    /// Framework tag as seen by the rest of the build (`arduino` or `esp-idf`).
    pub fn target_framework(&self) -> &'static str {
        self.framework.target_framework()
    }

    pub fn framework(&self) -> FrameworkKind {
        self.framework
    }

    pub fn framework_version(&self) -> &Version {
        &self.framework_version
    }

    pub fn board(&self) -> &str {
        &self.board
    }

    pub fn using_rtos_sdk(&self) -> bool {
        self.rtos_sdk.is_some()
    }

    /// Set an `sdkconfig` entry. Later writes replace earlier ones.
    pub fn add_sdkconfig_option(
        &mut self,
        name: impl Into<String>,
        value: impl Into<SdkconfigValue>,
    ) -> Result<()> {
        let state = self.rtos_sdk_mut("add_sdkconfig_option")?;
        state.sdkconfig.insert(name.into(), value.into());
        Ok(())
    }

    /// Register an external SDK component. Duplicate names are ignored.
    pub fn add_idf_component(
        &mut self,
        name: impl Into<String>,
        component: IdfComponent,
    ) -> Result<bool> {
        let name = name.into();
        let state = self.rtos_sdk_mut("add_idf_component")?;
        let added = state.components.insert_if_absent(name.as_str(), component);
        if !added {
            tracing::debug!(%name, "component already registered, keeping the first");
        }
        Ok(added)
    }

    /// Register a file to be copied into the build tree as `filename`.
    ///
    /// Returns `false` if a file with that name was already registered.
    pub fn add_extra_build_file(&mut self, filename: impl Into<String>, file: ExtraFile) -> bool {
        self.extra_build_files.insert_if_absent(filename, file)
    }

    /// Record the boot-time state of a GPIO. GPIO16 has no slot and is skipped.
    pub fn set_pin_initial_state(&mut self, pin: &PinConfig) -> bool {
        let Some(slot) = self.pin_states.get_mut(usize::from(pin.number)) else {
            return false;
        };
        *slot = Some(PinInitialState {
            mode: pin.mode,
            level: pin.inverted,
        });
        true
    }

    pub fn pin_states(&self) -> &[Option<PinInitialState>; PIN_STATE_SLOTS] {
        &self.pin_states
    }

    pub fn sdkconfig(&self) -> Option<&BTreeMap<String, SdkconfigValue>> {
        self.rtos_sdk.as_ref().map(|s| &s.sdkconfig)
    }

    pub fn idf_components(&self) -> Option<&Registry<IdfComponent>> {
        self.rtos_sdk.as_ref().map(|s| &s.components)
    }

    pub fn extra_build_files(&self) -> &Registry<ExtraFile> {
        &self.extra_build_files
    }

    pub fn warnings(&self) -> &Warnings {
        &self.warnings
    }

    pub fn warnings_mut(&mut self) -> &mut Warnings {
        &mut self.warnings
    }

    pub(crate) fn into_parts(self) -> (Option<RtosSdkState>, Registry<ExtraFile>, Warnings) {
        (self.rtos_sdk, self.extra_build_files, self.warnings)
    }

    fn rtos_sdk_mut(&mut self, operation: &'static str) -> Result<&mut RtosSdkState> {
        self.rtos_sdk
            .as_mut()
            .ok_or(PlatformError::NotRtosSdk { operation })
    }
}
