//! Build pipeline orchestrator.
//!
//! normalize -> cross-validate -> collect -> emit. The collect phase lets
//! every component register state into the [`BuildContext`]; the emit phase
//! only runs once [`Build::finish`] consumes the build, so late registrations
//! are always seen by the pin-state arrays.

use std::collections::BTreeMap;
use std::path::Path;

use esp8266_boards::BoardCatalog;
use esp8266_core::Warnings;
use serde::Serialize;

use crate::codegen::{emit_pin_arrays, emit_platform, Directives};
use crate::config::pins::validate_pin;
use crate::config::schema::PLATFORM_KEY;
use crate::config::{
    final_validate, validate_platform, ConfigDocument, CoreSection, PinConfig, PlatformConfig,
    SchemaOptions,
};
use crate::context::{BuildContext, ExtraFile, IdfComponent, Registry, SdkconfigValue};
use crate::error::{PlatformError, Result};
use crate::power::{
    emit_power_management, validate_power_management, PowerManagementConfig, POWER_MANAGEMENT_KEY,
};

/// A configuration document after validation and cross-validation.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedConfig {
    #[serde(rename = "esphome")]
    pub core: CoreSection,
    #[serde(rename = "esp8266")]
    pub platform: PlatformConfig,
    #[serde(rename = "esp8266_pm")]
    pub power_management: Option<PowerManagementConfig>,
    pub pins: Vec<PinConfig>,
    #[serde(skip)]
    pub warnings: Warnings,
}

/// Everything a successful build produces.
#[derive(Debug, Clone, Serialize)]
pub struct BuildOutput {
    pub config: NormalizedConfig,
    pub directives: Directives,
    /// `sdkconfig` entries; RTOS SDK builds only.
    pub sdkconfig: Option<BTreeMap<String, SdkconfigValue>>,
    /// External SDK components; RTOS SDK builds only.
    pub components: Option<Registry<IdfComponent>>,
    /// Files to copy into the build tree, keyed by destination name.
    pub extra_build_files: Registry<ExtraFile>,
    pub warnings: Warnings,
}

/// Validate every section this platform owns and cross-check it against
/// the global build options.
///
/// `base_dir` is the directory relative paths resolve against.
pub fn normalize(document: &ConfigDocument, base_dir: &Path) -> Result<NormalizedConfig> {
    let mut warnings = Warnings::new();

    let raw_platform = match (&document.esp8266, &document.esp8266_pm) {
        (Some(raw), _) => raw,
        (None, Some(_)) => {
            return Err(PlatformError::schema(
                POWER_MANAGEMENT_KEY,
                format!("component {POWER_MANAGEMENT_KEY} requires component {PLATFORM_KEY}"),
            ))
        }
        (None, None) => {
            return Err(PlatformError::schema(PLATFORM_KEY, "required block is missing"))
        }
    };

    if !document.other.is_empty() {
        let blocks: Vec<&str> = document.other.keys().map(String::as_str).collect();
        tracing::debug!(?blocks, "blocks owned by other components left untouched");
    }

    let platform = validate_platform(raw_platform, &SchemaOptions::new(base_dir), &mut warnings)?;
    let power_management = document
        .esp8266_pm
        .as_ref()
        .map(validate_power_management)
        .transpose()?;
    let pins = document
        .pins
        .iter()
        .enumerate()
        .map(|(i, raw)| validate_pin(raw, &format!("pins[{i}]")))
        .collect::<Result<Vec<_>>>()?;

    final_validate(&platform, &document.esphome)?;

    Ok(NormalizedConfig {
        core: document.esphome.clone(),
        platform,
        power_management,
        pins,
        warnings,
    })
}

/// A build whose collect phase is still open.
#[derive(Debug)]
pub struct Build {
    config: NormalizedConfig,
    context: BuildContext,
    directives: Directives,
}

impl Build {
    /// Run the collect phase of every component.
    pub fn collect(mut config: NormalizedConfig, boards: &BoardCatalog) -> Result<Self> {
        let mut context = BuildContext::new(&config.platform);
        context
            .warnings_mut()
            .extend(std::mem::take(&mut config.warnings));
        let mut directives = Directives::new();

        emit_platform(&config.platform, &mut context, boards, &mut directives)?;
        if let Some(pm) = &config.power_management {
            emit_power_management(pm, &mut directives);
        }
        for pin in &config.pins {
            context.set_pin_initial_state(pin);
        }

        Ok(Self {
            config,
            context,
            directives,
        })
    }

    /// Access the context while the collect phase is open.
    pub fn context_mut(&mut self) -> &mut BuildContext {
        &mut self.context
    }

    pub fn directives_mut(&mut self) -> &mut Directives {
        &mut self.directives
    }

    /// Close the collect phase and run the emit phase.
    pub fn finish(self) -> BuildOutput {
        let Self {
            config,
            context,
            mut directives,
        } = self;
        emit_pin_arrays(&context, &mut directives);

        let (rtos_sdk, extra_build_files, warnings) = context.into_parts();
        let (sdkconfig, components) = match rtos_sdk {
            Some(state) => (Some(state.sdkconfig), Some(state.components)),
            None => (None, None),
        };

        tracing::info!(
            board = %config.platform.board,
            framework = %config.platform.framework.kind(),
            warnings = warnings.len(),
            "build directives ready"
        );

        BuildOutput {
            config,
            directives,
            sdkconfig,
            components,
            extra_build_files,
            warnings,
        }
    }
}

/// Run the whole pipeline on a configuration document.
///
/// Fails before any directive is produced if validation or cross-validation
/// fails.
pub fn run(document: &ConfigDocument, base_dir: &Path, boards: &BoardCatalog) -> Result<BuildOutput> {
    let config = normalize(document, base_dir)?;
    Ok(Build::collect(config, boards)?.finish())
}
