//! Directive emission for the `esp8266` block.

use esp8266_boards::BoardCatalog;
use esp8266_core::{version_code, Warning};

use crate::codegen::directives::Directives;
use crate::codegen::expr::Expression;
use crate::codegen::files::BundledAsset;
use crate::config::{
    ArduinoFramework, ComponentSource, FrameworkConfig, PlatformConfig, RtosSdkFramework,
};
use crate::context::{BuildContext, ExtraFile, IdfComponent, SdkconfigValue};
use crate::error::Result;

/// Name under which a user partition table is copied into the build tree.
pub const PARTITIONS_FILE: &str = "partitions.csv";
/// Name of the bundled post-build script in the build tree.
pub const POST_BUILD_SCRIPT: &str = "post_build.py";

const TOOLCHAIN_PACKAGE: &str = "platformio/toolchain-xtensa@^2.0.0";

/// Emit every directive derived from the normalized platform block.
pub fn emit_platform(
    config: &PlatformConfig,
    ctx: &mut BuildContext,
    boards: &BoardCatalog,
    out: &mut Directives,
) -> Result<()> {
    out.add_statement(Expression::call("esp8266::setup_preferences", vec![]));

    out.set_option("board", config.board.as_str())?;
    out.set_option("board_upload.flash_size", config.flash_size.label())?;
    out.add_build_flag("-DUSE_ESP8266");
    out.add_define_value("ESPHOME_BOARD", Expression::str(config.board.as_str()));
    out.add_define_value("ESPHOME_VARIANT", Expression::str("ESP8266"));
    out.set_option("lib_ldf_mode", "off")?;
    out.set_option("platform", config.framework.platform_version())?;

    add_extra_script(ctx, out, "post", POST_BUILD_SCRIPT, BundledAsset::PostBuildScript)?;
    if let Some(partitions) = &config.partitions {
        ctx.add_extra_build_file(PARTITIONS_FILE, ExtraFile::Path(partitions.clone()));
    }

    let code = Expression::raw(version_code(ctx.framework_version()));
    match &config.framework {
        FrameworkConfig::RtosSdk(sdk) => emit_rtos_sdk(sdk, ctx, out, code)?,
        FrameworkConfig::Arduino(arduino) => emit_arduino(config, arduino, boards, out, code)?,
    }

    tracing::debug!(
        board = %config.board,
        framework = %config.framework.kind(),
        options = out.options().len(),
        flags = out.build_flags().len(),
        "emitted platform directives"
    );
    Ok(())
}

/// Register a bundled script and hook it into the build at `stage`.
fn add_extra_script(
    ctx: &mut BuildContext,
    out: &mut Directives,
    stage: &str,
    filename: &str,
    asset: BundledAsset,
) -> Result<()> {
    if ctx.add_extra_build_file(filename, ExtraFile::Bundled(asset)) {
        out.extend_option("extra_scripts", [format!("{stage}:{filename}")])?;
    }
    Ok(())
}

fn emit_rtos_sdk(
    sdk: &RtosSdkFramework,
    ctx: &mut BuildContext,
    out: &mut Directives,
    version_code: Expression,
) -> Result<()> {
    out.set_option("framework", "esp8266-rtos-sdk")?;
    out.add_build_flag("-DUSE_ESP_IDF");
    out.add_build_flag("-DUSE_ESP8266_FRAMEWORK_ESP_IDF");
    out.add_build_flag("-Wno-nonnull-compare");
    out.extend_option(
        "platform_packages",
        [format!("espressif/framework-esp8266-rtos-sdk@{}", sdk.source)],
    )?;
    out.extend_option("platform_packages", [TOOLCHAIN_PACKAGE])?;

    ctx.add_sdkconfig_option("CONFIG_PARTITION_TABLE_SINGLE_APP", false)?;
    ctx.add_sdkconfig_option("CONFIG_PARTITION_TABLE_CUSTOM", true)?;
    ctx.add_sdkconfig_option("CONFIG_PARTITION_TABLE_CUSTOM_FILENAME", PARTITIONS_FILE)?;
    ctx.add_sdkconfig_option("CONFIG_COMPILER_OPTIMIZATION_DEFAULT", false)?;
    ctx.add_sdkconfig_option("CONFIG_COMPILER_OPTIMIZATION_SIZE", true)?;
    // 1 kHz tick gives delay() a 1 ms resolution.
    ctx.add_sdkconfig_option("CONFIG_FREERTOS_HZ", SdkconfigValue::Int(1000))?;
    ctx.add_sdkconfig_option("CONFIG_ESP_TASK_WDT", true)?;
    ctx.add_sdkconfig_option("CONFIG_ESP_TASK_WDT_PANIC", true)?;
    ctx.add_sdkconfig_option("CONFIG_ESP_TASK_WDT_CHECK_IDLE_TASK_CPU0", false)?;
    ctx.add_sdkconfig_option("CONFIG_ESP_TASK_WDT_CHECK_IDLE_TASK_CPU1", false)?;

    out.set_option("board_build.partitions", PARTITIONS_FILE)?;

    for (name, value) in &sdk.sdkconfig_options {
        ctx.add_sdkconfig_option(name.as_str(), SdkconfigValue::Raw(value.clone()))?;
    }

    out.add_define_value("USE_ESP_IDF_VERSION_CODE", version_code);

    for component in &sdk.components {
        match &component.source {
            ComponentSource::Git { url, git_ref } => {
                let idf = IdfComponent {
                    git_ref: git_ref.clone(),
                    path: component.path.clone(),
                    refresh: Some(component.refresh),
                    ..IdfComponent::new(url.as_str())
                };
                ctx.add_idf_component(component.name.as_str(), idf)?;
            }
            ComponentSource::Local { .. } => {
                ctx.warnings_mut().push(Warning::LocalComponentUnsupported {
                    name: component.name.clone(),
                });
            }
        }
    }
    Ok(())
}

fn emit_arduino(
    config: &PlatformConfig,
    arduino: &ArduinoFramework,
    boards: &BoardCatalog,
    out: &mut Directives,
    version_code: Expression,
) -> Result<()> {
    out.set_option("framework", "arduino")?;
    out.add_build_flag("-DUSE_ARDUINO");
    out.add_build_flag("-DUSE_ESP8266_FRAMEWORK_ARDUINO");
    out.add_build_flag("-Wno-nonnull-compare");
    out.extend_option(
        "platform_packages",
        [format!("platformio/framework-arduinoespressif8266@{}", arduino.source)],
    )?;

    // MSS 1460 without the optional lwIP features.
    out.add_build_flag("-DPIO_FRAMEWORK_ARDUINO_LWIP2_HIGHER_BANDWIDTH_LOW_FLASH");

    if arduino.restore_from_flash {
        out.add_define("USE_ESP8266_PREFERENCES_FLASH");
    }
    if arduino.early_pin_init {
        out.add_define("USE_ESP8266_EARLY_PIN_INIT");
    }

    // Allocation failure aborts instead of returning nullptr.
    out.add_build_flag("-DNEW_OOM_ABORT");

    out.set_option("board_build.flash_mode", arduino.board_flash_mode.as_str())?;
    out.add_define_value("USE_ARDUINO_VERSION_CODE", version_code);

    if let Some(script) = boards.ld_script(&config.board, &arduino.version) {
        out.set_option("board_build.ldscript", script)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use esp8266_boards::FlashSize;
    use esp8266_core::{TimePeriod, Version};

    use super::*;
    use crate::codegen::directives::BuildOption;
    use crate::config::{ComponentRef, FlashMode};

    fn arduino(board: &str, version: Version) -> PlatformConfig {
        PlatformConfig {
            board: board.into(),
            flash_size: FlashSize::Mb4,
            partitions: None,
            framework: FrameworkConfig::Arduino(ArduinoFramework {
                version,
                source: "~3.30002.0".into(),
                platform_version: "platformio/espressif8266@3.2.0".into(),
                restore_from_flash: true,
                early_pin_init: false,
                board_flash_mode: FlashMode::Dio,
            }),
        }
    }

    fn rtos_sdk(components: Vec<ComponentRef>) -> PlatformConfig {
        let mut sdkconfig_options = BTreeMap::new();
        sdkconfig_options.insert("CONFIG_LWIP_IPV6".to_string(), "y".to_string());
        PlatformConfig {
            board: "nodemcuv2".into(),
            flash_size: FlashSize::Mb4,
            partitions: Some(PathBuf::from("/cfg/parts.csv")),
            framework: FrameworkConfig::RtosSdk(RtosSdkFramework {
                version: Version::new(3, 4, 0),
                source: "~v3.4".into(),
                platform_version: "platformio/espressif8266@4.2.1".into(),
                sdkconfig_options,
                components,
            }),
        }
    }

    fn emit(config: &PlatformConfig) -> (BuildContext, Directives) {
        let mut ctx = BuildContext::new(config);
        let mut out = Directives::new();
        emit_platform(config, &mut ctx, &BoardCatalog::builtin(), &mut out).unwrap();
        (ctx, out)
    }

    fn scalar(out: &Directives, key: &str) -> Option<String> {
        match out.option(key) {
            Some(BuildOption::Scalar(v)) => Some(v.clone()),
            _ => None,
        }
    }

    fn list(out: &Directives, key: &str) -> Vec<String> {
        match out.option(key) {
            Some(BuildOption::List(v)) => v.clone(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn common_directives() {
        let (ctx, out) = emit(&arduino("nodemcuv2", Version::new(3, 0, 2)));
        assert_eq!(scalar(&out, "board").as_deref(), Some("nodemcuv2"));
        assert_eq!(scalar(&out, "board_upload.flash_size").as_deref(), Some("4MB"));
        assert_eq!(scalar(&out, "lib_ldf_mode").as_deref(), Some("off"));
        assert_eq!(
            scalar(&out, "platform").as_deref(),
            Some("platformio/espressif8266@3.2.0")
        );
        assert_eq!(list(&out, "extra_scripts"), vec!["post:post_build.py"]);
        assert!(out.build_flags().contains(&"-DUSE_ESP8266".to_string()));
        assert_eq!(
            out.define("ESPHOME_VARIANT").unwrap().value,
            Some(Expression::str("ESP8266"))
        );
        assert_eq!(out.statements()[0].to_string(), "esp8266::setup_preferences()");
        assert!(ctx.extra_build_files().contains(POST_BUILD_SCRIPT));
    }

    #[test]
    fn arduino_directives() {
        let (_, out) = emit(&arduino("nodemcuv2", Version::new(3, 0, 2)));
        assert_eq!(scalar(&out, "framework").as_deref(), Some("arduino"));
        assert_eq!(
            list(&out, "platform_packages"),
            vec!["platformio/framework-arduinoespressif8266@~3.30002.0"]
        );
        for flag in [
            "-DUSE_ARDUINO",
            "-DUSE_ESP8266_FRAMEWORK_ARDUINO",
            "-Wno-nonnull-compare",
            "-DPIO_FRAMEWORK_ARDUINO_LWIP2_HIGHER_BANDWIDTH_LOW_FLASH",
            "-DNEW_OOM_ABORT",
        ] {
            assert!(out.build_flags().contains(&flag.to_string()), "missing {flag}");
        }
        assert!(out.define("USE_ESP8266_PREFERENCES_FLASH").is_some());
        assert!(out.define("USE_ESP8266_EARLY_PIN_INIT").is_none());
        assert_eq!(scalar(&out, "board_build.flash_mode").as_deref(), Some("dio"));
        assert_eq!(
            out.define("USE_ARDUINO_VERSION_CODE").unwrap().value,
            Some(Expression::raw("VERSION_CODE(3, 0, 2)"))
        );
        assert_eq!(
            scalar(&out, "board_build.ldscript").as_deref(),
            Some("eagle.flash.4m.ld")
        );
    }

    #[test]
    fn ld_script_thresholds() {
        let script = |version| scalar(&emit(&arduino("d1_mini_pro", version)).1, "board_build.ldscript");
        assert_eq!(script(Version::new(2, 3, 0)), None);
        assert_eq!(script(Version::new(2, 4, 2)).as_deref(), Some("eagle.flash.16m.ld"));
        assert_eq!(script(Version::new(2, 4, 3)).as_deref(), Some("eagle.flash.16m14m.ld"));
    }

    #[test]
    fn unknown_board_gets_no_ld_script() {
        let (_, out) = emit(&arduino("my-custom-board", Version::new(3, 0, 2)));
        assert!(out.option("board_build.ldscript").is_none());
        assert_eq!(scalar(&out, "board").as_deref(), Some("my-custom-board"));
    }

    #[test]
    fn rtos_sdk_directives() {
        let (ctx, out) = emit(&rtos_sdk(Vec::new()));
        assert_eq!(scalar(&out, "framework").as_deref(), Some("esp8266-rtos-sdk"));
        assert_eq!(
            list(&out, "platform_packages"),
            vec![
                "espressif/framework-esp8266-rtos-sdk@~v3.4".to_string(),
                TOOLCHAIN_PACKAGE.to_string()
            ]
        );
        assert_eq!(scalar(&out, "board_build.partitions").as_deref(), Some("partitions.csv"));
        assert!(out.build_flags().contains(&"-DUSE_ESP_IDF".to_string()));
        assert_eq!(
            out.define("USE_ESP_IDF_VERSION_CODE").unwrap().value,
            Some(Expression::raw("VERSION_CODE(3, 4, 0)"))
        );

        let sdkconfig = ctx.sdkconfig().unwrap();
        assert_eq!(sdkconfig["CONFIG_FREERTOS_HZ"], SdkconfigValue::Int(1000));
        assert_eq!(sdkconfig["CONFIG_COMPILER_OPTIMIZATION_SIZE"], SdkconfigValue::Bool(true));
        assert_eq!(
            sdkconfig["CONFIG_PARTITION_TABLE_CUSTOM_FILENAME"],
            SdkconfigValue::Str("partitions.csv".into())
        );
        assert_eq!(sdkconfig["CONFIG_LWIP_IPV6"], SdkconfigValue::Raw("y".into()));
        assert_eq!(
            ctx.extra_build_files().get(PARTITIONS_FILE),
            Some(&ExtraFile::Path(PathBuf::from("/cfg/parts.csv")))
        );
    }

    #[test]
    fn duplicate_components_keep_first() {
        let git = |url: &str| ComponentSource::Git {
            url: url.into(),
            git_ref: None,
        };
        let component = |name: &str, source| ComponentRef {
            name: name.into(),
            source,
            path: None,
            refresh: TimePeriod::NEVER,
        };
        let (ctx, _) = emit(&rtos_sdk(vec![
            component("dsp", git("https://example.com/first.git")),
            component("dsp", git("https://example.com/second.git")),
            component("local", ComponentSource::Local { path: "/tmp".into() }),
        ]));
        let components = ctx.idf_components().unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components.get("dsp").unwrap().repo, "https://example.com/first.git");
        assert_eq!(components.get("dsp").unwrap().refresh, Some(TimePeriod::NEVER));
        assert!(ctx
            .warnings()
            .iter()
            .any(|w| matches!(w, Warning::LocalComponentUnsupported { name } if name == "local")));
    }
}
