// apps/baro_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 检查配置文件能否解析、取值是否有效，并试构造初始状态与倾向分量。

use anyhow::{bail, Result};
use baro_config::{InitialSource, ModelConfig, OutputFormat};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::{initial_state, model_builder};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== Barotropy 配置验证 ===");

    let Some(config_path) = &args.config else {
        println!("用法: barotropy validate --config <配置文件> [--strict]");
        return Ok(());
    };

    let mut result = ValidationResult::default();
    validate_config(config_path, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return;
    }

    let config = match ModelConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };
    println!("  ✓ 配置文件格式有效");

    check_warnings(&config, result);
    check_model(&config, result);
}

fn check_warnings(config: &ModelConfig, result: &mut ValidationResult) {
    if config.integration.dt_minutes > 30.0 {
        result.add_warning(format!(
            "时间步长 {} 分钟较大，可能不稳定",
            config.integration.dt_minutes
        ));
    }
    if config.damping.enabled != config.forcing.enabled {
        result.add_warning("阻尼与强迫未同时开关");
    }
    if !config.diffusion.enabled {
        result.add_warning("未启用超扩散，小尺度能量会堆积");
    }
    if let InitialSource::Netcdf { path } = &config.initial.source {
        if !path.exists() {
            result.add_error(format!("初始场文件不存在: {}", path.display()));
        }
    }
    let output = &config.output;
    if output.format != OutputFormat::None && !output.append && output.path.exists() {
        result.add_warning(format!("输出文件将被覆盖: {}", output.path.display()));
    }
    if output.format == OutputFormat::Netcdf && cfg!(not(feature = "netcdf")) {
        result.add_error("NetCDF 输出需要以 `--features netcdf` 编译");
    }
}

/// 试构造初始状态与倾向分量（NetCDF 初始场只检查文件是否存在）
fn check_model(config: &ModelConfig, result: &mut ValidationResult) {
    if matches!(config.initial.source, InitialSource::Netcdf { .. }) {
        return;
    }
    match initial_state(config) {
        Ok(state) => match model_builder(config).build(&state) {
            Ok(stepper) => println!(
                "  ✓ 分量: {}",
                stepper.component_names().join(", ")
            ),
            Err(e) => result.add_error(format!("构建倾向分量失败: {e}")),
        },
        Err(e) => result.add_error(format!("{e:#}")),
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_grid_is_error() {
        let mut config = ModelConfig::default();
        config.initial.nlat = 37;
        config.initial.nlon = 72;
        let mut result = ValidationResult::default();
        check_model(&config, &mut result);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_warnings_do_not_fail_unless_strict() {
        let mut config = ModelConfig::default();
        config.diffusion.enabled = false;
        config.output.format = OutputFormat::None;
        let mut result = ValidationResult::default();
        check_warnings(&config, &mut result);
        assert!(result.is_ok());
        assert!(!result.is_ok_strict());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut result = ValidationResult::default();
        validate_config(&dir.path().join("none.json"), &mut result);
        assert_eq!(result.errors.len(), 1);
    }
}
