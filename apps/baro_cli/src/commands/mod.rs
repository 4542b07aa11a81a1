// apps/baro_cli/src/commands/mod.rs

//! 子命令与共用的配置装配

pub mod info;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use baro_config::{InitialSource, ModelConfig};
use baro_io::InitialConditions;
use baro_physics::{AtmosphericState, ForcingSpec, Formulation, ModelBuilder};
use std::path::Path;
use tracing::info;

/// 读取配置文件；未给出路径时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(path) => {
            let config = ModelConfig::from_file(path)
                .with_context(|| format!("无法加载配置文件: {}", path.display()))?;
            info!("配置: {}", path.display());
            Ok(config)
        }
        None => {
            info!("未指定配置文件，使用默认配置");
            Ok(ModelConfig::default())
        }
    }
}

/// 按配置读取或生成初始风场
pub fn initial_conditions(config: &ModelConfig) -> Result<InitialConditions> {
    let (nlat, nlon) = (config.initial.nlat, config.initial.nlon);
    let ic = match &config.initial.source {
        InitialSource::Rest => InitialConditions::at_rest(nlat, nlon)?,
        InitialSource::SolidBody { speed } => InitialConditions::solid_body(nlat, nlon, *speed)?,
        InitialSource::Netcdf { path } => InitialConditions::from_netcdf(path)
            .with_context(|| format!("无法读取初始场: {}", path.display()))?,
    };
    Ok(ic)
}

/// 构造初始状态
pub fn initial_state(config: &ModelConfig) -> Result<AtmosphericState> {
    let integration = &config.integration;
    let state = initial_conditions(config)?
        .into_state(
            integration.linearized,
            integration.ntrunc,
            config.constants,
            integration.start_time,
        )
        .context("无法构造初始状态")?;
    Ok(state)
}

/// 把配置翻译为模型构建器
///
/// 分量顺序固定为动力、扩散、强迫、阻尼。
pub fn model_builder(config: &ModelConfig) -> ModelBuilder {
    let integration = &config.integration;
    let mut builder = ModelBuilder::new(
        Formulation::from_linearized(integration.linearized),
        integration.ntrunc,
        config.constants,
    )
    .with_robert_coefficient(integration.robert_coefficient)
    .with_parallel_evaluation(integration.parallel_components)
    .with_tendency_diagnostics(config.output.tendency_diagnostics);

    if config.diffusion.enabled {
        builder = builder.with_diffusion(config.diffusion.k);
    }
    if config.forcing.enabled {
        builder = builder.with_forcing(ForcingSpec {
            centerlocs: config.forcing.centerlocs.clone(),
            amplitudes: config.forcing.amplitudes.clone(),
            widths: config.forcing.widths.clone(),
        });
    }
    if config.damping.enabled {
        builder = builder.with_damping(config.damping.tau_days);
    }
    builder
}
