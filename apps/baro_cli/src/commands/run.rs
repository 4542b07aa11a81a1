// apps/baro_cli/src/commands/run.rs

//! 运行模式命令
//!
//! 积分循环由 `ModelRunner` 完成：每步先求倾向与诊断量，把诊断量并入当前状态，
//! 在整点输出时刻调用监视器，再推进到下一时间层。

use anyhow::{Context, Result};
use baro_config::{ModelConfig, OutputFormat};
use baro_io::{SnapshotMonitor, SummaryMonitor};
use baro_physics::ModelRunner;
use clap::Args;
use std::path::PathBuf;
use tracing::{error, info, warn};

use super::{initial_state, load_config, model_builder};

/// 运行参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 时间步长 [分钟]，覆盖配置
    #[arg(long)]
    pub dt: Option<f64>,

    /// 积分时长 `<天>_<时>:<分>`，覆盖配置
    #[arg(short, long)]
    pub duration: Option<String>,

    /// 输出文件，覆盖配置
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 追加到已有输出文件
    #[arg(long)]
    pub append: bool,

    /// 使用非线性方程（覆盖配置中的线性化开关）
    #[arg(long)]
    pub nonlinear: bool,
}

impl RunArgs {
    /// 把命令行覆盖项写入配置
    fn apply(&self, config: &mut ModelConfig) {
        if let Some(dt) = self.dt {
            config.integration.dt_minutes = dt;
        }
        if let Some(duration) = &self.duration {
            config.integration.duration = duration.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.append {
            config.output.append = true;
        }
        if self.nonlinear {
            config.integration.linearized = false;
        }
    }
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== Barotropy 模式启动 ===");

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate().context("配置无效")?;

    let dt = config.timestep()?;
    let end = config.end_time()?;

    let state = initial_state(&config)?;
    let (nlat, nlon) = state.shape();
    info!(
        "初始状态: T{} {}x{} 网格, {}",
        state.ntrunc(),
        nlat,
        nlon,
        if state.is_linearized() { "线性化" } else { "非线性" }
    );

    let stepper = model_builder(&config)
        .build(&state)
        .context("构建倾向分量失败")?;

    let mut runner = ModelRunner::new(stepper);
    runner = attach_monitors(runner, &config)?;
    if runner.monitor_names().is_empty() {
        warn!("未配置任何监视器，积分结果不会输出");
    }

    let (last, summary) = match runner.run(state, dt, end) {
        Ok(result) => result,
        Err(err) => {
            error!("积分中止 (分量: {})", err.component().unwrap_or("-"));
            return Err(err).context("积分失败");
        }
    };

    info!("=== 积分完成 ===");
    info!("时间: {} -> {}", summary.start, summary.end);
    info!("总步数: {}", summary.steps);
    info!("输出次数: {}", summary.stores);
    info!("计算时间: {:.2} min", summary.wall_seconds / 60.0);
    info!("末状态时间: {}", last.time);

    Ok(())
}

fn attach_monitors(mut runner: ModelRunner, config: &ModelConfig) -> Result<ModelRunner> {
    let output = &config.output;
    match output.format {
        OutputFormat::Json => {
            let monitor = SnapshotMonitor::create(&output.path, output.append)
                .with_context(|| format!("无法创建输出文件: {}", output.path.display()))?;
            info!("输出: {} (每 {} 小时)", output.path.display(), output.ncout_freq);
            runner = runner.with_monitor(Box::new(monitor), output.ncout_freq);
        }
        OutputFormat::Netcdf => {
            runner = attach_netcdf(runner, config)?;
        }
        OutputFormat::None => {}
    }
    if output.summary_freq > 0 {
        runner = runner.with_monitor(Box::new(SummaryMonitor::new()), output.summary_freq);
    }
    Ok(runner)
}

#[cfg(feature = "netcdf")]
fn attach_netcdf(runner: ModelRunner, config: &ModelConfig) -> Result<ModelRunner> {
    let output = &config.output;
    let monitor = baro_io::NetCdfMonitor::create(&output.path, output.append)
        .with_context(|| format!("无法创建输出文件: {}", output.path.display()))?;
    info!("输出: {} (每 {} 小时)", output.path.display(), output.ncout_freq);
    Ok(runner.with_monitor(Box::new(monitor), output.ncout_freq))
}

#[cfg(not(feature = "netcdf"))]
fn attach_netcdf(_runner: ModelRunner, _config: &ModelConfig) -> Result<ModelRunner> {
    anyhow::bail!("NetCDF 输出需要以 `--features netcdf` 编译")
}
