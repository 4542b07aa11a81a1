// apps/baro_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置以及某个配置对应的积分规模。

use anyhow::{Context, Result};
use baro_config::{format_duration, ModelConfig};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示系统信息
    #[arg(long)]
    pub system: bool,

    /// 以 JSON 输出默认配置
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== Barotropy 信息 ===");

    if args.system {
        print_system_info();
    }

    if args.defaults {
        print_default_config()?;
    }

    if let Some(path) = &args.config {
        let config = load_config(Some(path))?;
        print_run_info(&config)?;
    }

    if args.config.is_none() && !args.system && !args.defaults {
        print_system_info();
        println!();
        print_run_info(&ModelConfig::default())?;
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("Barotropy 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
    println!("并行线程: {}", std::thread::available_parallelism().map_or(1, |n| n.get()));
    println!(
        "NetCDF 支持: {}",
        if cfg!(feature = "netcdf") { "✓" } else { "✗" }
    );
}

fn print_default_config() -> Result<()> {
    let json = ModelConfig::default()
        .to_json_pretty()
        .context("无法序列化默认配置")?;
    println!("{json}");
    Ok(())
}

fn print_run_info(config: &ModelConfig) -> Result<()> {
    let integration = &config.integration;
    let dt = config.timestep()?;
    let duration = config.run_duration()?;
    let end = config.end_time()?;
    let n = integration.ntrunc;
    let steps = duration.num_seconds() / dt.num_seconds() + 1;

    println!("=== 积分设置 ===");
    println!("方程: {}", if integration.linearized { "线性化" } else { "非线性" });
    println!("截断: T{n} ({} 个谱系数)", (n + 1) * (n + 2) / 2);
    println!(
        "最小网格: 规则 {}x{}, 高斯 {}x{}",
        2 * n + 1,
        2 * n + 1,
        n + 1,
        2 * n + 1
    );
    println!("时间步长: {} s", dt.num_seconds());
    println!("时长: {} ({} -> {})", format_duration(duration), integration.start_time, end);
    println!("步数: {steps}");
    println!("Robert–Asselin 系数: {}", integration.robert_coefficient);

    println!("\n=== 物理过程 ===");
    println!(
        "超扩散: {}",
        if config.diffusion.enabled { format!("k = {:e} m⁴/s", config.diffusion.k) } else { "关闭".into() }
    );
    println!(
        "强迫: {}",
        if config.forcing.enabled { format!("{} 个高斯源", config.forcing.centerlocs.len()) } else { "关闭".into() }
    );
    println!(
        "阻尼: {}",
        if config.damping.enabled { format!("τ = {} 天", config.damping.tau_days) } else { "关闭".into() }
    );

    println!("\n=== 输出 ===");
    println!("格式: {:?}", config.output.format);
    println!("文件: {}", config.output.path.display());
    println!("间隔: {} 小时", config.output.ncout_freq);
    Ok(())
}
