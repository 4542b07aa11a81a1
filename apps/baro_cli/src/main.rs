// apps/baro_cli/src/main.rs

//! `barotropy` 可执行程序入口
//!
//! 子命令：
//! - `run`：按配置积分正压涡度方程，并在输出时刻调用监视器
//! - `info`：打印配置摘要、默认值或网格/截断信息
//! - `validate`：只做配置检查，不构造模式
//!
//! 配置到 `ModelBuilder` 的翻译只发生在 `commands` 中。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "barotropy")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spectral barotropic vorticity equation model", long_about = None)]
struct Cli {
    /// 日志级别：trace / debug / info / warn / error
    #[arg(short, long, default_value = "info", value_parser = parse_level)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 积分模式
    Run(commands::run::RunArgs),
    /// 查看配置与网格信息
    Info(commands::info::InfoArgs),
    /// 检查配置文件
    Validate(commands::validate::ValidateArgs),
}

/// 解析日志级别，不区分大小写；未知级别直接报错
fn parse_level(value: &str) -> Result<Level, String> {
    match value.to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(format!("未知日志级别 '{other}'")),
    }
}

fn init_logging(level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_case_insensitive() {
        assert_eq!(parse_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_level("Warning").unwrap(), Level::WARN);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_unknown_level_rejected_by_cli() {
        assert!(Cli::try_parse_from(["barotropy", "-l", "loud", "validate"]).is_err());
        let cli = Cli::try_parse_from(["barotropy", "--log-level", "trace", "validate"]).unwrap();
        assert_eq!(cli.log_level, Level::TRACE);
        assert!(matches!(cli.command, Commands::Validate(_)));
    }
}
