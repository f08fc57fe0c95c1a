//! Trace Dash CLI
//!
//! 汇总 JSONL trace 文件，或实时跟踪仍在写入的 trace

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};
use trace_dash::{
    cli::{handle_dash, handle_follow, handle_summary, LiveArgs, SummaryArgs},
    config::config_dir,
    DashConfig, DashboardSessions,
};

const DEFAULT_LOG_FILTER: &str = "trace_dash=info,tdash=info";

#[derive(Parser)]
#[command(name = "tdash")]
#[command(about = "Trace Dash - JSONL trace 汇总与实时仪表盘")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 打印已结束的 trace 文件的汇总
    Summary(SummaryArgs),
    /// 终端实时仪表盘（内存曲线 + syscall 直方图）
    Dash(LiveArgs),
    /// 无界面实时跟踪，每次变化打印一行状态
    Follow(LiveArgs),
}

/// 初始化 tracing 日志系统
///
/// 通过 RUST_LOG 环境变量控制日志级别，其次是配置文件中的 log_filter。
/// 仪表盘模式下日志写入 `~/.config/trace-dash/tdash.log`，避免破坏终端画面。
fn init_tracing(config: &DashConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(config.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
    });

    if to_file {
        let dir = config_dir();
        fs::create_dir_all(&dir).with_context(|| format!("无法创建日志目录: {}", dir.display()))?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("tdash.log"))?;
        fmt()
            .with_writer(Mutex::new(file))
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(false)
            .init();
    } else {
        fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 配置文件损坏时退回默认值，不阻止启动
    let (config, config_error) = match DashConfig::load() {
        Ok(config) => (config, None),
        Err(e) => {
            let mut config = DashConfig::default();
            config.apply_env(|key| std::env::var(key).ok());
            (config, Some(e))
        }
    };

    init_tracing(&config, matches!(cli.command, Commands::Dash(_)))?;
    if let Some(e) = config_error {
        warn!("ignoring config: {:#}", e);
    }

    let sessions = DashboardSessions::new();

    match cli.command {
        Commands::Summary(args) => handle_summary(args)?,
        Commands::Dash(args) => handle_dash(args, config, &sessions)?,
        Commands::Follow(args) => handle_follow(args, config, &sessions).await?,
    }

    Ok(())
}
