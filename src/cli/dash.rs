//! `tdash dash` / `tdash follow` 命令 - live 模式
//!
//! 两个命令共用同一个 `LiveMonitor`，区别只在渲染端：
//! `dash` 使用终端仪表盘，`follow` 每次状态变化打印一行。

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::aggregate::ChartState;
use crate::config::DashConfig;
use crate::live::{run_headless, ConsoleSink, LiveMonitor};
use crate::session::DashboardSessions;
use crate::tui::{init_terminal, restore_terminal, run, App};

/// Live 模式参数
#[derive(Args, Debug)]
pub struct LiveArgs {
    /// JSONL trace 文件（可以仍在写入）
    pub path: PathBuf,
    /// poll 间隔（毫秒），状态栏的秒数按该间隔换算
    #[arg(long, short)]
    pub interval: Option<u64>,
    /// 内存曲线最多保留的点数
    #[arg(long)]
    pub max_points: Option<usize>,
}

impl LiveArgs {
    /// 合并配置文件 / 环境变量 / 命令行参数
    pub fn resolve(&self, base: DashConfig) -> DashConfig {
        base.with_overrides(self.interval, self.max_points)
    }

    fn monitor(&self, config: &DashConfig) -> LiveMonitor {
        LiveMonitor::new(&self.path, ChartState::with_max_points(config.max_points))
            .with_interval(config.interval())
    }
}

/// 处理 dash 命令：终端仪表盘
pub fn handle_dash(args: LiveArgs, config: DashConfig, sessions: &DashboardSessions) -> Result<()> {
    let lease = sessions.claim()?;
    let config = args.resolve(config);
    info!(path = %args.path.display(), interval_ms = config.interval_ms, "starting dashboard");

    let mut terminal = init_terminal()?;
    let mut app = App::new(args.monitor(&config), config.interval());

    let result = run(&mut terminal, &mut app);

    restore_terminal(&mut terminal)?;
    lease.release();

    info!(ticks = app.monitor.ticks(), cursor = app.monitor.cursor(), "dashboard closed");
    result
}

/// 处理 follow 命令：无界面，打印状态行
pub async fn handle_follow(
    args: LiveArgs,
    config: DashConfig,
    sessions: &DashboardSessions,
) -> Result<()> {
    let lease = sessions.claim()?;
    let config = args.resolve(config);

    let mut monitor = args.monitor(&config);
    let mut sink = ConsoleSink::new(std::io::stdout());
    let result = run_headless(&mut monitor, &mut sink, config.interval()).await;

    lease.release();
    result
}
