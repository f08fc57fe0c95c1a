//! Live 模式 - 定时 poll 日志并刷新聚合状态

use anyhow::Result;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::aggregate::{ChartState, SyscallHistogram, TimeSeries};
use crate::tailer::JsonlTailer;

/// 一次 tick 的结果
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// 本次 tick 的序号（从 0 开始）
    pub tick: u64,
    /// 新合并的记录数
    pub new_records: usize,
    /// 是否因文件截断而从头重建
    pub rewound: bool,
    pub status: String,
}

/// 交给渲染端的快照
#[derive(Debug, Clone, Copy)]
pub struct DashboardUpdate<'a> {
    pub path: &'a Path,
    /// 已经执行的 tick 数
    pub ticks: u64,
    pub cursor: u64,
    pub memory: &'a TimeSeries,
    pub syscalls: &'a SyscallHistogram,
    pub status: &'a str,
}

/// 渲染端：接收每次 poll 后的聚合状态
pub trait DashboardSink {
    fn publish(&mut self, update: &DashboardUpdate<'_>) -> Result<()>;
}

/// Tailer + 聚合状态 + tick 计数
#[derive(Debug)]
pub struct LiveMonitor {
    path: PathBuf,
    tailer: JsonlTailer,
    state: ChartState,
    interval: Duration,
    tick: u64,
    status: String,
}

impl LiveMonitor {
    pub fn new(path: impl Into<PathBuf>, state: ChartState) -> Self {
        let status = state.status_line(0);
        Self {
            path: path.into(),
            tailer: JsonlTailer::new(),
            state,
            interval: Duration::from_secs(1),
            tick: 0,
            status,
        }
    }

    /// poll 间隔，用于把 tick 换算成状态栏里的秒数
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// 第 `tick` 次 poll 时会话已经过的整秒数
    pub fn elapsed_secs(&self, tick: u64) -> u64 {
        let millis = self.interval.as_millis().saturating_mul(u128::from(tick)) / 1000;
        u64::try_from(millis).unwrap_or(u64::MAX)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    pub fn cursor(&self) -> u64 {
        self.tailer.position()
    }

    /// 下一次 tick 的序号
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// 执行一次 poll 并合并新记录
    ///
    /// 读取失败时聚合状态和游标都不变，tick 计数照常前进。
    pub fn tick(&mut self) -> Result<TickReport> {
        let tick = self.tick;
        self.tick += 1;

        let batch = self.tailer.poll(&self.path)?;
        if batch.rewound {
            info!(path = %self.path.display(), "trace log was truncated, rebuilding charts");
            self.state.reset();
        }
        self.state.apply(&batch.records);
        self.status = self.state.status_line(self.elapsed_secs(tick));

        if !batch.records.is_empty() {
            debug!(tick, records = batch.records.len(), cursor = self.cursor(), "merged new records");
        }

        Ok(TickReport {
            tick,
            new_records: batch.records.len(),
            rewound: batch.rewound,
            status: self.status.clone(),
        })
    }

    /// 手动重置：游标归零，聚合状态清空
    pub fn rewind(&mut self) {
        self.tailer.reset();
        self.state.reset();
        self.status = self.state.status_line(self.elapsed_secs(self.tick));
    }

    pub fn update(&self) -> DashboardUpdate<'_> {
        DashboardUpdate {
            path: &self.path,
            ticks: self.tick,
            cursor: self.cursor(),
            memory: &self.state.memory,
            syscalls: &self.state.syscalls,
            status: &self.status,
        }
    }

    /// tick 一次并发布到渲染端；读取错误只记录日志
    pub fn tick_and_publish(&mut self, sink: &mut dyn DashboardSink) -> Result<()> {
        if let Err(e) = self.tick() {
            warn!(path = %self.path.display(), "poll failed: {:#}", e);
        }
        sink.publish(&self.update())
    }
}

/// 控制台渲染端：每次状态变化打印一行
pub struct ConsoleSink<W: Write> {
    out: W,
    last: Option<String>,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DashboardSink for ConsoleSink<W> {
    fn publish(&mut self, update: &DashboardUpdate<'_>) -> Result<()> {
        let top = update
            .syscalls
            .entries()
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(name, count)| format!(" | top syscall {}={}", name, count))
            .unwrap_or_default();
        let line = format!("{}{}", update.status, top);

        // 内容没变化就不重复打印
        if self.last.as_deref() == Some(line.as_str()) {
            return Ok(());
        }
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.last = Some(line);
        Ok(())
    }
}

/// 无界面模式：按固定间隔 tick，直到 Ctrl-C
pub async fn run_headless(
    monitor: &mut LiveMonitor,
    sink: &mut dyn DashboardSink,
    interval: Duration,
) -> Result<()> {
    run_headless_until(monitor, sink, interval, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// 按固定间隔 tick，直到 `shutdown` 完成
///
/// 第一次 tick 立即执行。
pub async fn run_headless_until(
    monitor: &mut LiveMonitor,
    sink: &mut dyn DashboardSink,
    interval: Duration,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!(path = %monitor.path().display(), interval_ms = interval.as_millis() as u64, "following trace log");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                monitor.tick_and_publish(sink)?;
            }
            _ = &mut shutdown => {
                info!(ticks = monitor.ticks(), cursor = monitor.cursor(), "stopped following");
                return Ok(());
            }
        }
    }
}
