//! 仪表盘视图 - TUI 端的 `DashboardSink`，保存最近一次发布的快照

use anyhow::Result;

use crate::aggregate::{SyscallHistogram, TimeSeries, WAITING_STATUS};
use crate::live::{DashboardSink, DashboardUpdate};

/// 渲染用的快照，只通过 `publish` 更新
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// 文件名（不含目录）
    pub file: String,
    pub cursor: u64,
    pub ticks: u64,
    pub memory: TimeSeries,
    pub syscalls: SyscallHistogram,
    pub status: String,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            file: String::new(),
            cursor: 0,
            ticks: 0,
            memory: TimeSeries::new(),
            syscalls: SyscallHistogram::new(),
            status: WAITING_STATUS.to_string(),
        }
    }
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DashboardSink for DashboardView {
    fn publish(&mut self, update: &DashboardUpdate<'_>) -> Result<()> {
        self.file = update
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| update.path.display().to_string());
        self.cursor = update.cursor;
        self.ticks = update.ticks;
        // clone_from 复用已有的分配
        self.memory.clone_from(update.memory);
        self.syscalls.clone_from(update.syscalls);
        self.status.clear();
        self.status.push_str(update.status);
        Ok(())
    }
}
