//! 图表聚合状态 - 内存曲线 + 系统调用直方图

use std::collections::HashMap;

use crate::record::{Record, RecordKind};

/// 状态栏在没有内存采样时的提示
pub const WAITING_STATUS: &str = "waiting for data…";

/// 内存时间序列 (ts, current_kb)
#[derive(Debug, Clone, Default)]
pub struct TimeSeries {
    points: Vec<(f64, f64)>,
    /// 最多保留的点数，None 表示不限制
    capacity: Option<usize>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只保留最近 `capacity` 个点
    pub fn bounded(capacity: usize) -> Self {
        Self {
            points: Vec::new(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn push(&mut self, ts: f64, value: f64) {
        self.points.push((ts, value));
        self.trim();
    }

    /// 追加一批点，超出容量时只裁剪一次
    pub fn extend(&mut self, points: impl IntoIterator<Item = (f64, f64)>) {
        self.points.extend(points);
        self.trim();
    }

    fn trim(&mut self) {
        if let Some(cap) = self.capacity {
            if self.points.len() > cap {
                let excess = self.points.len() - cap;
                self.points.drain(..excess);
            }
        }
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// x 轴范围 (min_ts, max_ts)
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?.0;
        let last = self.points.last()?.0;
        Some((first.min(last), first.max(last)))
    }

    /// y 轴最大值
    pub fn y_max(&self) -> Option<f64> {
        self.points.iter().map(|(_, y)| *y).reduce(f64::max)
    }
}

/// 系统调用直方图：name -> 最近一次观测到的 count
///
/// 同名记录覆盖旧值而不是累加；首次出现的顺序保留用于展示。
#[derive(Debug, Clone, Default)]
pub struct SyscallHistogram {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl SyscallHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, count: u64) {
        match self.index.get(name) {
            Some(&i) => self.entries[i].1 = count,
            None => {
                self.index.insert(name.to_string(), self.entries.len());
                self.entries.push((name.to_string(), count));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    pub fn entries(&self) -> &[(String, u64)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

/// 仪表盘的全部聚合状态
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    pub memory: TimeSeries,
    pub syscalls: SyscallHistogram,
}

impl ChartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内存序列限制最大点数
    pub fn with_max_points(max_points: Option<usize>) -> Self {
        Self {
            memory: max_points.map(TimeSeries::bounded).unwrap_or_default(),
            syscalls: SyscallHistogram::new(),
        }
    }

    /// 把一批新记录合并进聚合状态
    pub fn apply(&mut self, records: &[Record]) {
        let mut samples = Vec::new();
        for record in records {
            match record.kind {
                RecordKind::Memory => {
                    if let (Some(ts), Some(kb)) = (record.ts, record.current_kb()) {
                        samples.push((ts, kb));
                    }
                }
                RecordKind::Syscall => {
                    if let Some((name, count)) = record.syscall_count() {
                        self.syscalls.record(name, count);
                    }
                }
                RecordKind::Bytecode | RecordKind::Other => {}
            }
        }
        self.memory.extend(samples);
    }

    /// 一行状态描述，elapsed_secs 为会话开始后经过的秒数
    pub fn status_line(&self, elapsed_secs: u64) -> String {
        match self.memory.last() {
            Some((_, kb)) => format!("⏱ {}s | heap {:.1} MB", elapsed_secs, kb / 1024.0),
            None => WAITING_STATUS.to_string(),
        }
    }

    pub fn reset(&mut self) {
        self.memory.clear();
        self.syscalls.clear();
    }
}
