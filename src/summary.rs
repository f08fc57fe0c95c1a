//! 静态汇总 - 读取完整的 trace 文件并按类型计数

use anyhow::{bail, Context, Result};
use crossterm::style::{Color, Stylize};
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::record::{ParsedLine, Record, RecordKind};

const RULE_WIDTH: usize = 40;

/// 按记录类型的计数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    pub syscalls: usize,
    pub byte_ops: usize,
    pub mem_samples: usize,
    /// 未识别类型的记录数
    pub other: usize,
    pub total: usize,
    /// 合法 JSON 但不是记录的行，不计入 total
    pub skipped: usize,
}

impl TraceSummary {
    /// 读取整个 JSONL 文件
    ///
    /// 假设写入方已经结束：任何一行不是合法 JSON 都会直接报错。
    pub fn from_jsonl(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut summary = Self::default();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("failed to read {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            match Record::classify(line.as_bytes()) {
                ParsedLine::Record(record) => summary.count(&record),
                ParsedLine::Foreign => summary.skipped += 1,
                ParsedLine::Invalid => bail!("{}:{}: malformed record", path.display(), idx + 1),
            }
        }
        Ok(summary)
    }

    /// 从已解析的记录构建
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut summary = Self::default();
        for record in records {
            summary.count(record);
        }
        summary
    }

    fn count(&mut self, record: &Record) {
        self.total += 1;
        match record.kind {
            RecordKind::Syscall => self.syscalls += 1,
            RecordKind::Bytecode => self.byte_ops += 1,
            RecordKind::Memory => self.mem_samples += 1,
            RecordKind::Other => self.other += 1,
        }
    }

    /// 人类可读的汇总报告
    pub fn render(&self) -> String {
        self.render_with(false)
    }

    /// 带颜色的汇总报告（终端输出用）
    pub fn render_colored(&self) -> String {
        self.render_with(true)
    }

    fn render_with(&self, color: bool) -> String {
        let paint = |text: &str, c: Color| -> String {
            if color {
                text.with(c).to_string()
            } else {
                text.to_string()
            }
        };

        let title = " trace summary ";
        let side = RULE_WIDTH.saturating_sub(title.chars().count()) / 2;
        let mut out = format!(
            "{}{}{}\n",
            "─".repeat(side),
            paint(title, Color::Blue),
            "─".repeat(side)
        );
        out.push_str(&format!("{}: {}\n", paint("syscalls   ", Color::Green), self.syscalls));
        out.push_str(&format!("{}: {}\n", paint("byte-ops   ", Color::Cyan), self.byte_ops));
        out.push_str(&format!("{}: {}\n", paint("mem samples", Color::Magenta), self.mem_samples));
        out.push_str(&"─".repeat(side * 2 + title.chars().count()));
        out
    }
}
