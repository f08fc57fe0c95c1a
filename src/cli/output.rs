//! Output formatting for CLI commands

use serde::Serialize;

use crate::summary::TraceSummary;

/// Format output as JSON based on --json flag, or the given text rendering
pub fn format_output<T: Serialize>(data: &T, json: bool, text: impl FnOnce(&T) -> String) -> String {
    if json {
        serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
    } else {
        text(data)
    }
}

/// 汇总报告：`--json` 时输出结构体，否则输出文本报告（终端下带颜色）
pub fn format_summary(summary: &TraceSummary, json: bool, color: bool) -> String {
    if color {
        format_output(summary, json, TraceSummary::render_colored)
    } else {
        format_output(summary, json, TraceSummary::render)
    }
}
