//! `tdash summary` 命令 - 打印 trace 文件的静态汇总

use anyhow::Result;
use clap::Args;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::format_summary;
use crate::summary::TraceSummary;

#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// JSONL trace 文件
    pub path: PathBuf,
    /// 输出 JSON 格式
    #[arg(long)]
    pub json: bool,
}

/// 处理 summary 命令
pub fn handle_summary(args: SummaryArgs) -> Result<()> {
    let summary = TraceSummary::from_jsonl(&args.path)?;
    debug!(path = %args.path.display(), total = summary.total, "summarized trace");
    let color = std::io::stdout().is_terminal();
    println!("{}", format_summary(&summary, args.json, color));
    Ok(())
}
