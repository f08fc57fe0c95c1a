//! Trace Dash - JSONL trace 日志的静态汇总与实时仪表盘

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod live;
pub mod record;
pub mod session;
pub mod summary;
pub mod tailer;
pub mod tui;

pub use aggregate::{ChartState, SyscallHistogram, TimeSeries, WAITING_STATUS};
pub use config::DashConfig;
pub use live::{
    run_headless, run_headless_until, ConsoleSink, DashboardSink, DashboardUpdate, LiveMonitor,
    TickReport,
};
pub use record::{ParsedLine, Record, RecordKind};
pub use session::{DashboardSessions, SessionLease};
pub use summary::TraceSummary;
pub use tailer::{JsonlTailer, TailBatch};
