//! 配置加载
//!
//! 优先级（从低到高）：
//! 1. 默认值（1000 ms 刷新，内存曲线不限点数）
//! 2. `~/.config/trace-dash/config.json`
//! 3. 环境变量 `TDASH_INTERVAL_MS` / `TDASH_MAX_POINTS`
//! 4. 命令行参数

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_INTERVAL_MS: u64 = 1_000;
const MIN_INTERVAL_MS: u64 = 50;

/// 配置目录 `~/.config/trace-dash`
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("trace-dash")
}

/// Live 模式配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    /// poll 间隔（毫秒）
    pub interval_ms: u64,
    /// 内存曲线最多保留的点数
    pub max_points: Option<usize>,
    /// tracing 过滤规则，RUST_LOG 优先
    pub log_filter: Option<String>,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            max_points: None,
            log_filter: None,
        }
    }
}

impl DashConfig {
    /// 默认位置的配置 + 环境变量
    pub fn load() -> Result<Self> {
        let mut config = Self::from_file(&config_dir().join("config.json"))?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 读取配置文件，文件不存在时返回默认值
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// 用环境变量覆盖；无法解析的值忽略
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ms) = lookup("TDASH_INTERVAL_MS").and_then(|v| v.trim().parse().ok()) {
            self.interval_ms = ms;
        }
        if let Some(points) = lookup("TDASH_MAX_POINTS").and_then(|v| v.trim().parse().ok()) {
            self.max_points = Some(points);
        }
    }

    /// 命令行参数覆盖
    pub fn with_overrides(mut self, interval_ms: Option<u64>, max_points: Option<usize>) -> Self {
        if let Some(ms) = interval_ms {
            self.interval_ms = ms;
        }
        if max_points.is_some() {
            self.max_points = max_points;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }
}
