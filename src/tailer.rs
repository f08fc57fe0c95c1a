//! JSONL 增量读取 - 记住字节偏移，只消费新追加的完整行

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::record::{ParsedLine, Record};

/// 一次 poll 的结果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TailBatch {
    /// 新解析的记录（按文件顺序）
    pub records: Vec<Record>,
    /// 游标是否被重置到文件开头（文件被截断或路径变化）
    pub rewound: bool,
}

/// JSONL 增量读取器
///
/// 游标只绑定一个文件路径。写入方未写完的行（没有换行符，或者还不是合法 JSON）
/// 不会被消费，下一次 poll 会从这一行的开头重新读取。
#[derive(Debug, Default)]
pub struct JsonlTailer {
    bound_path: Option<PathBuf>,
    position: u64,
}

impl JsonlTailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前游标（已消费的字节数）
    pub fn position(&self) -> u64 {
        self.position
    }

    /// 游标绑定的文件
    pub fn bound_path(&self) -> Option<&Path> {
        self.bound_path.as_deref()
    }

    /// 重置游标，下一次 poll 从头读取
    pub fn reset(&mut self) {
        self.position = 0;
        self.bound_path = None;
    }

    /// 读取游标之后新增的完整记录
    ///
    /// 任何 I/O 错误都会原样返回，此时游标保持不变。
    pub fn poll(&mut self, path: &Path) -> Result<TailBatch> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let file_len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();

        let mut start = self.position;
        let mut rewound = false;
        if self.bound_path.as_deref() != Some(path) {
            rewound = self.bound_path.is_some();
            start = 0;
        } else if file_len < start {
            debug!(path = %path.display(), cursor = start, file_len, "log shrank, rewinding cursor");
            rewound = true;
            start = 0;
        }

        // 文件没有新内容
        if file_len == start {
            self.commit(path, start);
            return Ok(TailBatch { records: Vec::new(), rewound });
        }

        let mut reader = BufReader::new(file);
        reader
            .seek(SeekFrom::Start(start))
            .with_context(|| format!("failed to seek {} to {}", path.display(), start))?;

        let (records, consumed) = read_complete_records(&mut reader)
            .with_context(|| format!("failed to read {}", path.display()))?;

        self.commit(path, start + consumed);
        Ok(TailBatch { records, rewound })
    }

    fn commit(&mut self, path: &Path, position: u64) {
        if self.bound_path.as_deref() != Some(path) {
            self.bound_path = Some(path.to_path_buf());
        }
        self.position = position;
    }
}

/// 从 reader 当前位置读到第一条不完整/无法解析的行为止
///
/// 返回解析出的记录以及消费的字节数。
fn read_complete_records<R: BufRead>(reader: &mut R) -> std::io::Result<(Vec<Record>, u64)> {
    let mut records = Vec::new();
    let mut consumed = 0u64;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        // 没有换行符：写入方还没写完这一行
        if buf.last() != Some(&b'\n') {
            break;
        }

        if buf.iter().all(u8::is_ascii_whitespace) {
            consumed += n as u64;
            continue;
        }

        match Record::classify(&buf) {
            ParsedLine::Record(record) => {
                records.push(record);
                consumed += n as u64;
            }
            // 完整的 JSON 行不会再变化，跳过而不是卡住
            ParsedLine::Foreign => {
                debug!(offset = consumed, "skipping JSON line without a record kind");
                consumed += n as u64;
            }
            ParsedLine::Invalid => {
                debug!(offset = consumed, "unparsable line, retrying next poll");
                break;
            }
        }
    }

    Ok((records, consumed))
}
