//! Trace 记录模型 - JSONL 日志中的单行事件

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// 记录类型（对应 JSONL 中的 `kind` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// 内存采样，payload: `{current_kb}`
    #[serde(rename = "MemoryEvent")]
    Memory,
    /// 系统调用计数，payload: `{name, count}`
    #[serde(rename = "SyscallEvent")]
    Syscall,
    /// 字节码操作（只计数，不解析 payload）
    #[serde(rename = "BytecodeEvent")]
    Bytecode,
    /// 其他未识别的类型
    #[serde(other)]
    Other,
}

/// 单行 JSONL 的解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Record(Record),
    /// 合法 JSON，但不是带 `kind` 的记录
    Foreign,
    /// 不是合法 JSON（可能还没写完）
    Invalid,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// 一条解析后的 trace 记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub kind: RecordKind,
    /// 非数字的 ts（例如字符串时间）按缺失处理
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub ts: Option<f64>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Record {
    /// 解析单行 JSONL，失败返回 None
    pub fn parse_line(line: &str) -> Option<Record> {
        serde_json::from_str(line.trim()).ok()
    }

    /// 按字节解析单行，区分"不是记录"和"不是 JSON"
    ///
    /// 非法 UTF-8 也算作 Invalid，和按行读取整个文件时的行为一致。
    pub fn classify(line: &[u8]) -> ParsedLine {
        let Ok(text) = std::str::from_utf8(line) else {
            return ParsedLine::Invalid;
        };
        if let Ok(record) = serde_json::from_str::<Record>(text) {
            return ParsedLine::Record(record);
        }
        if serde_json::from_str::<IgnoredAny>(text).is_ok() {
            return ParsedLine::Foreign;
        }
        ParsedLine::Invalid
    }

    /// 内存采样值（kB）
    pub fn current_kb(&self) -> Option<f64> {
        if self.kind != RecordKind::Memory {
            return None;
        }
        self.payload.get("current_kb").and_then(|v| v.as_f64())
    }

    /// 系统调用名称和计数
    pub fn syscall_count(&self) -> Option<(&str, u64)> {
        if self.kind != RecordKind::Syscall {
            return None;
        }
        let name = self.payload.get("name").and_then(|n| n.as_str())?;
        let count = self.payload.get("count").and_then(|c| {
            c.as_u64()
                .or_else(|| c.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        })?;
        Some((name, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_record() {
        let line = r#"{"kind":"MemoryEvent","ts":1,"payload":{"current_kb":2048}}"#;

        let record = Record::parse_line(line).unwrap();

        assert_eq!(record.kind, RecordKind::Memory);
        assert_eq!(record.ts, Some(1.0));
        assert_eq!(record.current_kb(), Some(2048.0));
        assert_eq!(record.syscall_count(), None);
    }

    #[test]
    fn test_parse_syscall_record() {
        let line = r#"{"kind":"SyscallEvent","ts":2,"payload":{"name":"read","count":3}}"#;

        let record = Record::parse_line(line).unwrap();

        assert_eq!(record.kind, RecordKind::Syscall);
        assert_eq!(record.syscall_count(), Some(("read", 3)));
    }

    #[test]
    fn test_unknown_kind_is_other() {
        let record = Record::parse_line(r#"{"kind":"GcEvent","ts":5}"#).unwrap();
        assert_eq!(record.kind, RecordKind::Other);
        assert_eq!(record.payload, serde_json::Value::Null);
    }

    #[test]
    fn test_bytecode_payload_is_opaque() {
        let record =
            Record::parse_line(r#"{"kind":"BytecodeEvent","payload":{"op":"LOAD_FAST"}}"#).unwrap();
        assert_eq!(record.kind, RecordKind::Bytecode);
        assert_eq!(record.ts, None);
    }

    #[test]
    fn test_rejects_non_records() {
        assert!(Record::parse_line(r#"{"kind":"MemoryEv"#).is_none());
        assert!(Record::parse_line(r#"{"ts":1}"#).is_none());
        assert!(Record::parse_line("[1,2,3]").is_none());
        assert!(Record::parse_line("").is_none());
    }

    #[test]
    fn test_non_numeric_ts_is_none() {
        let record = Record::parse_line(r#"{"kind":"BytecodeEvent","ts":"12:00:01"}"#).unwrap();
        assert_eq!(record.kind, RecordKind::Bytecode);
        assert_eq!(record.ts, None);
    }

    #[test]
    fn test_classify() {
        let line = br#"{"kind":"MemoryEvent","ts":1,"payload":{"current_kb":1}}"#;
        assert!(matches!(Record::classify(line), ParsedLine::Record(_)));
        assert_eq!(Record::classify(b"[1,2]\n"), ParsedLine::Foreign);
        assert_eq!(Record::classify(br#"{"kind":7}"#), ParsedLine::Foreign);
        assert_eq!(Record::classify(br#"{"kind":"Mem"#), ParsedLine::Invalid);
        assert_eq!(Record::classify(b"{\"kind\":\"\xff\"}\n"), ParsedLine::Invalid);
    }

    #[test]
    fn test_float_count_truncated() {
        let record = Record::parse_line(
            r#"{"kind":"SyscallEvent","ts":2,"payload":{"name":"write","count":4.0}}"#,
        )
        .unwrap();
        assert_eq!(record.syscall_count(), Some(("write", 4)));
    }

    #[test]
    fn test_missing_payload_fields() {
        let record =
            Record::parse_line(r#"{"kind":"SyscallEvent","payload":{"name":"read"}}"#).unwrap();
        assert_eq!(record.syscall_count(), None);

        let record = Record::parse_line(r#"{"kind":"MemoryEvent","ts":1}"#).unwrap();
        assert_eq!(record.current_kb(), None);
    }
}
