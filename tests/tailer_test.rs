//! Tests for incremental tailing and chart aggregation

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use trace_dash::{ChartState, JsonlTailer, LiveMonitor, Record, TraceSummary};

const MEM: &str = "{\"kind\":\"MemoryEvent\",\"ts\":1,\"payload\":{\"current_kb\":2048}}\n";
const SYS_3: &str = "{\"kind\":\"SyscallEvent\",\"ts\":2,\"payload\":{\"name\":\"read\",\"count\":3}}\n";
const SYS_5: &str = "{\"kind\":\"SyscallEvent\",\"ts\":3,\"payload\":{\"name\":\"read\",\"count\":5}}\n";

fn append(path: &Path, data: &str) {
    let mut file = OpenOptions::new().create(true).append(true).open(path).unwrap();
    file.write_all(data.as_bytes()).unwrap();
}

fn sample_log() -> String {
    let mut log = String::new();
    for i in 0..20 {
        let line = match i % 3 {
            0 => format!(
                "{{\"kind\":\"MemoryEvent\",\"ts\":{},\"payload\":{{\"current_kb\":{}}}}}\n",
                i,
                1000 + i * 10
            ),
            1 => format!(
                "{{\"kind\":\"SyscallEvent\",\"ts\":{},\"payload\":{{\"name\":\"sys{}\",\"count\":{}}}}}\n",
                i,
                i % 4,
                i
            ),
            _ => format!("{{\"kind\":\"BytecodeEvent\",\"ts\":{}}}\n", i),
        };
        log.push_str(&line);
    }
    log
}

fn static_records(path: &Path) -> Vec<Record> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| Record::parse_line(line).unwrap())
        .collect()
}

#[test]
fn test_concrete_scenario_poll_then_overwrite() {
    // Given: the two-line scenario log
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, MEM);
    append(&path, SYS_3);

    let mut monitor = LiveMonitor::new(&path, ChartState::new());

    // When: polling once
    let report = monitor.tick().unwrap();

    // Then
    assert_eq!(monitor.state().memory.points(), &[(1.0, 2048.0)]);
    assert_eq!(monitor.state().syscalls.get("read"), Some(3));
    assert_eq!(report.status, format!("⏱ {}s | heap 2.0 MB", report.tick));

    // When: another syscall sample for the same name is appended
    append(&path, SYS_5);
    monitor.tick().unwrap();

    // Then: the count is overwritten, not summed
    assert_eq!(monitor.state().syscalls.get("read"), Some(5));
    assert_eq!(monitor.state().syscalls.len(), 1);
}

#[test]
fn test_tail_then_merge_matches_static_read() {
    // Given: a log written in uneven chunks, some splitting lines mid-way
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let log = sample_log();
    let cuts = [0, 7, 64, 65, 200, 333, 512, log.len() - 3, log.len()];

    let mut tailer = JsonlTailer::new();
    let mut polled = Vec::new();

    // When: appending chunk by chunk and polling in between
    fs::write(&path, "").unwrap();
    for pair in cuts.windows(2) {
        append(&path, &log[pair[0]..pair[1]]);
        let batch = tailer.poll(&path).unwrap();
        assert!(!batch.rewound);
        polled.extend(batch.records);
    }

    // Then: exactly the static read, same order, nothing duplicated
    assert_eq!(polled, static_records(&path));
    assert_eq!(tailer.position(), log.len() as u64);
    assert_eq!(
        TraceSummary::from_records(&polled),
        TraceSummary::from_jsonl(&path).unwrap()
    );
}

#[test]
fn test_at_most_once_across_polls() {
    // Given: a fully written log
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, &sample_log());

    let mut tailer = JsonlTailer::new();

    // When: polling several times with no new data
    let first = tailer.poll(&path).unwrap();
    let position = tailer.position();
    let second = tailer.poll(&path).unwrap();
    let third = tailer.poll(&path).unwrap();

    // Then: only the first poll returns records and the cursor stays put
    assert_eq!(first.records.len(), 20);
    assert!(second.records.is_empty());
    assert!(third.records.is_empty());
    assert_eq!(tailer.position(), position);
}

#[test]
fn test_partial_line_never_emitted() {
    // Given: a complete line followed by a half-written one
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, MEM);
    append(&path, &SYS_3[..20]);

    let mut tailer = JsonlTailer::new();

    // When
    let batch = tailer.poll(&path).unwrap();

    // Then: cursor stops at the start of the partial line
    assert_eq!(batch.records.len(), 1);
    assert_eq!(tailer.position(), MEM.len() as u64);

    // When: the writer finishes the line
    append(&path, &SYS_3[20..]);
    let batch = tailer.poll(&path).unwrap();

    // Then: it is emitted exactly once
    assert_eq!(batch.records.len(), 1);
    assert_eq!(batch.records[0].syscall_count(), Some(("read", 3)));
    assert_eq!(tailer.position(), (MEM.len() + SYS_3.len()) as u64);
}

#[test]
fn test_complete_json_without_newline_waits() {
    // Given: a line that parses but has no trailing newline yet
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, MEM.trim_end());

    let mut tailer = JsonlTailer::new();

    // Then: nothing consumed until the newline arrives
    assert!(tailer.poll(&path).unwrap().records.is_empty());
    assert_eq!(tailer.position(), 0);

    append(&path, "\n");
    assert_eq!(tailer.poll(&path).unwrap().records.len(), 1);
}

#[test]
fn test_malformed_line_blocks_until_rewritten() {
    // Given: a garbage complete line between two good ones
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, MEM);
    append(&path, "{oops\n");
    append(&path, SYS_3);

    let mut tailer = JsonlTailer::new();

    // When / Then: reading stops before the garbage line, on every poll
    assert_eq!(tailer.poll(&path).unwrap().records.len(), 1);
    assert!(tailer.poll(&path).unwrap().records.is_empty());
    assert_eq!(tailer.position(), MEM.len() as u64);
}

#[test]
fn test_truncated_file_rewinds() {
    // Given: a tailer that consumed a longer file
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, &sample_log());
    let mut tailer = JsonlTailer::new();
    tailer.poll(&path).unwrap();

    // When: the file is replaced by a shorter one
    fs::write(&path, SYS_5).unwrap();
    let batch = tailer.poll(&path).unwrap();

    // Then: the cursor restarts from 0 and the new content is read
    assert!(batch.rewound);
    assert_eq!(batch.records.len(), 1);
    assert_eq!(tailer.position(), SYS_5.len() as u64);
}

#[test]
fn test_cursor_bound_to_one_path() {
    // Given: a cursor derived from one file
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.jsonl");
    let second = dir.path().join("b.jsonl");
    append(&first, MEM);
    append(&first, SYS_3);
    append(&second, SYS_5);

    let mut tailer = JsonlTailer::new();
    tailer.poll(&first).unwrap();

    // When: polling a different file
    let batch = tailer.poll(&second).unwrap();

    // Then: the old cursor is not reused
    assert!(batch.rewound);
    assert_eq!(batch.records.len(), 1);
    assert_eq!(tailer.bound_path(), Some(second.as_path()));
}

#[test]
fn test_bounded_series_in_live_monitor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, &sample_log());

    let mut monitor = LiveMonitor::new(&path, ChartState::with_max_points(Some(3)));
    monitor.tick().unwrap();

    // memory samples are at ts 0,3,...,18; only the last three survive
    let xs: Vec<f64> = monitor.state().memory.points().iter().map(|(x, _)| *x).collect();
    assert_eq!(xs, vec![12.0, 15.0, 18.0]);
}

#[test]
fn test_string_timestamp_does_not_stall() {
    // Given: a bytecode line whose ts is a wall-clock string, then the scenario memory line
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let bytecode = "{\"kind\":\"BytecodeEvent\",\"ts\":\"12:00:01\"}\n";
    append(&path, bytecode);
    append(&path, MEM);

    let mut monitor = LiveMonitor::new(&path, ChartState::new());

    // When: polling several times
    let mut status = String::new();
    for _ in 0..5 {
        status = monitor.tick().unwrap().status;
    }

    // Then: both lines are consumed and the memory sample shows up
    assert_eq!(monitor.cursor(), (bytecode.len() + MEM.len()) as u64);
    assert_eq!(monitor.state().memory.points(), &[(1.0, 2048.0)]);
    assert_eq!(status, "⏱ 4s | heap 2.0 MB");
}

#[test]
fn test_json_without_kind_is_skipped() {
    // Given: complete JSON lines that are not records sit between records
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    append(&path, MEM);
    append(&path, "{\"note\":\"profiler restarted\"}\n");
    append(&path, "[1,2,3]\n");
    append(&path, SYS_3);

    // When
    let mut tailer = JsonlTailer::new();
    let batch = tailer.poll(&path).unwrap();

    // Then: the tailer moves past them, and static mode agrees on the records
    assert_eq!(batch.records.len(), 2);
    assert_eq!(tailer.position(), fs::metadata(&path).unwrap().len());
    let summary = TraceSummary::from_jsonl(&path).unwrap();
    let tailed = TraceSummary::from_records(&batch.records);
    assert_eq!(summary.total, tailed.total);
    assert_eq!(summary.mem_samples, tailed.mem_samples);
    assert_eq!(summary.syscalls, tailed.syscalls);
    assert_eq!(summary.skipped, 2);
}
