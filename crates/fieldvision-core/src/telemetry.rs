//! Telemetry sink interface.
//!
//! The pipeline publishes named key/value pairs once per cycle, found or
//! not, so downstream consumers always see correctly-typed, correctly
//! sentineled values. The network transport itself is an external
//! collaborator; these sinks cover logging, file recording, and tests.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Number, Value};

/// Accepts one cycle's worth of named values. `end_cycle` marks the
/// cycle boundary; sinks that batch flush there.
pub trait TelemetrySink {
    fn put_bool(&mut self, key: &str, value: bool);
    fn put_number(&mut self, key: &str, value: f64);
    fn put_string(&mut self, key: &str, value: &str);
    fn end_cycle(&mut self);
}

/// Emits every value through `tracing` at debug level.
#[derive(Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn put_bool(&mut self, key: &str, value: bool) {
        tracing::debug!(key, value, "telemetry");
    }

    fn put_number(&mut self, key: &str, value: f64) {
        tracing::debug!(key, value, "telemetry");
    }

    fn put_string(&mut self, key: &str, value: &str) {
        tracing::debug!(key, value, "telemetry");
    }

    fn end_cycle(&mut self) {}
}

/// Records one JSON object per cycle to a file, for post-match review.
pub struct JsonlSink {
    writer: BufWriter<File>,
    record: Map<String, Value>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
            record: Map::new(),
        })
    }
}

impl TelemetrySink for JsonlSink {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.record.insert(key.to_owned(), Value::Bool(value));
    }

    fn put_number(&mut self, key: &str, value: f64) {
        let number = Number::from_f64(value).unwrap_or_else(|| Number::from(-1));
        self.record.insert(key.to_owned(), Value::Number(number));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.record.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    fn end_cycle(&mut self) {
        let record = Value::Object(std::mem::take(&mut self.record));
        if let Err(err) = writeln!(self.writer, "{record}").and_then(|_| self.writer.flush()) {
            tracing::warn!(%err, "telemetry record not written");
        }
    }
}

/// In-memory sink for tests: keeps every completed cycle record.
#[derive(Default)]
pub struct MemorySink {
    current: Map<String, Value>,
    pub cycles: Vec<Map<String, Value>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetrySink for MemorySink {
    fn put_bool(&mut self, key: &str, value: bool) {
        self.current.insert(key.to_owned(), Value::Bool(value));
    }

    fn put_number(&mut self, key: &str, value: f64) {
        let number = Number::from_f64(value).unwrap_or_else(|| Number::from(-1));
        self.current.insert(key.to_owned(), Value::Number(number));
    }

    fn put_string(&mut self, key: &str, value: &str) {
        self.current.insert(key.to_owned(), Value::String(value.to_owned()));
    }

    fn end_cycle(&mut self) {
        self.cycles.push(std::mem::take(&mut self.current));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn jsonl_sink_writes_one_record_per_cycle() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut sink = JsonlSink::create(file.path()).unwrap();

        sink.put_bool("FoundBall", true);
        sink.put_number("BallDistance0", 101.7);
        sink.end_cycle();
        sink.put_bool("FoundBall", false);
        sink.end_cycle();

        let mut text = String::new();
        File::open(file.path()).unwrap().read_to_string(&mut text).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["FoundBall"], Value::Bool(true));
        assert!((first["BallDistance0"].as_f64().unwrap() - 101.7).abs() < 1e-9);
        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["FoundBall"], Value::Bool(false));
        assert!(second.get("BallDistance0").is_none());
    }

    #[test]
    fn non_finite_numbers_degrade_to_sentinel() {
        let mut sink = MemorySink::new();
        sink.put_number("TapeDistance", f64::NAN);
        sink.end_cycle();
        assert_eq!(sink.cycles[0]["TapeDistance"], Value::Number(Number::from(-1)));
    }
}
