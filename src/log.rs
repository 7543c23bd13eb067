use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

const MAX_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

struct LogBuffer {
    entries: Vec<LogEntry>,
    dirty: bool,
    file: Option<std::fs::File>,
}

/// Shared trace sink: a bounded FIFO ring for the log screen, mirrored to an
/// append-only file. Cloned into every component that logs; safe to write
/// from worker threads without touching application state.
#[derive(Clone)]
pub struct LogSink {
    buffer: Arc<Mutex<LogBuffer>>,
}

impl LogSink {
    pub fn new(path: &Path) -> Self {
        let file = OpenOptions::new().create(true).append(true).open(path).ok();
        Self {
            buffer: Arc::new(Mutex::new(LogBuffer {
                entries: Vec::new(),
                dirty: false,
                file,
            })),
        }
    }

    /// In-memory only, no file mirror.
    #[allow(dead_code)]
    pub fn unmirrored() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(LogBuffer {
                entries: Vec::new(),
                dirty: false,
                file: None,
            })),
        }
    }

    pub fn push(&self, level: LogLevel, msg: String) {
        let now = Utc::now();
        let mut buf = self.buffer.lock().unwrap();

        // File first (never truncated), then the bounded ring.
        if let Some(ref mut file) = buf.file {
            let _ = writeln!(
                file,
                "[{}] {} {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                level.label(),
                msg
            );
        }

        buf.entries.push(LogEntry {
            timestamp: now,
            level,
            message: msg,
        });
        if buf.entries.len() > MAX_ENTRIES {
            let excess = buf.entries.len() - MAX_ENTRIES;
            buf.entries.drain(..excess);
        }
        buf.dirty = true;
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.push(LogLevel::Info, msg.into());
    }

    pub fn warn(&self, msg: impl Into<String>) {
        self.push(LogLevel::Warn, msg.into());
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.push(LogLevel::Error, msg.into());
    }

    pub fn take_dirty(&self) -> bool {
        let mut buf = self.buffer.lock().unwrap();
        let was = buf.dirty;
        buf.dirty = false;
        was
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer.lock().unwrap().entries.clone()
    }

    pub fn clear(&self) {
        let mut buf = self.buffer.lock().unwrap();
        buf.entries.clear();
        buf.dirty = true;
    }

    pub fn entry_count(&self) -> usize {
        self.buffer.lock().unwrap().entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_evicts_oldest() {
        let sink = LogSink::unmirrored();
        for i in 0..MAX_ENTRIES + 10 {
            sink.info(format!("line {}", i));
        }
        let entries = sink.entries();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].message, "line 10");
        assert_eq!(
            entries.last().unwrap().message,
            format!("line {}", MAX_ENTRIES + 9)
        );
    }

    #[test]
    fn test_dirty_flag_is_consumed() {
        let sink = LogSink::unmirrored();
        assert!(!sink.take_dirty());
        sink.info("hello");
        assert!(sink.take_dirty());
        assert!(!sink.take_dirty());
    }

    #[test]
    fn test_clear() {
        let sink = LogSink::unmirrored();
        sink.info("a");
        sink.error("b");
        assert_eq!(sink.entry_count(), 2);
        sink.clear();
        assert_eq!(sink.entry_count(), 0);
        assert!(sink.take_dirty());
    }

    #[test]
    fn test_file_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cvgen.log");
        let sink = LogSink::new(&path);
        sink.info("mirrored line");
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("INFO mirrored line"));
    }
}
