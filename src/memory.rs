use std::io;
use std::sync::{Mutex, PoisonError};

use crate::record::LogRecord;
use crate::sink::LogStream;

/// A stream that keeps every chunk written to it.
///
/// Useful for tests and for measuring the overhead of the logger itself
/// without any external I/O.
#[derive(Debug, Default)]
pub struct MemoryStream {
    writes: Mutex<Vec<String>>,
}

impl MemoryStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every chunk received so far, in write order.
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parse the received lines back into records, skipping anything that
    /// is not a record.
    pub fn records(&self) -> Vec<LogRecord> {
        self.writes()
            .iter()
            .filter_map(|line| serde_json::from_str(line.trim_end_matches('\n')).ok())
            .collect()
    }

    pub fn clear(&self) {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl LogStream for MemoryStream {
    fn write(&self, chunk: &str) -> io::Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(chunk.to_string());
        Ok(())
    }
}
