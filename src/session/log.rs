use chrono::{DateTime, Local};
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct ErrorLogEntry {
    pub timestamp: DateTime<Local>,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ErrorLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.context,
            self.message
        )
    }
}

/// Append-only record of the errors a session has hit.
#[derive(Debug, Default)]
pub struct ErrorLog {
    entries: Vec<ErrorLogEntry>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, context: impl Into<String>, message: impl Into<String>) {
        let entry = ErrorLogEntry {
            timestamp: Local::now(),
            context: context.into(),
            message: message.into(),
        };
        warn!("{}: {}", entry.context, entry.message);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ErrorLogEntry] {
        &self.entries
    }

    /// The `n` most recent entries, oldest first.
    pub fn recent(&self, n: usize) -> &[ErrorLogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
