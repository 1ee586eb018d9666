use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_ERROR_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Graphics context failures such as a lost context.
    #[serde(rename = "webgl")]
    WebGl,
    /// The experiment kept missing its frame budget.
    Performance,
    /// The device lacks something the experiment needs.
    Compatibility,
    Runtime,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::WebGl => "webgl",
            ErrorKind::Performance => "performance",
            ErrorKind::Compatibility => "compatibility",
            ErrorKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the rendering layer. `recoverable` is decided by the
/// reporter; the playground only records it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct PlaygroundError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub recoverable: bool,
}

impl PlaygroundError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, recoverable: bool) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            recoverable,
        }
    }

    pub fn webgl(message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ErrorKind::WebGl, message, recoverable)
    }

    pub fn performance(message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ErrorKind::Performance, message, recoverable)
    }

    pub fn compatibility(message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ErrorKind::Compatibility, message, recoverable)
    }

    pub fn runtime(message: impl Into<String>, recoverable: bool) -> Self {
        Self::new(ErrorKind::Runtime, message, recoverable)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Fixed-capacity FIFO of reported errors. Once full, every push drops the
/// oldest entry, so the log always holds the most recent `capacity` reports.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    entries: VecDeque<PlaygroundError>,
    capacity: usize,
}

impl ErrorLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an error, returning the entry evicted to make room, if any.
    pub fn push(&mut self, error: PlaygroundError) -> Option<PlaygroundError> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(error);
        evicted
    }

    /// Copy of the log, oldest first.
    pub fn snapshot(&self) -> Vec<PlaygroundError> {
        self.entries.iter().cloned().collect()
    }

    pub fn by_kind(&self, kind: ErrorKind) -> Vec<PlaygroundError> {
        self.entries
            .iter()
            .filter(|error| error.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_CAPACITY)
    }
}
