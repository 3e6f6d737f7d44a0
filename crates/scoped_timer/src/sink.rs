//! Destinations for timer report lines

use std::sync::{Arc, Mutex};

/// Target used for every event emitted by [`TracingSink`].
pub const LOG_TARGET: &str = "timer";

/// Something that accepts finished report lines.
///
/// Implementations must not panic: sinks are invoked from `Drop`.
pub trait ReportSink {
    /// Record a regular report line.
    fn debug(&self, line: &str);

    /// Record an internal inconsistency detected while reporting.
    fn error(&self, line: &str);
}

impl<S: ReportSink + ?Sized> ReportSink for &S {
    fn debug(&self, line: &str) {
        (**self).debug(line)
    }

    fn error(&self, line: &str) {
        (**self).error(line)
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Arc<S> {
    fn debug(&self, line: &str) {
        (**self).debug(line)
    }

    fn error(&self, line: &str) {
        (**self).error(line)
    }
}

/// Forwards report lines to `tracing` under the [`LOG_TARGET`] target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn debug(&self, line: &str) {
        tracing::debug!(target: LOG_TARGET, "{}", line);
    }

    fn error(&self, line: &str) {
        tracing::error!(target: LOG_TARGET, "{}", line);
    }
}

/// Severity of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportLevel {
    Debug,
    Error,
}

/// A line captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkRecord {
    pub level: ReportLevel,
    pub line: String,
}

/// In-memory sink that keeps every line it receives.
///
/// Clones share the same buffer, so a clone can be handed to a timer while
/// the first handle is kept for inspection.
///
/// ```rust
/// use scoped_timer::{RecordingSink, ScopedTimer, TimerConfig};
///
/// let sink = RecordingSink::new();
/// {
///     let _timer = ScopedTimer::with_sink("load", &TimerConfig::unfiltered(), sink.clone());
/// }
/// assert!(sink.lines()[0].starts_with("load time: "));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<SinkRecord>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured records, oldest first.
    pub fn records(&self) -> Vec<SinkRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Captured lines of every level, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.records().into_iter().map(|r| r.line).collect()
    }

    /// Captured lines of the given level.
    pub fn lines_at(&self, level: ReportLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .map(|r| r.line)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }

    fn push(&self, level: ReportLevel, line: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(SinkRecord {
                level,
                line: line.to_string(),
            });
        }
    }
}

impl ReportSink for RecordingSink {
    fn debug(&self, line: &str) {
        self.push(ReportLevel::Debug, line);
    }

    fn error(&self, line: &str) {
        self.push(ReportLevel::Error, line);
    }
}
