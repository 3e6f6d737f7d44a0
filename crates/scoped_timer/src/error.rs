//! Error types for the timer crate.

use thiserror::Error;

/// Errors produced while configuring or reporting timers.
///
/// Timers never hand these to the caller while timing: reporting problems are
/// written to the timer's sink instead.
#[derive(Debug, Error)]
pub enum TimerError {
    /// A section listed in the report order has no accumulated entry
    #[error("Missing section {section:?} in section table of timer {timer:?}")]
    MissingSection { timer: String, section: String },

    /// Timer configuration could not be parsed
    #[error("Invalid timer configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for timer operations.
pub type TimerResult<T> = Result<T, TimerError>;
