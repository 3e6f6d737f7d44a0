//! Scoped Timers
//!
//! This crate measures how long a region of code takes and reports it when
//! the region ends:
//! - [`ScopedTimer`] reports the elapsed time of its scope when dropped
//! - [`SectionedScopedTimer`] also splits the scope into named sections and
//!   reports each section's accumulated time followed by the total
//! - Durations are printed with a unit chosen by magnitude, see
//!   [`format_duration`]
//!
//! Reports are suppressed when output is disabled or the duration is below
//! the timer's threshold, so timers can stay in hot paths. Lines go to a
//! [`ReportSink`]; the default [`TracingSink`] emits `tracing` debug events
//! with the `timer` target.
//!
//! # Example
//!
//! ```rust
//! use scoped_timer::{time_scope, SectionedScopedTimer};
//! use std::time::Duration;
//!
//! fn load_game() {
//!     time_scope!("load_game", Duration::from_millis(5));
//!
//!     let mut timer = SectionedScopedTimer::new("parse_content");
//!     timer.enter_section("species");
//!     // ... parse species ...
//!     timer.enter_section("buildings");
//!     // ... parse buildings ...
//! } // Both timers report here
//! ```

mod config;
mod error;
mod format;
mod sectioned;
mod sink;
mod timer;

pub use config::{TimerConfig, DEFAULT_THRESHOLD};
pub use error::{TimerError, TimerResult};
pub use format::{format_duration, FormattedDuration, DURATION_FIELD_WIDTH};
pub use sectioned::SectionedScopedTimer;
pub use sink::{RecordingSink, ReportLevel, ReportSink, SinkRecord, TracingSink, LOG_TARGET};
pub use timer::{ScopedTimer, TimeUnit};

/// Re-export for convenience
pub use std::time::Duration;

/// Macro for easy scope timing.
///
/// Creates a timer that reports when the enclosing scope ends.
///
/// # Example
///
/// ```rust
/// use scoped_timer::time_scope;
/// use std::time::Duration;
///
/// fn do_work() {
///     time_scope!("work");
///     // ... work ...
/// } // Timer reports here
///
/// fn do_quick_work() {
///     time_scope!("quick_work", Duration::from_micros(200));
///     // ... work ...
/// }
/// ```
#[macro_export]
macro_rules! time_scope {
    ($name:expr) => {
        let _timer = $crate::ScopedTimer::new($name);
    };
    ($name:expr, $threshold:expr) => {
        let _timer = $crate::ScopedTimer::with_threshold($name, $threshold);
    };
}

/// Macro for creating a sectioned timer reporting through `tracing`.
///
/// ```rust
/// use scoped_timer::time_sections;
///
/// let mut timer = time_sections!("startup");
/// timer.enter_section("config");
/// ```
#[macro_export]
macro_rules! time_sections {
    ($name:expr) => {
        $crate::SectionedScopedTimer::new($name)
    };
    ($name:expr, $threshold:expr) => {
        $crate::SectionedScopedTimer::with_threshold($name, $threshold)
    };
}
