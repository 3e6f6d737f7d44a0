//! Scope timer that reports its elapsed time when dropped

use crate::config::TimerConfig;
use crate::format::FormattedDuration;
use crate::sink::{ReportSink, TracingSink};
use std::time::{Duration, Instant};

/// Unit for reading a timer as a floating point number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    #[default]
    Seconds,
}

impl TimeUnit {
    /// Express `duration` in this unit.
    #[inline]
    pub fn convert(self, duration: Duration) -> f64 {
        let secs = duration.as_secs_f64();
        match self {
            TimeUnit::Nanoseconds => secs * 1_000_000_000.0,
            TimeUnit::Microseconds => secs * 1_000_000.0,
            TimeUnit::Milliseconds => secs * 1000.0,
            TimeUnit::Seconds => secs,
        }
    }
}

/// A timer that measures elapsed time from creation to drop.
///
/// On drop the timer writes `"<name> time: <duration>"` to its sink, unless
/// output is disabled or the elapsed time is below the threshold.
///
/// # Example
///
/// ```rust
/// use scoped_timer::ScopedTimer;
/// use std::time::Duration;
///
/// fn load_universe() {
///     let _timer = ScopedTimer::with_threshold("load_universe", Duration::from_millis(10));
///     // ... loading code ...
///     // Timer reports on drop if loading took 10ms or more
/// }
/// ```
pub struct ScopedTimer<S: ReportSink = TracingSink> {
    name: String,
    start: Instant,
    config: TimerConfig,
    sink: S,
}

impl ScopedTimer<TracingSink> {
    /// Create a timer with the default configuration.
    ///
    /// The timer starts immediately upon creation.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &TimerConfig::default())
    }

    /// Create an enabled timer that ignores durations below `threshold`.
    #[inline]
    pub fn with_threshold(name: impl Into<String>, threshold: Duration) -> Self {
        Self::with_config(name, &TimerConfig::new(true, threshold))
    }

    /// Create a timer with an explicit output switch and threshold.
    #[inline]
    pub fn with_options(name: impl Into<String>, output_enabled: bool, threshold: Duration) -> Self {
        Self::with_config(name, &TimerConfig::new(output_enabled, threshold))
    }

    /// Create a timer from a [`TimerConfig`].
    #[inline]
    pub fn with_config(name: impl Into<String>, config: &TimerConfig) -> Self {
        Self::with_sink(name, config, TracingSink)
    }
}

impl<S: ReportSink> ScopedTimer<S> {
    /// Create a timer that reports to `sink`.
    #[inline]
    pub fn with_sink(name: impl Into<String>, config: &TimerConfig, sink: S) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            config: *config,
            sink,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn output_enabled(&self) -> bool {
        self.config.output_enabled
    }

    #[inline]
    pub fn threshold(&self) -> Duration {
        self.config.threshold
    }

    #[inline]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get the start instant.
    #[inline]
    pub fn start(&self) -> Instant {
        self.start
    }

    /// Restart the measurement from now.
    #[inline]
    pub fn restart(&mut self) {
        self.start = Instant::now();
    }

    /// Get the elapsed duration.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Get the elapsed time in seconds.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.duration_in(TimeUnit::Seconds)
    }

    /// Get the elapsed time in `unit`.
    #[inline]
    pub fn duration_in(&self, unit: TimeUnit) -> f64 {
        unit.convert(self.elapsed())
    }

    /// Get the elapsed time formatted like the drop report.
    ///
    /// Does not affect the report written on drop.
    pub fn duration_string(&self) -> String {
        FormattedDuration(self.elapsed()).to_string()
    }

    /// Stop the timer and return the elapsed time without reporting.
    pub fn stop(mut self) -> Duration {
        self.config.output_enabled = false;
        self.elapsed()
    }

    /// Report `elapsed` as the final measurement and silence the timer.
    pub(crate) fn conclude(&mut self, elapsed: Duration) {
        let report = self.config.should_report(elapsed);
        self.config.output_enabled = false;
        if report {
            self.sink
                .debug(&format!("{} time: {}", self.name, FormattedDuration(elapsed)));
        }
    }

    pub(crate) fn silence(&mut self) {
        self.config.output_enabled = false;
    }
}

impl<S: ReportSink> Drop for ScopedTimer<S> {
    fn drop(&mut self) {
        if !self.config.output_enabled {
            return;
        }
        let elapsed = self.elapsed();
        self.conclude(elapsed);
    }
}

impl<S: ReportSink> std::fmt::Debug for ScopedTimer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedTimer")
            .field("name", &self.name)
            .field("start", &self.start)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
