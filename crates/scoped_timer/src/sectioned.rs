//! Scope timer subdivided into named, re-enterable sections
//!
//! A [`SectionedScopedTimer`] measures a whole scope like [`ScopedTimer`]
//! and additionally attributes the elapsed time to consecutive sections.
//! Entering a section stops the one that was running; re-entering a name
//! adds to the time it already accumulated.
//!
//! # Example
//!
//! ```rust
//! use scoped_timer::{RecordingSink, SectionedScopedTimer, TimerConfig};
//!
//! let sink = RecordingSink::new();
//! {
//!     let mut timer =
//!         SectionedScopedTimer::with_sink("turn", &TimerConfig::unfiltered(), sink.clone());
//!     timer.enter_section("orders");
//!     // ... process orders ...
//!     timer.enter_section("combat");
//!     // ... resolve combat ...
//!     timer.enter_section("orders");
//!     // ... more orders ...
//! }
//! // One line per section ("", "orders", "combat") followed by the total
//! assert_eq!(sink.len(), 4);
//! assert!(sink.lines()[1].starts_with("turn - orders time: "));
//! ```

use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::format::FormattedDuration;
use crate::sink::{ReportSink, TracingSink};
use crate::timer::{ScopedTimer, TimeUnit};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Identity of a section.
///
/// The empty name maps to [`Section::Default`], which collects the time
/// spent outside any named section.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Section {
    Default,
    Named(String),
}

impl Section {
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() {
            Section::Default
        } else {
            Section::Named(name.to_string())
        }
    }

    /// The name used in reports; empty for the default section.
    pub fn label(&self) -> &str {
        match self {
            Section::Default => "",
            Section::Named(name) => name,
        }
    }
}

/// Accumulated time per section plus the section currently running.
#[derive(Debug)]
struct SectionTable {
    durations: HashMap<Section, Duration>,
    /// Sections in the order they were first entered.
    order: Vec<Section>,
    current: Section,
    section_start: Instant,
}

impl SectionTable {
    /// Seed the table with the default section, crediting it with the time
    /// that passed before the first section was entered.
    fn new(now: Instant, time_from_start: Duration) -> Self {
        let mut durations = HashMap::new();
        durations.insert(Section::Default, time_from_start);
        Self {
            durations,
            order: vec![Section::Default],
            current: Section::Default,
            section_start: now,
        }
    }

    /// Credit the running section up to `now` and switch to `name`.
    fn accumulate(&mut self, now: Instant, name: &str) {
        if self.current.label() == name {
            return;
        }

        let ran = now.saturating_duration_since(self.section_start);
        if let Some(total) = self.durations.get_mut(&self.current) {
            *total += ran;
        }
        self.section_start = now;

        let section = Section::from_name(name);
        if !self.durations.contains_key(&section) {
            self.durations.insert(section.clone(), Duration::ZERO);
            self.order.push(section.clone());
        }
        self.current = section;
    }

    fn only_default(&self) -> bool {
        self.order.len() == 1 && self.order[0] == Section::Default
    }

    /// Accumulated time of `section`, counting the running section up to `now`.
    fn duration_at(&self, section: &Section, now: Instant) -> Option<Duration> {
        let accumulated = *self.durations.get(section)?;
        if *section == self.current {
            Some(accumulated + now.saturating_duration_since(self.section_start))
        } else {
            Some(accumulated)
        }
    }
}

/// Write one line per section followed by the total.
///
/// Section names are padded to the longest one so the durations line up,
/// and the total line is padded to the same column.
fn report_sections<S: ReportSink>(timer: &ScopedTimer<S>, table: &SectionTable, total: Duration) {
    let name = timer.name();
    let sink = timer.sink();
    let width = table
        .order
        .iter()
        .map(|s| s.label().chars().count())
        .max()
        .unwrap_or(0);

    for section in &table.order {
        let Some(&accumulated) = table.durations.get(section) else {
            let err = TimerError::MissingSection {
                timer: name.to_string(),
                section: section.label().to_string(),
            };
            sink.error(&err.to_string());
            continue;
        };

        if accumulated < timer.threshold() {
            continue;
        }

        sink.debug(&format!(
            "{} - {:<width$} time: {}",
            name,
            section.label(),
            FormattedDuration(accumulated),
            width = width
        ));
    }

    // " - " plus " time: " is ten columns
    sink.debug(&format!(
        "{}{:>pad$}{}",
        name,
        " time: ",
        FormattedDuration(total),
        pad = width + 10
    ));
}

/// A [`ScopedTimer`] that can split its scope into named sections.
///
/// The section table is only allocated on the first
/// [`enter_section`](Self::enter_section), so a timer that never uses
/// sections costs the same as a plain [`ScopedTimer`] and reports the same
/// single line.
pub struct SectionedScopedTimer<S: ReportSink = TracingSink> {
    timer: ScopedTimer<S>,
    sections: Option<Box<SectionTable>>,
}

impl SectionedScopedTimer<TracingSink> {
    /// Create a sectioned timer with the default configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_timer(ScopedTimer::new(name))
    }

    /// Create an enabled sectioned timer that ignores durations below `threshold`.
    pub fn with_threshold(name: impl Into<String>, threshold: Duration) -> Self {
        Self::from_timer(ScopedTimer::with_threshold(name, threshold))
    }

    /// Create a sectioned timer with explicit output switch and threshold.
    pub fn with_options(name: impl Into<String>, output_enabled: bool, threshold: Duration) -> Self {
        Self::from_timer(ScopedTimer::with_options(name, output_enabled, threshold))
    }

    /// Create a sectioned timer from a [`TimerConfig`].
    pub fn with_config(name: impl Into<String>, config: &TimerConfig) -> Self {
        Self::from_timer(ScopedTimer::with_config(name, config))
    }
}

impl<S: ReportSink> SectionedScopedTimer<S> {
    /// Create a sectioned timer that reports to `sink`.
    pub fn with_sink(name: impl Into<String>, config: &TimerConfig, sink: S) -> Self {
        Self::from_timer(ScopedTimer::with_sink(name, config, sink))
    }

    fn from_timer(timer: ScopedTimer<S>) -> Self {
        Self {
            timer,
            sections: None,
        }
    }

    /// Stop the running section and start accumulating into `name`.
    ///
    /// Entering the section that is already running does nothing. The empty
    /// name refers to the default section.
    pub fn enter_section(&mut self, name: &str) {
        let now = Instant::now();
        let start = self.timer.start();
        self.sections
            .get_or_insert_with(|| Box::new(SectionTable::new(now, now.saturating_duration_since(start))))
            .accumulate(now, name);
    }

    /// Names of all sections entered so far, in first-entered order.
    ///
    /// Empty until the first section is entered; afterwards the default
    /// section `""` comes first.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections
            .as_ref()
            .map(|table| table.order.iter().map(Section::label).collect())
            .unwrap_or_default()
    }

    /// The section currently accumulating time, if sections are in use.
    pub fn current_section(&self) -> Option<&str> {
        self.sections.as_ref().map(|table| table.current.label())
    }

    /// Time accumulated by `name` so far, including the running interval.
    pub fn section_duration(&self, name: &str) -> Option<Duration> {
        let table = self.sections.as_ref()?;
        table.duration_at(&Section::from_name(name), Instant::now())
    }

    /// Time accumulated by every section so far, in first-entered order.
    pub fn section_durations(&self) -> Vec<(String, Duration)> {
        let Some(table) = self.sections.as_ref() else {
            return Vec::new();
        };
        let now = Instant::now();
        table
            .order
            .iter()
            .filter_map(|section| {
                table
                    .duration_at(section, now)
                    .map(|d| (section.label().to_string(), d))
            })
            .collect()
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.timer.name()
    }

    #[inline]
    pub fn output_enabled(&self) -> bool {
        self.timer.output_enabled()
    }

    #[inline]
    pub fn threshold(&self) -> Duration {
        self.timer.threshold()
    }

    #[inline]
    pub fn sink(&self) -> &S {
        self.timer.sink()
    }

    /// Restart the measurement from now.
    ///
    /// Sections entered before the restart are discarded, so the next
    /// [`enter_section`](Self::enter_section) starts a fresh table.
    #[inline]
    pub fn restart(&mut self) {
        self.timer.restart();
        self.sections = None;
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.timer.duration()
    }

    #[inline]
    pub fn duration_in(&self, unit: TimeUnit) -> f64 {
        self.timer.duration_in(unit)
    }

    pub fn duration_string(&self) -> String {
        self.timer.duration_string()
    }

    /// Stop the timer and return the total elapsed time without reporting.
    pub fn stop(mut self) -> Duration {
        self.timer.silence();
        self.timer.elapsed()
    }
}

impl<S: ReportSink> Drop for SectionedScopedTimer<S> {
    fn drop(&mut self) {
        if !self.timer.output_enabled() {
            return;
        }

        let now = Instant::now();
        let total = now.saturating_duration_since(self.timer.start());

        let table = match self.sections.as_deref_mut() {
            Some(table) if total >= self.timer.threshold() => table,
            _ => {
                self.timer.conclude(total);
                return;
            }
        };

        // Stop the final section at the same instant the total was taken.
        table.accumulate(now, "");

        if table.only_default() {
            self.timer.conclude(total);
            return;
        }

        report_sections(&self.timer, table, total);
        self.timer.silence();
    }
}

impl<S: ReportSink> std::fmt::Debug for SectionedScopedTimer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionedScopedTimer")
            .field("timer", &self.timer)
            .field("sections", &self.sections)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{RecordingSink, ReportLevel};
    use std::thread::sleep;

    const MS: Duration = Duration::from_millis(1);

    fn recording(name: &str, config: TimerConfig, sink: &RecordingSink) -> SectionedScopedTimer<RecordingSink> {
        SectionedScopedTimer::with_sink(name, &config, sink.clone())
    }

    #[test]
    fn test_section_from_name() {
        assert_eq!(Section::from_name(""), Section::Default);
        assert_eq!(Section::from_name("load"), Section::Named("load".to_string()));
        assert_eq!(Section::Named("x".to_string()).label(), "x");
        assert_eq!(Section::Default.label(), "");
    }

    #[test]
    fn test_table_seeds_default_with_time_from_start() {
        let t0 = Instant::now();
        let table = SectionTable::new(t0, 3 * MS);
        assert_eq!(table.order, vec![Section::Default]);
        assert_eq!(table.current, Section::Default);
        assert_eq!(table.durations[&Section::Default], 3 * MS);
        assert!(table.only_default());
    }

    #[test]
    fn test_table_reentry_accumulates_into_one_entry() {
        let t0 = Instant::now();
        let mut table = SectionTable::new(t0, Duration::ZERO);
        table.accumulate(t0 + MS, "A");
        table.accumulate(t0 + 4 * MS, "B");
        table.accumulate(t0 + 6 * MS, "A");
        table.accumulate(t0 + 10 * MS, "");

        let a = Section::from_name("A");
        let b = Section::from_name("B");
        assert_eq!(table.order, vec![Section::Default, a.clone(), b.clone()]);
        assert_eq!(table.durations[&Section::Default], MS);
        assert_eq!(table.durations[&a], 3 * MS + 4 * MS);
        assert_eq!(table.durations[&b], 2 * MS);
        assert!(!table.only_default());
    }

    #[test]
    fn test_table_same_section_is_noop() {
        let t0 = Instant::now();
        let mut table = SectionTable::new(t0, Duration::ZERO);
        table.accumulate(t0, "A");
        table.accumulate(t0 + 2 * MS, "A");
        table.accumulate(t0 + 5 * MS, "A");
        table.accumulate(t0 + 9 * MS, "");

        let a = Section::from_name("A");
        assert_eq!(table.durations[&a], 9 * MS);
        assert_eq!(table.order.len(), 2);
    }

    #[test]
    fn test_table_sections_sum_to_total() {
        let start = Instant::now();
        let first = start + 2 * MS;
        let mut table = SectionTable::new(first, first - start);
        let marks = [(5u32, "parse"), (7, "check"), (8, "parse"), (13, "emit"), (21, "check")];
        for (at, name) in marks {
            table.accumulate(start + at * MS, name);
        }
        let end = start + 30 * MS;
        table.accumulate(end, "");

        let sum: Duration = table.durations.values().sum();
        assert_eq!(sum, end - start);
    }

    #[test]
    fn test_table_duration_at_includes_running_section() {
        let t0 = Instant::now();
        let mut table = SectionTable::new(t0, Duration::ZERO);
        table.accumulate(t0 + MS, "A");
        let a = Section::from_name("A");
        assert_eq!(table.duration_at(&a, t0 + 4 * MS), Some(3 * MS));
        assert_eq!(table.duration_at(&Section::Default, t0 + 4 * MS), Some(MS));
        assert_eq!(table.duration_at(&Section::from_name("B"), t0), None);
    }

    fn table_with(entries: &[(&str, Duration)]) -> SectionTable {
        let now = Instant::now();
        let mut table = SectionTable::new(now, Duration::ZERO);
        for (name, duration) in entries {
            let section = Section::from_name(name);
            if section != Section::Default {
                table.order.push(section.clone());
            }
            table.durations.insert(section, *duration);
        }
        table
    }

    #[test]
    fn test_report_lines_are_aligned() {
        let sink = RecordingSink::new();
        let mut timer = ScopedTimer::with_sink("turn", &TimerConfig::unfiltered(), sink.clone());
        timer.silence();
        let table = table_with(&[
            ("", Duration::from_micros(50)),
            ("orders", Duration::from_millis(25)),
            ("ai", Duration::from_secs(3)),
        ]);

        report_sections(&timer, &table, Duration::from_millis(3025));

        assert_eq!(
            sink.lines(),
            vec![
                "turn -        time:       50 µs",
                "turn - orders time:       25 ms",
                "turn - ai     time:        3 s",
                "turn          time:        3 s",
            ]
        );
    }

    #[test]
    fn test_report_skips_sections_below_threshold() {
        let sink = RecordingSink::new();
        let config = TimerConfig::default().with_threshold(Duration::from_millis(10));
        let mut timer = ScopedTimer::with_sink("load", &config, sink.clone());
        timer.silence();
        let table = table_with(&[("", Duration::from_millis(1)), ("read", Duration::from_millis(40))]);

        report_sections(&timer, &table, Duration::from_millis(41));

        assert_eq!(
            sink.lines(),
            vec!["load - read time:       40 ms", "load        time:       41 ms"]
        );
    }

    #[test]
    fn test_report_flags_missing_section() {
        let sink = RecordingSink::new();
        let mut timer = ScopedTimer::with_sink("load", &TimerConfig::unfiltered(), sink.clone());
        timer.silence();
        let mut table = table_with(&[("read", Duration::from_millis(40))]);
        table.durations.remove(&Section::from_name("read"));

        report_sections(&timer, &table, Duration::from_millis(40));

        let errors = sink.lines_at(ReportLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Missing section \"read\""));
        // The default section line and the total are still written
        assert_eq!(sink.lines_at(ReportLevel::Debug).len(), 2);
    }

    #[test]
    fn test_without_sections_reports_like_plain_timer() {
        let sink = RecordingSink::new();
        {
            let t = recording("plain", TimerConfig::unfiltered(), &sink);
            assert!(t.section_names().is_empty());
            assert_eq!(t.current_section(), None);
        }
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("plain time: "));
    }

    #[test]
    fn test_only_default_section_reports_like_plain_timer() {
        let sink = RecordingSink::new();
        {
            let mut t = recording("plain", TimerConfig::unfiltered(), &sink);
            t.enter_section("");
            assert_eq!(t.section_names(), vec![""]);
        }
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("plain time: "));
    }

    #[test]
    fn test_reentry_order_has_no_duplicates() {
        let mut t = SectionedScopedTimer::with_options("order", false, Duration::ZERO);
        t.enter_section("A");
        t.enter_section("B");
        t.enter_section("A");
        assert_eq!(t.section_names(), vec!["", "A", "B"]);
        assert_eq!(t.current_section(), Some("A"));
    }

    #[test]
    fn test_sections_report_then_total() {
        let sink = RecordingSink::new();
        {
            let mut t = recording("turn", TimerConfig::unfiltered(), &sink);
            t.enter_section("orders");
            sleep(MS);
            t.enter_section("combat");
            sleep(MS);
        }
        let lines = sink.lines();
        assert_eq!(lines.len(), 4, "got {:?}", lines);
        assert!(lines[0].starts_with("turn -        time: "));
        assert!(lines[1].starts_with("turn - orders time: "));
        assert!(lines[2].starts_with("turn - combat time: "));
        assert!(lines[3].starts_with("turn          time: "));
    }

    #[test]
    fn test_disabled_sectioned_timer_never_reports() {
        let sink = RecordingSink::new();
        {
            let mut t = recording("quiet", TimerConfig::disabled().with_threshold(Duration::ZERO), &sink);
            t.enter_section("a");
            sleep(MS);
            t.enter_section("b");
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_total_below_threshold_suppresses_everything() {
        let sink = RecordingSink::new();
        {
            let mut t = recording("fast", TimerConfig::default().with_threshold(Duration::from_secs(60)), &sink);
            t.enter_section("a");
            t.enter_section("b");
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn test_section_durations_track_running_section() {
        let mut t = SectionedScopedTimer::with_options("live", false, Duration::ZERO);
        assert!(t.section_durations().is_empty());
        t.enter_section("work");
        sleep(2 * MS);
        let durations = t.section_durations();
        assert_eq!(durations.len(), 2);
        assert_eq!(durations[1].0, "work");
        assert!(durations[1].1 >= 2 * MS);
        assert!(t.section_duration("work").unwrap() >= 2 * MS);
        assert_eq!(t.section_duration("missing"), None);
    }

    #[test]
    fn test_restart_discards_sections() {
        let mut t = SectionedScopedTimer::with_options("again", false, Duration::ZERO);
        t.enter_section("a");
        sleep(5 * MS);
        t.restart();
        assert!(t.section_names().is_empty());
        assert_eq!(t.current_section(), None);

        t.enter_section("b");
        assert_eq!(t.section_names(), vec!["", "b"]);
        let sum: Duration = t.section_durations().iter().map(|(_, d)| *d).sum();
        assert!(sum <= t.elapsed());
        assert!(sum < 5 * MS);
    }

    #[test]
    fn test_stop_skips_report() {
        let sink = RecordingSink::new();
        let mut t = recording("stopped", TimerConfig::unfiltered(), &sink);
        t.enter_section("a");
        sleep(MS);
        assert!(t.stop() >= MS);
        assert!(sink.is_empty());
    }
}
