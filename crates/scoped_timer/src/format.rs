//! Human-scaled duration formatting for timer reports

use std::fmt;
use std::time::Duration;

/// Minimum width of the numeric part of a formatted duration.
pub const DURATION_FIELD_WIDTH: usize = 8;

const MICRO: &str = "µs";

/// Format a duration with a unit chosen by its magnitude.
///
/// The number is right-aligned to [`DURATION_FIELD_WIDTH`] so that lines
/// from different reports stay in columns:
///
/// ```rust
/// use scoped_timer::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_secs(25)), "      25 s");
/// assert_eq!(format_duration(Duration::from_millis(2340)).trim(), "2.3 s");
/// assert_eq!(format_duration(Duration::from_nanos(500)).trim(), "500 ns");
/// ```
pub fn format_duration(duration: Duration) -> String {
    FormattedDuration(duration).to_string()
}

/// `Display` adapter producing the same text as [`format_duration`] without
/// an intermediate allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormattedDuration(pub Duration);

/// Value shown in front of the unit.
enum Scaled {
    Whole(u128),
    /// Count of tenths of the unit, truncated.
    Tenths(u128),
}

impl FormattedDuration {
    fn scale(self) -> (Scaled, &'static str) {
        let d = self.0;
        if d >= Duration::from_secs(20) {
            (Scaled::Whole(u128::from(d.as_secs())), "s")
        } else if d >= Duration::from_secs(2) {
            (Scaled::Tenths(d.as_millis() / 100), "s")
        } else if d >= Duration::from_millis(20) {
            (Scaled::Whole(d.as_millis()), "ms")
        } else if d >= Duration::from_millis(2) {
            (Scaled::Tenths(d.as_micros() / 100), "ms")
        } else if d >= Duration::from_micros(20) {
            (Scaled::Whole(d.as_micros()), MICRO)
        } else if d >= Duration::from_micros(2) {
            (Scaled::Tenths(d.as_nanos() / 100), MICRO)
        } else {
            (Scaled::Whole(d.as_nanos()), "ns")
        }
    }
}

impl fmt::Display for FormattedDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = self.scale();
        match value {
            Scaled::Whole(n) => write!(f, "{:>width$} {}", n, unit, width = DURATION_FIELD_WIDTH),
            // Tenths never exceed 199, so the conversion is exact.
            Scaled::Tenths(t) => write!(
                f,
                "{:>width$} {}",
                t as f64 / 10.0,
                unit,
                width = DURATION_FIELD_WIDTH
            ),
        }
    }
}
