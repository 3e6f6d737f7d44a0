//! Timer output configuration

use crate::error::TimerResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Threshold used when none is given: one millisecond.
pub const DEFAULT_THRESHOLD: Duration = Duration::from_millis(1);

/// Controls whether and when a timer reports.
///
/// Reports are written only when output is enabled and the measured duration
/// is at least `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    /// Master switch for report output.
    #[serde(default = "default_output_enabled")]
    pub output_enabled: bool,

    /// Durations shorter than this are not reported.
    ///
    /// Serialized as whole microseconds.
    #[serde(rename = "thresholdUs", with = "duration_micros", default = "default_threshold")]
    pub threshold: Duration,
}

fn default_output_enabled() -> bool {
    true
}

fn default_threshold() -> Duration {
    DEFAULT_THRESHOLD
}

impl TimerConfig {
    pub fn new(output_enabled: bool, threshold: Duration) -> Self {
        Self {
            output_enabled,
            threshold,
        }
    }

    /// Configuration that never reports.
    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_THRESHOLD)
    }

    /// Configuration that reports every measurement.
    pub fn unfiltered() -> Self {
        Self::new(true, Duration::ZERO)
    }

    pub fn with_output_enabled(mut self, output_enabled: bool) -> Self {
        self.output_enabled = output_enabled;
        self
    }

    pub fn with_threshold(mut self, threshold: Duration) -> Self {
        self.threshold = threshold;
        self
    }

    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json(json: &str) -> TimerResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Whether a measurement of `duration` would be reported.
    #[inline]
    pub fn should_report(&self, duration: Duration) -> bool {
        self.output_enabled && duration >= self.threshold
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new(true, DEFAULT_THRESHOLD)
    }
}

mod duration_micros {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        u64::try_from(duration.as_micros())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let micros = u64::deserialize(deserializer)?;
        Ok(Duration::from_micros(micros))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TimerError;

    #[test]
    fn test_defaults() {
        let config = TimerConfig::default();
        assert!(config.output_enabled);
        assert_eq!(config.threshold, Duration::from_millis(1));

        assert!(!TimerConfig::disabled().output_enabled);
        assert_eq!(TimerConfig::unfiltered().threshold, Duration::ZERO);
    }

    #[test]
    fn test_should_report() {
        let config = TimerConfig::default().with_threshold(Duration::from_millis(5));
        assert!(!config.should_report(Duration::from_micros(4_999)));
        assert!(config.should_report(Duration::from_millis(5)));
        assert!(config.should_report(Duration::from_secs(1)));

        let off = config.with_output_enabled(false);
        assert!(!off.should_report(Duration::from_secs(100)));
    }

    #[test]
    fn test_json_roundtrip_uses_micros() {
        let config = TimerConfig::new(false, Duration::from_millis(250));
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"outputEnabled":false,"thresholdUs":250000}"#);
        assert_eq!(TimerConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = TimerConfig::from_json(r#"{"thresholdUs": 20}"#).unwrap();
        assert!(config.output_enabled);
        assert_eq!(config.threshold, Duration::from_micros(20));

        let config = TimerConfig::from_json("{}").unwrap();
        assert_eq!(config, TimerConfig::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = TimerConfig::from_json(r#"{"thresholdUs": "soon"}"#).unwrap_err();
        assert!(matches!(err, TimerError::Config(_)));
    }
}
