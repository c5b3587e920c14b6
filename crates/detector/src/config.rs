//! Configuration for a single burst detector.
//!
//! [`DetectorConfig`] fixes the three knobs of the state machine. It is a
//! plain runtime value; file formats live with the caller (the umbrella
//! crate's YAML layer converts into this type after its own validation).
use chrono::Duration;
use thiserror::Error;

/// Runtime parameters of one [`BurstDetector`](crate::BurstDetector).
///
/// - `threshold`: how many events inside `delete_window` constitute a burst.
///   Must be at least 2, since a single message can never be a burst.
/// - `delete_window`: the sliding span over which events are counted. Events
///   exactly `delete_window` older than the newest are already outside it.
/// - `release_window`: how long after the last suppressed event suppression
///   keeps extending. Every suppressed event pushes the deadline out again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    pub threshold: usize,
    pub delete_window: Duration,
    pub release_window: Duration,
}

impl Default for DetectorConfig {
    /// Reference configuration: 5 messages within 15 seconds trip the
    /// detector; suppression releases after 10 quiet seconds.
    fn default() -> Self {
        DetectorConfig {
            threshold: 5,
            delete_window: Duration::seconds(15),
            release_window: Duration::seconds(10),
        }
    }
}

/// Errors produced when validating a [`DetectorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorConfigError {
    /// `threshold` below 2 would flag every message (or none) as a burst.
    #[error("threshold {threshold} is below the minimum of 2")]
    ThresholdTooLow { threshold: usize },

    /// A zero or negative window makes the state machine degenerate.
    #[error("{name} must be a positive duration")]
    NonPositiveWindow { name: &'static str },
}

impl DetectorConfig {
    /// Validate the configuration. Call once at startup; an invalid config
    /// is a deployment error, not a runtime condition.
    pub fn validate(&self) -> Result<(), DetectorConfigError> {
        if self.threshold < 2 {
            return Err(DetectorConfigError::ThresholdTooLow {
                threshold: self.threshold,
            });
        }
        if self.delete_window <= Duration::zero() {
            return Err(DetectorConfigError::NonPositiveWindow {
                name: "delete_window",
            });
        }
        if self.release_window <= Duration::zero() {
            return Err(DetectorConfigError::NonPositiveWindow {
                name: "release_window",
            });
        }
        Ok(())
    }
}
