//! Floodjoin burst detection layer.
//!
//! A [`BurstDetector`] watches one partition family (for example "messages
//! per sender" or "messages per identical text") and answers a single
//! question for every event: is this partition currently bursting?
//!
//! ## How detection works
//!
//! Per key, the detector keeps a sliding window of recent events. Reaching
//! `threshold` events inside `delete_window` is the burst signal; the whole
//! window is flushed as the burst payload. From then on every further event
//! is flushed individually, and suppression keeps extending itself until
//! `release_window` passes without a new event. See [`WindowState`] for the
//! exact lifecycle.
//!
//! ## Guarantees worth knowing
//!
//! - No I/O, no clock calls: time comes exclusively from event timestamps,
//!   so replaying the same events yields the same signals on any machine.
//! - No internal timers: pruning and release are computed lazily when the
//!   next event for a key arrives. A key that goes silent keeps its last
//!   state until [`reset`](BurstDetector::reset); staleness is bounded by
//!   the owner's eviction discipline, not by this crate.
//! - Events for one key must be observed in arrival order; distinct keys are
//!   independent.

mod config;
mod window;

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use event::Event;
use tracing::{debug, info};

pub use crate::config::{DetectorConfig, DetectorConfigError};
pub use crate::window::{Signal, WindowState};

/// Per-key burst detection state machine.
///
/// Generic over the key type so one implementation serves every strategy;
/// the router instantiates it with the shared [`event::Key`].
#[derive(Debug)]
pub struct BurstDetector<K>
where
    K: Hash + Eq + Clone + Debug,
{
    config: DetectorConfig,
    windows: HashMap<K, WindowState>,
}

impl<K> BurstDetector<K>
where
    K: Hash + Eq + Clone + Debug,
{
    pub fn new(config: DetectorConfig) -> Self {
        BurstDetector {
            config,
            windows: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Feed one event for `key` through the state machine.
    ///
    /// Returns [`Signal::Flush`] when the partition is bursting: the payload
    /// is either the whole window (at the moment the threshold is crossed) or
    /// the single event (while suppression is active). Everything else is
    /// [`Signal::Continue`].
    pub fn observe(&mut self, key: K, event: Event) -> Signal {
        match self.windows.remove(&key) {
            None => {
                debug!(key = ?key, "window_opened");
                self.windows.insert(key, WindowState::fresh(event));
                Signal::Continue
            }
            Some(state) => {
                let was_collecting = matches!(state, WindowState::Lax { .. });
                let (next, signal) = state.advance(event, &self.config);
                if was_collecting && matches!(next, WindowState::Switching { .. }) {
                    info!(
                        key = ?key,
                        threshold = self.config.threshold,
                        "burst_threshold_crossed"
                    );
                }
                self.windows.insert(key, next);
                signal
            }
        }
    }

    /// Drop a key's window entirely. The next event for the key starts from
    /// a fresh `Lax` state.
    pub fn reset(&mut self, key: &K) {
        self.windows.remove(key);
    }

    /// Number of partitions currently holding state.
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    /// Inspect a key's current window, if any. Primarily for tests and
    /// diagnostics.
    pub fn window(&self, key: &K) -> Option<&WindowState> {
        self.windows.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use event::Actor;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0)
            .single()
            .expect("valid timestamp")
    }

    fn msg(secs: i64, id: i64) -> Event {
        Event {
            chat_id: -1,
            actor: Actor {
                id: 8,
                first_name: "Kim".into(),
                last_name: None,
            },
            sent_at: at(secs),
            text: "spam".into(),
            forwarded: false,
            message_id: id,
        }
    }

    fn detector() -> BurstDetector<&'static str> {
        BurstDetector::new(DetectorConfig::default())
    }

    #[test]
    fn five_close_messages_flush_on_the_fifth() {
        let mut det = detector();

        for i in 0..4 {
            let signal = det.observe("kim", msg(i * 3, i));
            assert_eq!(signal, Signal::Continue, "message {i} is below threshold");
        }

        let signal = det.observe("kim", msg(12, 4));
        let Signal::Flush(events) = signal else {
            panic!("fifth message inside the window crosses the threshold");
        };
        assert_eq!(events.len(), 5);
        assert_eq!(
            events.iter().map(|e| e.message_id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn sustained_burst_flushes_single_events() {
        let mut det = detector();
        for i in 0..5 {
            det.observe("kim", msg(i * 3, i));
        }

        // Sixth message within the release window: a one-event flush.
        let signal = det.observe("kim", msg(14, 5));
        assert_eq!(signal, Signal::Flush(vec![msg(14, 5)]));

        // And it stays suppressed while messages keep coming.
        let signal = det.observe("kim", msg(20, 6));
        assert_eq!(signal, Signal::Flush(vec![msg(20, 6)]));
    }

    #[test]
    fn quiet_gap_after_crossing_resets_to_fresh_window() {
        let mut det = detector();
        for i in 0..5 {
            det.observe("kim", msg(i * 3, i));
        }

        // 12s + 20s gap is past the 10s release window.
        let signal = det.observe("kim", msg(32, 5));
        assert_eq!(signal, Signal::Continue);
        let Some(WindowState::Lax { events }) = det.window(&"kim") else {
            panic!("gap resets to a collecting window");
        };
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message_id, 5);
    }

    #[test]
    fn spaced_messages_never_flush() {
        let mut det = detector();
        for i in 0..5 {
            // 5s apart: a 25s span always prunes below the threshold.
            let signal = det.observe("kim", msg(i * 5, i));
            assert_eq!(signal, Signal::Continue);
        }
        let Some(WindowState::Lax { events }) = det.window(&"kim") else {
            panic!("never left the collecting state");
        };
        assert!(events.len() < 5);
    }

    #[test]
    fn keys_are_independent() {
        let mut det = detector();
        for i in 0..4 {
            det.observe("kim", msg(i * 3, i));
        }
        assert_eq!(det.observe("sam", msg(12, 99)), Signal::Continue);
        assert!(matches!(
            det.observe("kim", msg(12, 4)),
            Signal::Flush(events) if events.len() == 5
        ));
        assert_eq!(det.tracked_keys(), 2);
    }

    #[test]
    fn reset_forgets_the_window() {
        let mut det = detector();
        for i in 0..4 {
            det.observe("kim", msg(i * 3, i));
        }
        det.reset(&"kim");
        assert_eq!(det.observe("kim", msg(12, 4)), Signal::Continue);
        assert_eq!(det.tracked_keys(), 1);
    }
}
