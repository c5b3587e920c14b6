//! Floodjoin strategy routing layer.
//!
//! The router owns one [`BurstDetector`] per detection strategy and feeds
//! every incoming event through the chain in priority order. Strategies are
//! independently keyed and independently stateful: the same five messages
//! can simultaneously advance a sender's window and an identical-text
//! window.
//!
//! ## Pre-emption, not starvation
//!
//! When one event trips several strategies at once, only the
//! highest-priority burst is surfaced (same-actor outranks same-content).
//! Every qualifying detector still observes the event: a window must stay
//! truthful even when its strategy loses the priority race, otherwise the
//! losing detector would re-detect a stale burst later.

mod config;

use detector::{BurstDetector, Signal};
use event::{Event, Key, Strategy};
use tracing::debug;

pub use crate::config::{RouterConfig, RouterConfigError};
pub use detector::{DetectorConfig, DetectorConfigError};

/// The router's overall verdict for one event.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// No strategy fired; deliver the event as usual.
    Continue,
    /// One strategy detected a burst. `events` is the merge payload and
    /// `strategy`/`key` select the aggregation table entry it belongs to.
    Burst {
        strategy: Strategy,
        key: Key,
        events: Vec<Event>,
    },
}

/// Ordered chain of independently-keyed burst detectors.
#[derive(Debug)]
pub struct StrategyRouter {
    config: RouterConfig,
    by_actor: BurstDetector<Key>,
    by_content: BurstDetector<Key>,
}

impl StrategyRouter {
    pub fn new(config: RouterConfig) -> Self {
        let by_actor = BurstDetector::new(config.by_actor.clone());
        let by_content = BurstDetector::new(config.by_content.clone());
        StrategyRouter {
            config,
            by_actor,
            by_content,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route one event through every qualifying strategy.
    ///
    /// The surfaced verdict is the highest-priority non-`Continue` signal;
    /// lower-priority detectors still observe the event so their state
    /// advances (their signal is dropped, tagged in logs as pre-empted).
    pub fn decide(&mut self, event: &Event) -> Verdict {
        let mut verdict = Verdict::Continue;
        for strategy in Strategy::priority_order() {
            let Some(key) = strategy.key_for(event, self.config.max_content_key_len) else {
                continue;
            };
            let signal = self
                .detector_mut(strategy)
                .observe(key.clone(), event.clone());
            match signal {
                Signal::Continue => {}
                Signal::Flush(events) => {
                    if matches!(verdict, Verdict::Continue) {
                        verdict = Verdict::Burst {
                            strategy,
                            key,
                            events,
                        };
                    } else {
                        debug!(strategy = ?strategy, "burst_preempted");
                    }
                }
            }
        }
        verdict
    }

    /// Every strategy/key pair this event could belong to. The caller uses
    /// this to evict aggregation records when a lull resets a partition.
    pub fn keys_for(&self, event: &Event) -> Vec<(Strategy, Key)> {
        Strategy::priority_order()
            .into_iter()
            .filter_map(|strategy| {
                strategy
                    .key_for(event, self.config.max_content_key_len)
                    .map(|key| (strategy, key))
            })
            .collect()
    }

    /// Administrative reset: drop every window this event's keys select.
    pub fn reset(&mut self, event: &Event) {
        for (strategy, key) in self.keys_for(event) {
            self.detector_mut(strategy).reset(&key);
        }
    }

    fn detector_mut(&mut self, strategy: Strategy) -> &mut BurstDetector<Key> {
        match strategy {
            Strategy::SameActor => &mut self.by_actor,
            Strategy::SameContent => &mut self.by_content,
        }
    }

    /// Read-only detector access for diagnostics and tests.
    pub fn detector(&self, strategy: Strategy) -> &BurstDetector<Key> {
        match strategy {
            Strategy::SameActor => &self.by_actor,
            Strategy::SameContent => &self.by_content,
        }
    }
}
