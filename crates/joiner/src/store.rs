//! The join store: per-strategy tables of merge targets.
use std::collections::HashMap;

use event::{Event, Key, MessageId, Strategy};
use thiserror::Error;
use tracing::{debug, info};

use crate::format;
use crate::types::{JoinAction, JoinError, JoinRecord};

/// Configuration for the join store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinerConfig {
    /// Character cap for clipped lines in space-bounded (by-content)
    /// aggregates.
    pub line_cap: usize,
}

impl Default for JoinerConfig {
    fn default() -> Self {
        JoinerConfig { line_cap: 32 }
    }
}

/// Errors produced when validating a [`JoinerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinerConfigError {
    /// A zero line cap would clip every line to a bare ellipsis.
    #[error("line_cap must be at least 1")]
    ZeroLineCap,
}

impl JoinerConfig {
    pub fn validate(&self) -> Result<(), JoinerConfigError> {
        if self.line_cap == 0 {
            return Err(JoinerConfigError::ZeroLineCap);
        }
        Ok(())
    }
}

/// Per-strategy `Key → JoinRecord` tables with the two-phase bind protocol.
///
/// A record is created on the first merge for its key and lives until the
/// owner evicts it; there is no auto-expiry. The message id of the
/// aggregate is external: it exists only after the caller's sink posts the
/// message, so the store hands out [`JoinAction::Send`] first and requires
/// [`bind`](Joiner::bind) before the same key can merge again.
#[derive(Debug, Default)]
pub struct Joiner {
    config: JoinerConfig,
    tables: HashMap<Strategy, HashMap<Key, JoinRecord>>,
}

impl Joiner {
    pub fn new(config: JoinerConfig) -> Self {
        Joiner {
            config,
            tables: HashMap::new(),
        }
    }

    pub fn config(&self) -> &JoinerConfig {
        &self.config
    }

    /// Merge a burst payload into the aggregate for `(strategy, key)`.
    ///
    /// First merge for a key composes the initial text and returns
    /// [`JoinAction::Send`]; later merges append and return
    /// [`JoinAction::Edit`]. A later merge on a record whose `Send` was
    /// never bound is a caller bug and fails fast with
    /// [`JoinError::UnboundTarget`].
    pub fn merge(
        &mut self,
        strategy: Strategy,
        key: &Key,
        events: &[Event],
    ) -> Result<JoinAction, JoinError> {
        let Some(first) = events.first() else {
            return Err(JoinError::EmptyFlush {
                strategy,
                key: key.clone(),
            });
        };
        let chat = key.chat();
        let line_cap = self.config.line_cap;
        let table = self.tables.entry(strategy).or_default();

        if let Some(record) = table.get_mut(key) {
            let Some(message_id) = record.message_id else {
                return Err(JoinError::UnboundTarget {
                    strategy,
                    key: key.clone(),
                });
            };
            match strategy {
                Strategy::SameActor => format::actor_append(&mut record.text, events),
                Strategy::SameContent => format::content_append(&mut record.text, events, line_cap),
            }
            debug!(strategy = ?strategy, merged = events.len(), "aggregate_extended");
            return Ok(JoinAction::Edit {
                chat,
                message_id,
                text: record.text.clone(),
            });
        }

        let text = match strategy {
            Strategy::SameActor => format::actor_base(events, first),
            Strategy::SameContent => format::content_base(events, first, line_cap),
        };
        table.insert(
            key.clone(),
            JoinRecord {
                message_id: None,
                text: text.clone(),
            },
        );
        info!(strategy = ?strategy, merged = events.len(), "aggregate_opened");
        Ok(JoinAction::Send { chat, text })
    }

    /// Report the message id the sink assigned to the last `Send` for
    /// `(strategy, key)`. Must happen after the send completes and before
    /// the next merge on the same key; binding a key with no record is a
    /// caller bug.
    pub fn bind(
        &mut self,
        strategy: Strategy,
        key: &Key,
        message_id: MessageId,
    ) -> Result<(), JoinError> {
        let record = self
            .tables
            .entry(strategy)
            .or_default()
            .get_mut(key)
            .ok_or_else(|| JoinError::UnknownRecord {
                strategy,
                key: key.clone(),
            })?;
        record.message_id = Some(message_id);
        Ok(())
    }

    /// Drop the record for `(strategy, key)` so a future burst starts a
    /// fresh aggregate. Absent keys are fine; the driving loop evicts on
    /// every lull.
    pub fn evict(&mut self, strategy: Strategy, key: &Key) {
        if let Some(table) = self.tables.get_mut(&strategy) {
            if table.remove(key).is_some() {
                debug!(strategy = ?strategy, "aggregate_evicted");
            }
        }
    }

    /// Inspect the record for `(strategy, key)`, if any. Primarily for tests
    /// and diagnostics.
    pub fn record(&self, strategy: Strategy, key: &Key) -> Option<&JoinRecord> {
        self.tables.get(&strategy)?.get(key)
    }
}
