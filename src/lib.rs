//! Workspace umbrella crate for floodjoin.
//!
//! This crate stitches the suppression stages together so callers can drive
//! the whole decide → merge → send/edit → delete loop with a single API
//! entry point: hand a [`Pipeline`] the raw events as the transport delivers
//! them, give it a [`Sink`] implementation for the three side effects, and
//! it takes care of the rest.
//!
//! ## The loop, spelled out
//!
//! For every incoming event the pipeline:
//!
//! 1. Validates the raw event; events missing required fields are ignored.
//! 2. Asks the [`StrategyRouter`] whether any partition is bursting.
//! 3. On a lull, evicts the event's aggregation records so the next burst
//!    starts a fresh artifact, and leaves the event alone.
//! 4. On a burst, merges the payload through the [`Joiner`], performs the
//!    resulting send or edit against the sink, binds the assigned message id
//!    (send only), and finally deletes the original messages.
//!
//! The in-memory state transition commits *before* the sink runs. A sink
//! failure between send and bind therefore leaves that record unbound; the
//! documented recovery is an explicit [`Joiner::evict`]. This is an accepted
//! at-least-once trade-off, not something the core papers over.
//!
//! ## Example
//!
//! ```no_run
//! use floodjoin::{FloodjoinConfig, Pipeline, RawEvent, Sink, SinkError};
//! use floodjoin::{ChatId, MessageId};
//! use async_trait::async_trait;
//!
//! struct MySink;
//!
//! #[async_trait]
//! impl Sink for MySink {
//!     async fn send_message(&self, chat: ChatId, text: &str) -> Result<MessageId, SinkError> {
//!         todo!("post to the transport, return the assigned id")
//!     }
//!     async fn edit_message(
//!         &self,
//!         chat: ChatId,
//!         message_id: MessageId,
//!         text: &str,
//!     ) -> Result<(), SinkError> {
//!         todo!()
//!     }
//!     async fn delete_messages(
//!         &self,
//!         chat: ChatId,
//!         message_ids: &[MessageId],
//!     ) -> Result<(), SinkError> {
//!         todo!()
//!     }
//! }
//!
//! # async fn run(raw: RawEvent) -> Result<(), Box<dyn std::error::Error>> {
//! let mut pipeline = Pipeline::new(&FloodjoinConfig::default())?;
//! let outcome = pipeline.process(raw, &MySink).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub use detector::{
    BurstDetector, DetectorConfig, DetectorConfigError, Signal, WindowState,
};
pub use event::{
    Actor, ActorId, ChatId, Event, EventError, Key, MessageId, RawEvent, Strategy,
};
pub use joiner::{JoinAction, JoinError, JoinRecord, Joiner, JoinerConfig, JoinerConfigError};
pub use router::{RouterConfig, RouterConfigError, StrategyRouter, Verdict};

mod config;
#[doc(hidden)]
pub mod demo;

pub use crate::config::{
    ConfigLoadError, DetectorYaml, FloodjoinConfig, JoinerYaml, RouterYaml,
};

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

/// Failure reported by a [`Sink`] implementation.
///
/// Deliberately opaque: the core neither retries nor interprets transport
/// failures, it only surfaces them through [`PipelineError::Sink`].
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct SinkError {
    message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        SinkError {
            message: message.into(),
        }
    }
}

/// The external side-effect boundary.
///
/// Implemented by the transport adapter, consumed by [`Pipeline::process`].
/// The core never implements this itself and never calls it outside the
/// driving loop.
#[async_trait]
pub trait Sink {
    /// Post a new message; returns the transport-assigned id.
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<MessageId, SinkError>;

    /// Overwrite an existing message's text.
    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), SinkError>;

    /// Delete the original messages a merge absorbed.
    async fn delete_messages(
        &self,
        chat: ChatId,
        message_ids: &[MessageId],
    ) -> Result<(), SinkError>;
}

/// What the pipeline did with one raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The raw event was missing required fields; nothing happened.
    Ignored,
    /// No burst: the message stays as delivered by the transport.
    Delivered,
    /// A burst was merged into its aggregate; the originals were deleted.
    Suppressed { strategy: Strategy, merged: usize },
}

/// Errors surfaced by [`Pipeline::process`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A join-store precondition was violated: a bug in the driving loop,
    /// not a runtime condition.
    #[error("join protocol violation: {0}")]
    Join(#[from] JoinError),

    /// A sink side effect failed. The in-memory transition already
    /// committed; see the crate docs for the recovery contract.
    #[error("sink call failed: {0}")]
    Sink(String),
}

/// The assembled suppression pipeline: router + joiner + driving loop.
pub struct Pipeline {
    router: StrategyRouter,
    joiner: Joiner,
}

impl Pipeline {
    /// Build a pipeline from a validated configuration.
    pub fn new(config: &FloodjoinConfig) -> Result<Self, ConfigLoadError> {
        config.validate()?;
        Ok(Self::from_parts(
            StrategyRouter::new(config.router_config()),
            Joiner::new(config.joiner_config()),
        ))
    }

    /// Assemble from already-constructed stages (useful in tests).
    pub fn from_parts(router: StrategyRouter, joiner: Joiner) -> Self {
        Pipeline { router, joiner }
    }

    pub fn router(&self) -> &StrategyRouter {
        &self.router
    }

    pub fn joiner(&self) -> &Joiner {
        &self.joiner
    }

    /// Mutable access for administrative recovery (e.g. the manual `evict`
    /// after a sink failure between send and bind).
    pub fn joiner_mut(&mut self) -> &mut Joiner {
        &mut self.joiner
    }

    pub fn router_mut(&mut self) -> &mut StrategyRouter {
        &mut self.router
    }

    /// Drive one raw event through the full loop.
    ///
    /// Events for one partition must be processed in arrival order; see the
    /// crate docs for the ordering and recovery contracts.
    pub async fn process<S>(&mut self, raw: RawEvent, sink: &S) -> Result<Outcome, PipelineError>
    where
        S: Sink + Sync + ?Sized,
    {
        let event = match Event::try_from_raw(raw) {
            Ok(event) => event,
            Err(err) => {
                debug!(reason = %err, "event_outside_domain");
                return Ok(Outcome::Ignored);
            }
        };

        match self.router.decide(&event) {
            Verdict::Continue => {
                // A lull truly resets: drop every aggregate this event could
                // have belonged to, so the next burst starts fresh.
                for (strategy, key) in self.router.keys_for(&event) {
                    self.joiner.evict(strategy, &key);
                }
                Ok(Outcome::Delivered)
            }
            Verdict::Burst {
                strategy,
                key,
                events,
            } => {
                let merged = events.len();
                let chat = key.chat();
                let action = self.joiner.merge(strategy, &key, &events)?;

                match action {
                    JoinAction::Send { chat, text } => {
                        let message_id = sink
                            .send_message(chat, &text)
                            .await
                            .map_err(|e| PipelineError::Sink(e.to_string()))?;
                        self.joiner.bind(strategy, &key, message_id)?;
                    }
                    JoinAction::Edit {
                        chat,
                        message_id,
                        text,
                    } => {
                        sink.edit_message(chat, message_id, &text)
                            .await
                            .map_err(|e| PipelineError::Sink(e.to_string()))?;
                    }
                }

                let originals: Vec<MessageId> = events.iter().map(|e| e.message_id).collect();
                sink.delete_messages(chat, &originals)
                    .await
                    .map_err(|e| PipelineError::Sink(e.to_string()))?;

                info!(strategy = ?strategy, merged, "burst_suppressed");
                Ok(Outcome::Suppressed { strategy, merged })
            }
        }
    }
}
