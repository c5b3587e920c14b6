//! Partition keys and detection strategies.
//!
//! A [`Key`] selects a partition: the subset of events that are counted
//! together when looking for a burst. A [`Strategy`] names the rule that
//! derives a key from an event, and doubles as the tag selecting which
//! aggregation table a burst's merged artifact lives in.
//!
//! Keys are pure value types: hashable, compared by structural equality,
//! with no behavior beyond key extraction.
use serde::{Deserialize, Serialize};

use crate::types::{ActorId, ChatId, Event};

/// A partition selector.
///
/// `ByContent` keys embed the message text itself, so content keys reject
/// over-length texts to bound the memory a hostile chat can pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Key {
    /// All messages from one sender in one chat.
    ByActor { chat: ChatId, actor: ActorId },
    /// All messages with byte-identical text in one chat.
    ByContent { chat: ChatId, text: String },
}

impl Key {
    /// The chat this partition belongs to. Every key variant carries one.
    pub fn chat(&self) -> ChatId {
        match self {
            Key::ByActor { chat, .. } => *chat,
            Key::ByContent { chat, .. } => *chat,
        }
    }
}

/// Detection strategy tag.
///
/// Ordering is significant: when one event trips several strategies at once,
/// the earlier strategy in [`Strategy::priority_order`] wins the right to
/// surface its burst. `SameActor` outranks `SameContent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Burst of messages from a single sender.
    SameActor,
    /// Burst of byte-identical messages, possibly from many senders.
    SameContent,
}

impl Strategy {
    /// All strategies, highest priority first.
    pub fn priority_order() -> [Strategy; 2] {
        [Strategy::SameActor, Strategy::SameContent]
    }

    /// Derive this strategy's partition key for `event`.
    ///
    /// Returns `None` when the event does not qualify for the rule at all:
    /// content keys skip forwarded messages and texts longer than
    /// `max_content_len` bytes. A skipped rule mutates no detector state.
    pub fn key_for(&self, event: &Event, max_content_len: usize) -> Option<Key> {
        match self {
            Strategy::SameActor => Some(Key::ByActor {
                chat: event.chat_id,
                actor: event.actor.id,
            }),
            Strategy::SameContent => {
                if event.forwarded || event.text.len() > max_content_len {
                    return None;
                }
                Some(Key::ByContent {
                    chat: event.chat_id,
                    text: event.text.clone(),
                })
            }
        }
    }
}
