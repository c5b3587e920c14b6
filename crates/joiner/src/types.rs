//! Action and record types for the join store.
use event::{ChatId, Key, MessageId, Strategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the caller must do against the sink after a merge.
///
/// The store commits its in-memory state before returning one of these; the
/// side effect itself is caller-driven and never retried here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinAction {
    /// Post a new aggregate message. The store does not know the message id
    /// yet; the caller must report it back with
    /// [`Joiner::bind`](crate::Joiner::bind) before the next merge on the
    /// same key.
    Send { chat: ChatId, text: String },
    /// Overwrite the existing aggregate message with the grown text.
    Edit {
        chat: ChatId,
        message_id: MessageId,
        text: String,
    },
}

/// One merge target: the aggregate text so far plus the id of the message
/// holding it, once known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRecord {
    /// `None` between the `Send` action and the caller's `bind`.
    pub message_id: Option<MessageId>,
    pub text: String,
}

/// Protocol violations in the merge/bind/evict contract.
///
/// These indicate a bug in the caller's driving loop, not a runtime
/// condition to recover from; the store fails fast and leaves its tables
/// untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JoinError {
    /// `merge` was called again before the previous `Send` was bound.
    #[error(
        "merge for {strategy:?} key {key:?} has no bound message id; \
         bind must follow every Send before the next merge"
    )]
    UnboundTarget { strategy: Strategy, key: Key },

    /// `bind` was called for a key with no record.
    #[error("bind for {strategy:?} key {key:?} has no record to bind")]
    UnknownRecord { strategy: Strategy, key: Key },

    /// `merge` was called with no events to merge.
    #[error("merge for {strategy:?} key {key:?} carried no events")]
    EmptyFlush { strategy: Strategy, key: Key },
}
