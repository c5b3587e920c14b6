//! Demo helpers: an in-memory sink and a canned burst.
//!
//! Used by the demo binary and handy for quick experiments. Hidden from the
//! public API surface on purpose.
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::{Actor, ChatId, MessageId, RawEvent, Sink, SinkError};

/// Everything a [`MemorySink`] was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Send {
        chat: ChatId,
        text: String,
        assigned: MessageId,
    },
    Edit {
        chat: ChatId,
        message_id: MessageId,
        text: String,
    },
    Delete {
        chat: ChatId,
        message_ids: Vec<MessageId>,
    },
}

/// An in-memory sink that assigns sequential message ids and records every
/// call.
#[derive(Debug, Default)]
pub struct MemorySink {
    next_id: AtomicI64,
    calls: Mutex<Vec<SinkCall>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink {
            next_id: AtomicI64::new(9000),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().expect("sink lock poisoned").clone()
    }

    fn push(&self, call: SinkCall) {
        self.calls.lock().expect("sink lock poisoned").push(call);
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn send_message(&self, chat: ChatId, text: &str) -> Result<MessageId, SinkError> {
        let assigned = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.push(SinkCall::Send {
            chat,
            text: text.to_string(),
            assigned,
        });
        Ok(assigned)
    }

    async fn edit_message(
        &self,
        chat: ChatId,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), SinkError> {
        self.push(SinkCall::Edit {
            chat,
            message_id,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn delete_messages(
        &self,
        chat: ChatId,
        message_ids: &[MessageId],
    ) -> Result<(), SinkError> {
        self.push(SinkCall::Delete {
            chat,
            message_ids: message_ids.to_vec(),
        });
        Ok(())
    }
}

/// Fixed origin so demo runs are reproducible.
pub fn demo_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
        .single()
        .expect("valid demo epoch")
}

/// A raw event the way the transport would deliver it.
pub fn demo_event(actor: i64, name: &str, text: &str, secs: i64, id: i64) -> RawEvent {
    RawEvent {
        chat_id: Some(-1001),
        actor: Some(Actor {
            id: actor,
            first_name: name.to_string(),
            last_name: None,
        }),
        sent_at: Some(demo_epoch() + Duration::seconds(secs)),
        text: Some(text.to_string()),
        forwarded: false,
        message_id: Some(id),
    }
}

/// A canned same-actor burst followed by a lull: six rapid messages, then a
/// quiet one half a minute later.
pub fn demo_burst() -> Vec<RawEvent> {
    let mut events: Vec<RawEvent> = (0..6)
        .map(|i| demo_event(42, "Spammy", &format!("spam #{i}"), i * 2, 100 + i))
        .collect();
    events.push(demo_event(42, "Spammy", "sorry, done now", 45, 106));
    events
}
