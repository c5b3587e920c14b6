//! Core event value types.
//!
//! These types represent the shape of messages as the transport delivers them
//! and the validated form the suppression core operates on. They are designed
//! to be:
//!
//! - **Serializable**: JSON via serde, matching transport payloads
//! - **Cloneable**: cheap enough to buffer inside a detector window
//! - **Comparable**: equality checks for testing
//!
//! # Type Hierarchy
//!
//! ```text
//! RawEvent                         (transport-shaped, fields optional)
//! ├── chat_id: Option<ChatId>
//! ├── actor: Option<Actor>
//! ├── sent_at: Option<DateTime<Utc>>
//! ├── text: Option<String>
//! ├── forwarded: bool
//! └── message_id: Option<MessageId>
//!
//!         ↓ Event::try_from_raw()
//!
//! Event                            (validated, fields required)
//! ├── chat_id: ChatId
//! ├── actor: Actor
//! ├── sent_at: DateTime<Utc>
//! ├── text: String
//! ├── forwarded: bool
//! └── message_id: MessageId
//! ```
//!
//! An `Event` is immutable once observed: the core reads its fields, never
//! mutates them, and retains events only while a detector window explicitly
//! buffers them.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chat (group) identifier as assigned by the transport.
pub type ChatId = i64;

/// Sender identifier as assigned by the transport.
pub type ActorId = i64;

/// Message identifier as assigned by the transport. Only the transport can
/// mint these; the core learns them after the fact (see the joiner's
/// two-phase bind protocol).
pub type MessageId = i64;

/// The sender of a message.
///
/// Carries the display-name parts the by-actor merge format needs. Last names
/// are optional on most transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Actor {
    /// Human-readable name used when attributing merged messages:
    /// `"First Last"` when a last name is present, `"First"` otherwise.
    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// A message exactly as the transport handed it over.
///
/// Every field the transport can omit is optional here. Validation into an
/// [`Event`] is a single explicit check at ingestion; a raw event that fails
/// it is simply outside the core's domain and is left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub chat_id: Option<ChatId>,
    #[serde(default)]
    pub actor: Option<Actor>,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub text: Option<String>,
    /// Whether the message was forwarded/relayed from elsewhere. Forwarded
    /// messages never qualify for content-keyed detection.
    #[serde(default)]
    pub forwarded: bool,
    #[serde(default)]
    pub message_id: Option<MessageId>,
}

/// Why a [`RawEvent`] did not validate into an [`Event`].
///
/// None of these are fatal anywhere in the pipeline: a raw event missing a
/// required field resolves to "not applicable" and no state mutates. The
/// variants exist so callers can log which field was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("raw event has no chat id")]
    MissingChat,
    #[error("raw event has no sender")]
    MissingActor,
    #[error("raw event has no timestamp")]
    MissingTimestamp,
    #[error("raw event has no text payload")]
    MissingText,
    #[error("raw event has no message id")]
    MissingMessageId,
}

/// A validated message the suppression core operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub chat_id: ChatId,
    pub actor: Actor,
    pub sent_at: DateTime<Utc>,
    pub text: String,
    pub forwarded: bool,
    pub message_id: MessageId,
}

impl Event {
    /// Validate a transport-shaped event into the core's value type.
    ///
    /// This is the one place required fields are checked; downstream code
    /// never probes for absent attributes.
    pub fn try_from_raw(raw: RawEvent) -> Result<Self, EventError> {
        let RawEvent {
            chat_id,
            actor,
            sent_at,
            text,
            forwarded,
            message_id,
        } = raw;

        Ok(Event {
            chat_id: chat_id.ok_or(EventError::MissingChat)?,
            actor: actor.ok_or(EventError::MissingActor)?,
            sent_at: sent_at.ok_or(EventError::MissingTimestamp)?,
            text: text.ok_or(EventError::MissingText)?,
            forwarded,
            message_id: message_id.ok_or(EventError::MissingMessageId)?,
        })
    }

    /// Convenience wrapper over [`Event::try_from_raw`] for callers that do
    /// not care which field was missing.
    pub fn from_raw(raw: RawEvent) -> Option<Self> {
        Self::try_from_raw(raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn fixed_timestamp() -> DateTime<Utc> {
        let Some(date) = NaiveDate::from_ymd_opt(2024, 1, 1) else {
            panic!("invalid date components");
        };
        let Some(date_time) = date.and_hms_opt(12, 0, 0) else {
            panic!("invalid time components");
        };
        Utc.from_utc_datetime(&date_time)
    }

    fn full_raw() -> RawEvent {
        RawEvent {
            chat_id: Some(-1000123),
            actor: Some(Actor {
                id: 42,
                first_name: "Ada".into(),
                last_name: Some("Lovelace".into()),
            }),
            sent_at: Some(fixed_timestamp()),
            text: Some("hello".into()),
            forwarded: false,
            message_id: Some(7001),
        }
    }

    #[test]
    fn full_raw_event_validates() {
        let event = Event::try_from_raw(full_raw()).expect("all fields present");
        assert_eq!(event.chat_id, -1000123);
        assert_eq!(event.actor.id, 42);
        assert_eq!(event.text, "hello");
        assert_eq!(event.message_id, 7001);
    }

    #[test]
    fn each_missing_field_is_reported() {
        let cases = [
            (
                RawEvent {
                    chat_id: None,
                    ..full_raw()
                },
                EventError::MissingChat,
            ),
            (
                RawEvent {
                    actor: None,
                    ..full_raw()
                },
                EventError::MissingActor,
            ),
            (
                RawEvent {
                    sent_at: None,
                    ..full_raw()
                },
                EventError::MissingTimestamp,
            ),
            (
                RawEvent {
                    text: None,
                    ..full_raw()
                },
                EventError::MissingText,
            ),
            (
                RawEvent {
                    message_id: None,
                    ..full_raw()
                },
                EventError::MissingMessageId,
            ),
        ];

        for (raw, expected) in cases {
            assert_eq!(Event::try_from_raw(raw), Err(expected));
        }
    }

    #[test]
    fn display_name_joins_last_name_when_present() {
        let mut actor = Actor {
            id: 1,
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
        };
        assert_eq!(actor.display_name(), "Ada Lovelace");

        actor.last_name = None;
        assert_eq!(actor.display_name(), "Ada");
    }

    #[test]
    fn raw_event_deserializes_from_transport_json() {
        let json = r#"{
            "chat_id": -99,
            "actor": { "id": 5, "first_name": "Grace" },
            "sent_at": "2024-01-01T12:00:00Z",
            "text": "ship it",
            "message_id": 12
        }"#;

        let raw: RawEvent = serde_json::from_str(json).expect("valid transport json");
        assert!(!raw.forwarded);
        let event = Event::try_from_raw(raw).expect("validates");
        assert_eq!(event.actor.display_name(), "Grace");
        assert_eq!(event.sent_at, fixed_timestamp());
    }
}
