//! Floodjoin event layer.
//!
//! This is where messages enter the suppression core. The transport hands us
//! whatever it has (fields may be missing, texts may be forwarded) and this
//! crate turns that into the validated [`Event`] value type the detector,
//! router, and joiner operate on.
//!
//! ## What we do here
//!
//! - **Validate required fields once** - chat, sender, timestamp, text, and
//!   message id are checked at the single [`Event::try_from_raw`] entry
//!   point. Nothing downstream probes for absent attributes.
//! - **Stay out of the way** - a raw event that fails validation is not an
//!   error anywhere; it is simply outside the core's domain.
//! - **Define partitions** - [`Key`] and [`Strategy`] describe which events
//!   are counted together and which rule produced a detection.
//!
//! ## Ownership
//!
//! Events are immutable values. The core never mutates one and retains them
//! only while a detector window explicitly buffers them.

mod key;
mod types;

pub use crate::key::{Key, Strategy};
pub use crate::types::{Actor, ActorId, ChatId, Event, EventError, MessageId, RawEvent};
