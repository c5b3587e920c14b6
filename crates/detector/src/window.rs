//! Per-partition window state and its transition function.
//!
//! Each partition is in exactly one of three states:
//!
//! - [`Lax`](WindowState::Lax): collecting. The window holds the recent
//!   events, time-ascending, pruned so nothing is older than
//!   `newest - delete_window`.
//! - [`Switching`](WindowState::Switching): the threshold was crossed by the
//!   most recent event. Transient; the very next event resolves it.
//! - [`Strict`](WindowState::Strict): actively suppressing. Every further
//!   event is flushed individually until `stop_at` passes without one.
//!
//! `Switching` exists so the *next* event decides whether the burst is
//! sustained (→ `Strict`) or was a one-off spike (→ back to `Lax`). The
//! strict deadline is computed from the previous stop time before it is
//! refreshed, which keeps release timing insensitive to processing-order
//! jitter.
//!
//! All transitions are lazy: there are no timers, and a partition that never
//! sees another event stays in its last state until the owner evicts it.
use chrono::{DateTime, Duration, Utc};
use event::Event;

use crate::config::DetectorConfig;

/// The detector's verdict for one observed event.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Nothing to do; deliver the event as usual.
    Continue,
    /// The carried events form (part of) a burst and should be merged now.
    Flush(Vec<Event>),
}

/// Per-key state of a burst detector. See the module docs for the lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowState {
    Lax { events: Vec<Event> },
    Switching { events: Vec<Event> },
    Strict { stop_at: DateTime<Utc> },
}

impl WindowState {
    /// Fresh window holding a single event.
    pub(crate) fn fresh(event: Event) -> Self {
        WindowState::Lax {
            events: vec![event],
        }
    }

    /// Advance the state machine by one event, yielding the follow-up state
    /// and the signal for the caller.
    pub(crate) fn advance(self, event: Event, cfg: &DetectorConfig) -> (Self, Signal) {
        match self {
            WindowState::Lax { mut events } => {
                insert_ordered(&mut events, event);
                prune_expired(&mut events, cfg.delete_window);
                if events.len() >= cfg.threshold {
                    let flushed = events.clone();
                    (WindowState::Switching { events }, Signal::Flush(flushed))
                } else {
                    (WindowState::Lax { events }, Signal::Continue)
                }
            }
            WindowState::Switching { events } => {
                // A Switching window is never empty (it crossed the
                // threshold); recover to a fresh window rather than panic.
                let Some(newest) = events.last().map(|e| e.sent_at) else {
                    return (WindowState::fresh(event), Signal::Continue);
                };
                let stop_at = newest + cfg.release_window;
                Self::release_or_extend(stop_at, event, cfg)
            }
            WindowState::Strict { stop_at } => Self::release_or_extend(stop_at, event, cfg),
        }
    }

    /// Shared tail of the `Switching` and `Strict` transitions: an event at
    /// or before the deadline keeps suppression alive and pushes the
    /// deadline out; a later one releases into a fresh window.
    fn release_or_extend(
        stop_at: DateTime<Utc>,
        event: Event,
        cfg: &DetectorConfig,
    ) -> (Self, Signal) {
        if event.sent_at <= stop_at {
            let extended = stop_at.max(event.sent_at + cfg.release_window);
            (
                WindowState::Strict { stop_at: extended },
                Signal::Flush(vec![event]),
            )
        } else {
            (WindowState::fresh(event), Signal::Continue)
        }
    }
}

/// Insert keeping ascending `sent_at` order; ties go after existing equal
/// timestamps, so arrival order is preserved among equals.
fn insert_ordered(events: &mut Vec<Event>, event: Event) {
    let at = events.partition_point(|e| e.sent_at <= event.sent_at);
    events.insert(at, event);
}

/// Drop everything at or beyond the window edge. The boundary is inclusive:
/// an event exactly `delete_window` older than the newest is gone.
fn prune_expired(events: &mut Vec<Event>, delete_window: Duration) {
    let Some(newest) = events.last().map(|e| e.sent_at) else {
        return;
    };
    let edge = newest - delete_window;
    events.retain(|e| e.sent_at > edge);
}
