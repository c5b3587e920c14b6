//! Floodjoin aggregation layer ("the joiner").
//!
//! Once the detector decides a partition is bursting, somebody has to own
//! the merged artifact: the single message that absorbs the burst and grows
//! with every further suppressed message. That somebody is the [`Joiner`].
//!
//! ## The two-phase protocol
//!
//! The artifact's message id is assigned by the external sink, so it cannot
//! be known at merge time. The contract is:
//!
//! 1. First [`merge`](Joiner::merge) for a key returns
//!    [`JoinAction::Send`] and stores a record with no message id.
//! 2. The caller posts the message, then reports the assigned id back with
//!    [`bind`](Joiner::bind), after the send completes and before the next
//!    merge on that key.
//! 3. Every later merge appends to the stored text and returns
//!    [`JoinAction::Edit`] carrying the bound id.
//! 4. When suppression ends, the caller [`evict`](Joiner::evict)s the key so
//!    the next burst starts a fresh artifact instead of extending a stale
//!    one.
//!
//! Skipping `bind` is a bug in the caller's loop and fails fast with
//! [`JoinError::UnboundTarget`]. A sink failure between send and bind leaves
//! the record permanently unbound; recovery is an explicit `evict`, since the
//! store does not retry side effects it never performs.

mod format;
mod store;
mod types;

pub use crate::store::{Joiner, JoinerConfig, JoinerConfigError};
pub use crate::types::{JoinAction, JoinError, JoinRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use event::{Actor, Event, Key, Strategy};

    fn msg(name: &str, text: &str, id: i64) -> Event {
        Event {
            chat_id: -42,
            actor: Actor {
                id: 7,
                first_name: name.into(),
                last_name: None,
            },
            sent_at: Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid"),
            text: text.into(),
            forwarded: false,
            message_id: id,
        }
    }

    fn actor_key() -> Key {
        Key::ByActor { chat: -42, actor: 7 }
    }

    #[test]
    fn first_merge_sends_then_bound_merges_edit() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let key = actor_key();
        let burst = [msg("Kim", "one", 1), msg("Kim", "two", 2)];

        let action = joiner
            .merge(Strategy::SameActor, &key, &burst)
            .expect("fresh key merges");
        let JoinAction::Send { chat, text } = action else {
            panic!("first merge must send");
        };
        assert_eq!(chat, -42);
        assert_eq!(text, "Kim says:\none\ntwo");

        joiner
            .bind(Strategy::SameActor, &key, 900)
            .expect("record exists");

        let action = joiner
            .merge(Strategy::SameActor, &key, &[msg("Kim", "three", 3)])
            .expect("bound key merges");
        let JoinAction::Edit {
            chat,
            message_id,
            text: edited,
        } = action
        else {
            panic!("bound merge must edit");
        };
        assert_eq!(chat, -42);
        assert_eq!(message_id, 900);
        // Order-preserving superset of the Send text.
        assert_eq!(edited, "Kim says:\none\ntwo\nthree");
        assert!(edited.starts_with(&text));
    }

    #[test]
    fn merge_before_bind_is_a_protocol_violation() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let key = actor_key();

        joiner
            .merge(Strategy::SameActor, &key, &[msg("Kim", "one", 1)])
            .expect("fresh key merges");
        let err = joiner
            .merge(Strategy::SameActor, &key, &[msg("Kim", "two", 2)])
            .expect_err("unbound record must be rejected");
        assert!(matches!(err, JoinError::UnboundTarget { .. }));
    }

    #[test]
    fn bind_without_record_is_a_protocol_violation() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let err = joiner
            .bind(Strategy::SameActor, &actor_key(), 900)
            .expect_err("nothing to bind");
        assert!(matches!(err, JoinError::UnknownRecord { .. }));
    }

    #[test]
    fn evicted_key_behaves_like_a_fresh_one() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let key = actor_key();

        joiner
            .merge(Strategy::SameActor, &key, &[msg("Kim", "old", 1)])
            .expect("fresh key merges");
        joiner.bind(Strategy::SameActor, &key, 900).expect("bound");
        joiner.evict(Strategy::SameActor, &key);

        let action = joiner
            .merge(Strategy::SameActor, &key, &[msg("Kim", "new", 2)])
            .expect("evicted key merges fresh");
        let JoinAction::Send { text, .. } = action else {
            panic!("evicted key must send again");
        };
        assert_eq!(text, "Kim says:\nnew");

        // Evicting an absent key is a no-op, not an error.
        joiner.evict(Strategy::SameActor, &key);
        joiner.evict(Strategy::SameActor, &actor_key());
    }

    #[test]
    fn strategies_keep_independent_tables() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let content_key = Key::ByContent {
            chat: -42,
            text: "buy now".into(),
        };

        joiner
            .merge(Strategy::SameActor, &actor_key(), &[msg("Kim", "buy now", 1)])
            .expect("actor table");
        joiner
            .merge(
                Strategy::SameContent,
                &content_key,
                &[msg("Kim", "buy now", 1), msg("Sam", "buy now", 2)],
            )
            .expect("content table");

        assert!(joiner.record(Strategy::SameActor, &actor_key()).is_some());
        let record = joiner
            .record(Strategy::SameContent, &content_key)
            .expect("content record");
        assert_eq!(record.text, "buy now\n— Kim\n— Sam");
        assert_eq!(record.message_id, None);
    }

    #[test]
    fn content_merge_clips_long_lines() {
        let mut joiner = Joiner::new(JoinerConfig { line_cap: 8 });
        let long = "a very long repeated advertisement";
        let key = Key::ByContent {
            chat: -42,
            text: long.into(),
        };

        let action = joiner
            .merge(Strategy::SameContent, &key, &[msg("Kim", long, 1)])
            .expect("merges");
        let JoinAction::Send { text, .. } = action else {
            panic!("first merge sends");
        };
        assert_eq!(text, "a very l…\n— Kim");
    }

    #[test]
    fn empty_flush_is_rejected() {
        let mut joiner = Joiner::new(JoinerConfig::default());
        let err = joiner
            .merge(Strategy::SameActor, &actor_key(), &[])
            .expect_err("no events, nothing to merge");
        assert!(matches!(err, JoinError::EmptyFlush { .. }));
    }

    #[test]
    fn zero_line_cap_fails_validation() {
        assert_eq!(
            JoinerConfig { line_cap: 0 }.validate(),
            Err(JoinerConfigError::ZeroLineCap)
        );
        JoinerConfig::default().validate().expect("default valid");
    }
}
