//! Merge text composition, per strategy.
//!
//! Pure functions: same events + same config, same text, on any machine.
//!
//! - By-actor aggregates open with an author line and then carry every merged
//!   text verbatim, one per line.
//! - By-content aggregates are space-bounded: one clipped content line, then
//!   an attribution line per merged message. Embedded newlines are structural
//!   in the artifact, so clipped lines escape them to spaces.
use event::Event;

/// Initial by-actor text: `"{name} says:"` plus every burst text on its own
/// line.
pub(crate) fn actor_base(events: &[Event], author: &Event) -> String {
    let mut text = format!("{} says:", author.actor.display_name());
    actor_append(&mut text, events);
    text
}

/// Append further texts to an existing by-actor aggregate.
pub(crate) fn actor_append(text: &mut String, events: &[Event]) {
    for event in events {
        text.push('\n');
        text.push_str(&event.text);
    }
}

/// Initial by-content text: the shared content, clipped, then one
/// attribution line per message that said it.
pub(crate) fn content_base(events: &[Event], shared: &Event, line_cap: usize) -> String {
    let mut text = clip_line(&shared.text, line_cap);
    content_append(&mut text, events, line_cap);
    text
}

/// Append attribution lines for newly merged by-content messages.
pub(crate) fn content_append(text: &mut String, events: &[Event], line_cap: usize) {
    for event in events {
        text.push_str("\n— ");
        text.push_str(&clip_line(&event.actor.display_name(), line_cap));
    }
}

/// Escape structural characters and clip to `cap` characters.
///
/// Newlines collapse to single spaces so one logical line stays one physical
/// line; an over-cap line ends in `…`.
pub(crate) fn clip_line(text: &str, cap: usize) -> String {
    let mut line = String::with_capacity(text.len().min(cap + 4));
    let mut last_was_space = false;
    for ch in text.chars() {
        let ch = if ch == '\n' || ch == '\r' { ' ' } else { ch };
        if ch == ' ' && last_was_space {
            continue;
        }
        last_was_space = ch == ' ';
        line.push(ch);
    }
    if line.chars().count() > cap {
        let mut clipped: String = line.chars().take(cap).collect();
        clipped.push('…');
        return clipped;
    }
    line
}
