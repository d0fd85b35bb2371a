//! # stream-edit
//!
//! Streams generated text into a chat by editing one placeholder message.
//!
//! A chunk source emits full-text snapshots at unpredictable intervals; the outbound API allows
//! one edit per interval. [`EditThrottle`] decides when to edit (immediately, or once at
//! `last_edit + interval` with the newest text), and [`StreamEditor`] runs it for one session.
//! The completion text always goes out as the final edit, immediately and without the marker.

mod editor;
mod throttle;

pub use editor::{ChunkSender, EditTarget, StreamEditor};
pub use throttle::{
    ChunkDecision, EditThrottle, ThrottleConfig, ThrottleState, DEFAULT_EDIT_INTERVAL,
    DEFAULT_MARKER,
};
