//! Edit throttle: a debounced trailing-edge scheduler with a mandatory final flush.
//!
//! [`EditThrottle`] is a pure state machine. It never sleeps or calls the network; the caller
//! (see [`crate::StreamEditor`]) feeds it chunks, timer expiries and the completion, and performs
//! the edits it asks for.
//!
//! # States
//!
//! - [`ThrottleState::Idle`] – nothing scheduled.
//! - [`ThrottleState::ScheduledPending`] – one deferred edit due at `fire_at`; when it fires it
//!   sends whatever text is pending at that moment.
//!
//! # Precondition
//!
//! Calls for one session are sequential. The throttle holds no locks and is not meant to be shared
//! between concurrent producers.

use std::time::Duration;
use tokio::time::Instant;

/// Default minimum interval between two edits of the same message.
pub const DEFAULT_EDIT_INTERVAL: Duration = Duration::from_millis(500);

/// Default suffix shown while generation is still in progress.
pub const DEFAULT_MARKER: &str = " ▌";

/// Interval and marker used by one [`EditThrottle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub interval: Duration,
    pub marker: String,
}

impl ThrottleConfig {
    pub fn new(interval: Duration, marker: impl Into<String>) -> Self {
        Self {
            interval,
            marker: marker.into(),
        }
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::new(DEFAULT_EDIT_INTERVAL, DEFAULT_MARKER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleState {
    Idle,
    ScheduledPending { fire_at: Instant },
}

/// What the caller must do after [`EditThrottle::on_chunk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkDecision {
    /// Edit now with this (marker-suffixed) text.
    EditNow(String),
    /// Nothing to send yet; call [`EditThrottle::on_timer`] at `fire_at`.
    Deferred { fire_at: Instant },
}

/// Per-session throttle state: last edit time, latest known text, at most one deferred edit.
#[derive(Debug)]
pub struct EditThrottle {
    config: ThrottleConfig,
    last_edit: Option<Instant>,
    pending_text: Option<String>,
    state: ThrottleState,
}

impl EditThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            last_edit: None,
            pending_text: None,
            state: ThrottleState::Idle,
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    pub fn state(&self) -> ThrottleState {
        self.state
    }

    /// When the deferred edit is due, if one is scheduled.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ThrottleState::Idle => None,
            ThrottleState::ScheduledPending { fire_at } => Some(fire_at),
        }
    }

    pub fn last_edit(&self) -> Option<Instant> {
        self.last_edit
    }

    /// Latest chunk received (sent or not).
    pub fn pending_text(&self) -> Option<&str> {
        self.pending_text.as_deref()
    }

    /// Records a new full-text chunk at `now`. Any scheduled edit is cancelled first; its text is
    /// superseded by `chunk`, which the next edit will carry.
    pub fn on_chunk(&mut self, chunk: String, now: Instant) -> ChunkDecision {
        self.pending_text = Some(chunk);
        self.state = ThrottleState::Idle;

        match self.last_edit {
            Some(last) if now.saturating_duration_since(last) < self.config.interval => {
                let fire_at = last + self.config.interval;
                self.state = ThrottleState::ScheduledPending { fire_at };
                ChunkDecision::Deferred { fire_at }
            }
            _ => {
                self.last_edit = Some(now);
                ChunkDecision::EditNow(self.marked_pending())
            }
        }
    }

    /// Fires the deferred edit if it is due at `now`. Returns the marker-suffixed text of the
    /// chunk that is current at fire time, or `None` when nothing is due.
    pub fn on_timer(&mut self, now: Instant) -> Option<String> {
        match self.state {
            ThrottleState::ScheduledPending { fire_at } if now >= fire_at => {
                self.state = ThrottleState::Idle;
                self.last_edit = Some(now);
                Some(self.marked_pending())
            }
            _ => None,
        }
    }

    /// Cancels any deferred edit and returns the text for the final edit: `final_text` verbatim,
    /// no marker. The final edit is not subject to the interval.
    pub fn on_complete(&mut self, final_text: String, now: Instant) -> String {
        self.state = ThrottleState::Idle;
        self.last_edit = Some(now);
        self.pending_text = Some(final_text.clone());
        final_text
    }

    /// Drops the deferred edit, if any, without sending it.
    pub fn cancel(&mut self) {
        self.state = ThrottleState::Idle;
    }

    fn marked_pending(&self) -> String {
        let text = self.pending_text.as_deref().unwrap_or_default();
        format!("{}{}", text, self.config.marker)
    }
}
