//! Stream-edit loop: consumes chunk events from a channel and edits one message in place through
//! an [`EditThrottle`].
//!
//! # Entry points
//!
//! - **[`StreamEditor::spawn`]** – Starts the per-session loop task.
//! - **[`ChunkSender::send`]** – Synchronous push of a full-text chunk (use from stream callbacks).
//! - **[`StreamEditor::finish`]** – Delivers the completion text and returns the final edit result.
//!
//! The loop task is the only owner of the throttle, so chunk handling for one session is
//! sequential by construction. Each edit is awaited before the next event is read: edits never
//! overlap. Events that queued up during a slow edit are folded into one before the throttle sees
//! them, so a stale chunk is never sent and a queued completion goes out next.

use crate::throttle::{ChunkDecision, EditThrottle, ThrottleConfig};
use greet_core::{Bot, Chat, GreetError, HandlerError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type BotRef = Arc<dyn Bot>;

/// The message being edited: chat plus the placeholder's message id.
#[derive(Debug, Clone)]
pub struct EditTarget {
    pub chat: Chat,
    pub message_id: String,
}

impl EditTarget {
    pub fn new(chat: Chat, message_id: impl Into<String>) -> Self {
        Self {
            chat,
            message_id: message_id.into(),
        }
    }
}

#[derive(Debug)]
enum EditEvent {
    Chunk(String),
    Complete(String),
}

// ---------- Channel recv with deadline ----------

/// Result of receiving from a channel until an optional deadline.
#[derive(Debug)]
enum RecvUntilResult<T> {
    Item(T),
    Closed,
    Deadline,
}

/// Receives one item from `rx`; with `Some(deadline)` races against `sleep_until`. A ready item
/// wins over an expired deadline.
async fn recv_until<T>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    deadline: Option<Instant>,
) -> RecvUntilResult<T> {
    match deadline {
        None => match rx.recv().await {
            Some(t) => RecvUntilResult::Item(t),
            None => RecvUntilResult::Closed,
        },
        Some(at) => {
            tokio::select! {
                biased;
                result = rx.recv() => match result {
                    Some(t) => RecvUntilResult::Item(t),
                    None => RecvUntilResult::Closed,
                },
                _ = tokio::time::sleep_until(at) => RecvUntilResult::Deadline,
            }
        }
    }
}

/// Folds every event already queued behind `first` into one: the newest chunk wins and a
/// completion overrides any chunk. Returns the event and how many chunks it absorbed.
fn coalesce_queued(
    first: EditEvent,
    rx: &mut mpsc::UnboundedReceiver<EditEvent>,
) -> (EditEvent, usize) {
    let mut chunks = usize::from(matches!(first, EditEvent::Chunk(_)));
    let mut latest = first;
    while !matches!(latest, EditEvent::Complete(_)) {
        match rx.try_recv() {
            Ok(event) => {
                if matches!(event, EditEvent::Chunk(_)) {
                    chunks += 1;
                }
                latest = event;
            }
            Err(_) => break,
        }
    }
    (latest, chunks)
}

// ---------- Edits ----------

/// Intermediate edit: failures are logged and swallowed.
async fn send_intermediate_edit(bot: &BotRef, target: &EditTarget, text: &str) {
    if let Err(e) = bot.edit_message(&target.chat, &target.message_id, text).await {
        warn!(
            error = %e,
            chat_id = target.chat.id,
            message_id = %target.message_id,
            "Intermediate edit failed; continuing stream"
        );
    }
}

/// Final edit: the error is returned to the caller.
async fn send_final_edit(bot: &BotRef, target: &EditTarget, text: &str) -> Result<()> {
    bot.edit_message(&target.chat, &target.message_id, text).await
}

// ---------- Loop ----------

async fn run_stream_edit_loop(
    bot: BotRef,
    target: EditTarget,
    mut throttle: EditThrottle,
    mut rx: mpsc::UnboundedReceiver<EditEvent>,
) -> Result<()> {
    let started = Instant::now();
    let mut chunks_received = 0usize;
    let mut edits_sent = 0usize;

    loop {
        let event = match recv_until(&mut rx, throttle.deadline()).await {
            RecvUntilResult::Item(first) => {
                let (event, absorbed) = coalesce_queued(first, &mut rx);
                chunks_received += absorbed;
                if absorbed > 1 {
                    debug!(chat_id = target.chat.id, absorbed, "Coalesced queued chunks");
                }
                RecvUntilResult::Item(event)
            }
            other => other,
        };

        match event {
            RecvUntilResult::Item(EditEvent::Chunk(text)) => {
                match throttle.on_chunk(text, Instant::now()) {
                    ChunkDecision::EditNow(text) => {
                        send_intermediate_edit(&bot, &target, &text).await;
                        edits_sent += 1;
                    }
                    ChunkDecision::Deferred { fire_at } => {
                        debug!(
                            chat_id = target.chat.id,
                            delay_ms = fire_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                            "Edit deferred"
                        );
                    }
                }
            }
            RecvUntilResult::Deadline => {
                if let Some(text) = throttle.on_timer(Instant::now()) {
                    send_intermediate_edit(&bot, &target, &text).await;
                    edits_sent += 1;
                }
            }
            RecvUntilResult::Item(EditEvent::Complete(final_text)) => {
                let text = throttle.on_complete(final_text, Instant::now());
                let result = send_final_edit(&bot, &target, &text).await;
                info!(
                    chat_id = target.chat.id,
                    message_id = %target.message_id,
                    chunks_received,
                    intermediate_edits = edits_sent,
                    final_len = text.len(),
                    final_ok = result.is_ok(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Stream edit finished"
                );
                return result;
            }
            RecvUntilResult::Closed => {
                throttle.cancel();
                warn!(
                    chat_id = target.chat.id,
                    message_id = %target.message_id,
                    chunks_received,
                    "Chunk stream closed without completion"
                );
                return Err(
                    HandlerError::State("chunk stream closed before completion".to_string())
                        .into(),
                );
            }
        }
    }
}

// ---------- Handles ----------

/// Cloneable, synchronous chunk producer for one session.
#[derive(Clone)]
pub struct ChunkSender {
    tx: mpsc::UnboundedSender<EditEvent>,
}

impl ChunkSender {
    /// Pushes a full-text snapshot. Dropped with a warning if the session already finished.
    pub fn send(&self, text: impl Into<String>) {
        if self.tx.send(EditEvent::Chunk(text.into())).is_err() {
            warn!("Chunk dropped: stream edit session already finished");
        }
    }
}

/// Handle of one running stream-edit session.
pub struct StreamEditor {
    tx: mpsc::UnboundedSender<EditEvent>,
    task: JoinHandle<Result<()>>,
}

impl StreamEditor {
    /// **Entry point.** Spawns the loop that edits `target` for one greeting session.
    pub fn spawn(bot: BotRef, target: EditTarget, config: ThrottleConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let throttle = EditThrottle::new(config);
        let task = tokio::spawn(run_stream_edit_loop(bot, target, throttle, rx));
        Self { tx, task }
    }

    pub fn chunk_sender(&self) -> ChunkSender {
        ChunkSender {
            tx: self.tx.clone(),
        }
    }

    pub fn push_chunk(&self, text: impl Into<String>) {
        self.chunk_sender().send(text);
    }

    /// Signals completion with `final_text` and waits for the final edit. Any deferred edit is
    /// cancelled; the final edit is sent immediately and its error, if any, is returned.
    pub async fn finish(self, final_text: impl Into<String>) -> Result<()> {
        if self.tx.send(EditEvent::Complete(final_text.into())).is_err() {
            warn!("Completion dropped: stream edit loop already stopped");
        }
        drop(self.tx);
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(GreetError::Unknown(format!("stream edit task failed: {}", e))),
        }
    }
}
