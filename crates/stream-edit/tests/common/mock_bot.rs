//! Mock implementation of [`greet_core::Bot`] for stream-edit tests.
//!
//! Records every `edit_message` with the (virtual) time it was called so tests can assert on
//! spacing and text. Edits can be made to fail by text or all at once.

use async_trait::async_trait;
use greet_core::{Bot, Chat, GreetError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One recorded call to `edit_message(chat, message_id, text)`.
#[derive(Debug, Clone)]
#[allow(dead_code)] // chat_id, message_id kept for assertions in some tests
pub struct EditRecord {
    pub chat_id: i64,
    pub message_id: String,
    pub text: String,
    pub at: Instant,
}

#[derive(Default)]
pub struct MockBot {
    edits: Mutex<Vec<EditRecord>>,
    failing_texts: Mutex<HashSet<String>>,
    fail_all_edits: AtomicBool,
    edit_delay: Mutex<Duration>,
    in_flight: AtomicBool,
    overlapped: AtomicBool,
}

#[allow(dead_code)]
impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edits whose text equals `text` return an error (still recorded).
    pub fn fail_edit_with_text(&self, text: &str) {
        self.failing_texts.lock().unwrap().insert(text.to_string());
    }

    pub fn fail_all_edits(&self) {
        self.fail_all_edits.store(true, Ordering::SeqCst);
    }

    /// Every edit call takes `delay` (virtual time) to complete.
    pub fn set_edit_delay(&self, delay: Duration) {
        *self.edit_delay.lock().unwrap() = delay;
    }

    /// True if an edit started while another was still in flight.
    pub fn saw_overlapping_edits(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    pub fn edits(&self) -> Vec<EditRecord> {
        self.edits.lock().unwrap().clone()
    }

    pub fn edit_texts(&self) -> Vec<String> {
        self.edits().into_iter().map(|e| e.text).collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_message_and_return_id(&self, _chat: &Chat, _text: &str) -> Result<String> {
        Ok("1".to_string())
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        self.edits.lock().unwrap().push(EditRecord {
            chat_id: chat.id,
            message_id: message_id.to_string(),
            text: text.to_string(),
            at: Instant::now(),
        });
        if self.in_flight.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        let delay = *self.edit_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.store(false, Ordering::SeqCst);
        if self.fail_all_edits.load(Ordering::SeqCst)
            || self.failing_texts.lock().unwrap().contains(text)
        {
            return Err(GreetError::Bot("Bad Request: mock edit failure".to_string()));
        }
        Ok(())
    }

    async fn send_photo(&self, _chat: &Chat, _image_url: &str, _caption: Option<&str>) -> Result<()> {
        Ok(())
    }

    async fn send_audio(&self, _chat: &Chat, _audio_url: &str, _title: Option<&str>) -> Result<()> {
        Ok(())
    }
}
