//! Recording mock of [`greet_core::Bot`] for greeting-bot tests.
//!
//! Every call is appended to one ordered log. Sends and edits can be made to fail by exact text.

use async_trait::async_trait;
use greet_core::{Bot, Chat, GreetError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// send_message or send_message_and_return_id; `id` is the id handed out.
    Send { chat_id: i64, text: String, id: String },
    Edit { chat_id: i64, message_id: String, text: String },
    Photo { chat_id: i64, url: String, caption: Option<String> },
    Audio { chat_id: i64, url: String, title: Option<String> },
}

pub struct MockBot {
    calls: Mutex<Vec<Call>>,
    failing_sends: Mutex<HashSet<String>>,
    failing_edits: Mutex<HashSet<String>>,
    fail_media: Mutex<bool>,
    next_id: AtomicU64,
}

impl Default for MockBot {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_sends: Mutex::new(HashSet::new()),
            failing_edits: Mutex::new(HashSet::new()),
            fail_media: Mutex::new(false),
            next_id: AtomicU64::new(100),
        }
    }
}

#[allow(dead_code)]
impl MockBot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends whose text equals `text` fail (still recorded).
    pub fn fail_send_with_text(&self, text: &str) {
        self.failing_sends.lock().unwrap().insert(text.to_string());
    }

    /// Edits whose text equals `text` fail (still recorded).
    pub fn fail_edit_with_text(&self, text: &str) {
        self.failing_edits.lock().unwrap().insert(text.to_string());
    }

    pub fn fail_media(&self) {
        *self.fail_media.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts of edits applied to `message_id`, in order.
    pub fn edit_texts(&self, message_id: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Edit {
                    message_id: id,
                    text,
                    ..
                } if id == message_id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn count_sent(&self, text: &str) -> usize {
        self.sent_texts().iter().filter(|t| t.as_str() == text).count()
    }

    fn record_send(&self, chat: &Chat, text: &str) -> Result<String> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.calls.lock().unwrap().push(Call::Send {
            chat_id: chat.id,
            text: text.to_string(),
            id: id.clone(),
        });
        if self.failing_sends.lock().unwrap().contains(text) {
            return Err(GreetError::Bot("Bad Request: mock send failure".to_string()));
        }
        Ok(id)
    }

    fn media_result(&self) -> Result<()> {
        if *self.fail_media.lock().unwrap() {
            return Err(GreetError::Bot("Bad Request: wrong file identifier".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.record_send(chat, text).map(|_| ())
    }

    async fn send_message_and_return_id(&self, chat: &Chat, text: &str) -> Result<String> {
        self.record_send(chat, text)
    }

    async fn edit_message(&self, chat: &Chat, message_id: &str, text: &str) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Edit {
            chat_id: chat.id,
            message_id: message_id.to_string(),
            text: text.to_string(),
        });
        if self.failing_edits.lock().unwrap().contains(text) {
            return Err(GreetError::Bot("Bad Request: message to edit not found".to_string()));
        }
        Ok(())
    }

    async fn send_photo(&self, chat: &Chat, image_url: &str, caption: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Photo {
            chat_id: chat.id,
            url: image_url.to_string(),
            caption: caption.map(str::to_string),
        });
        self.media_result()
    }

    async fn send_audio(&self, chat: &Chat, audio_url: &str, title: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Audio {
            chat_id: chat.id,
            url: audio_url.to_string(),
            title: title.map(str::to_string),
        });
        self.media_result()
    }
}
