//! # Prompt
//!
//! Builds the messages sent to the text, image and song models for one greeting.
//!
//! ## Input format
//!
//! A greeting request is written as `recipient | occasion | style`. Fields may also be separated
//! by newlines. Only the recipient is required; the occasion falls back to [`DEFAULT_OCCASION`].
//!
//! ## External interactions
//!
//! - **AI models**: output of [`greeting_messages`] is sent to chat completion APIs; output of
//!   [`image_card_prompt`] and [`song_prompt`] to the image and song services.

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Default system instruction for greeting generation.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You write short, warm, personal greetings for chat \
messages. Answer with the greeting only, in plain text without markdown, at most five sentences. \
Use the language of the request.";

/// Occasion used when the request does not name one.
pub const DEFAULT_OCCASION: &str = "a special day";

/// Maximum characters of the greeting quoted into the image prompt.
const IMAGE_PROMPT_GREETING_CHARS: usize = 300;

/// One parsed greeting request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GreetingRequest {
    /// Display name of the person asking (signs the greeting).
    pub sender: Option<String>,
    pub recipient: String,
    pub occasion: String,
    pub style: Option<String>,
}

impl GreetingRequest {
    /// Parses `recipient | occasion | style`. Returns `None` when no recipient is given.
    ///
    /// Separators are `|` or newlines; empty fields are skipped; fields beyond the third are
    /// appended to the style.
    pub fn parse(text: &str, sender: Option<&str>) -> Option<Self> {
        let mut fields = text
            .split(|c| c == '|' || c == '\n')
            .map(str::trim)
            .filter(|f| !f.is_empty());

        let recipient = fields.next()?.to_string();
        let occasion = fields
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_OCCASION.to_string());
        let rest: Vec<&str> = fields.collect();
        let style = if rest.is_empty() {
            None
        } else {
            Some(rest.join(", "))
        };

        Some(Self {
            sender: sender.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string),
            recipient,
            occasion,
            style,
        })
    }

    /// One-line description used in the user message and media prompts.
    pub fn describe(&self) -> String {
        let mut out = format!("Recipient: {}\nOccasion: {}", self.recipient, self.occasion);
        if let Some(style) = &self.style {
            out.push_str("\nStyle: ");
            out.push_str(style);
        }
        if let Some(sender) = &self.sender {
            out.push_str("\nFrom: ");
            out.push_str(sender);
        }
        out
    }
}

/// Messages for the greeting model: the user request only. The system message is prepended by
/// the LLM client from its configuration.
pub fn greeting_messages(request: &GreetingRequest) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Write a greeting.\n{}",
        request.describe()
    ))]
}

/// Same as [`greeting_messages`] with an explicit system message first.
pub fn greeting_messages_with_system(
    system_message: &str,
    request: &GreetingRequest,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(system_message)];
    messages.extend(greeting_messages(request));
    messages
}

/// Prompt for the image card shown after the greeting. No text is drawn on the card.
pub fn image_card_prompt(request: &GreetingRequest, greeting: &str) -> String {
    let mut prompt = format!(
        "A festive greeting card illustration for {} celebrating {}.",
        request.recipient, request.occasion
    );
    if let Some(style) = &request.style {
        prompt.push_str(&format!(" Style: {}.", style));
    }
    let mood: String = greeting.chars().take(IMAGE_PROMPT_GREETING_CHARS).collect();
    if !mood.trim().is_empty() {
        prompt.push_str(" Mood inspired by this message: \"");
        prompt.push_str(mood.trim());
        prompt.push('"');
    }
    prompt.push_str(" No text or letters in the image.");
    prompt
}

/// Input for the song service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPrompt {
    pub title: String,
    pub lyrics: String,
    pub tags: String,
}

/// Builds a song prompt whose lyrics are the greeting itself.
pub fn song_prompt(request: &GreetingRequest, greeting: &str) -> SongPrompt {
    let title = format!("For {}", request.recipient);
    let tags = match &request.style {
        Some(style) => format!("{}, cheerful, celebration", style),
        None => "pop, cheerful, celebration".to_string(),
    };
    SongPrompt {
        title,
        lyrics: greeting.trim().to_string(),
        tags,
    }
}
