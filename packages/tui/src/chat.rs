//! The chat widget: transcript state plus the local fallback responder.
//!
//! One widget instance exists per activation; closing the overlay discards
//! it (and the engine's conversation memory) entirely.

use chrono::{DateTime, Utc};
use telcome_eliza::Eliza;
use tracing::warn;
use tui_input::Input;

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSender {
    User,
    Bot,
}

/// A chat transcript entry
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub sender: ChatSender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text.into(), ChatSender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text.into(), ChatSender::Bot)
    }

    fn new(text: String, sender: ChatSender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text,
            timestamp: Utc::now(),
        }
    }

    pub fn sender_label(&self) -> &'static str {
        match self.sender {
            ChatSender::User => "You",
            ChatSender::Bot => "Eliza",
        }
    }
}

/// Chat overlay state. Created on open, dropped on close.
pub struct ChatWidget {
    pub messages: Vec<ChatMessage>,
    pub input: Input,
    pub waiting: bool,
    eliza: Eliza,
}

impl ChatWidget {
    /// A fresh conversation greeting the signed-in user.
    pub fn new(username: Option<&str>) -> Self {
        let eliza = match Eliza::new() {
            Ok(engine) => engine,
            Err(e) => {
                // The embedded grammar is validated by tests; reaching this
                // means a broken build, but the widget still has to open.
                warn!("falling back to minimal grammar: {}", e);
                Eliza::with_script(minimal_script())
            }
        };
        let name = username.unwrap_or("there");
        let messages = vec![
            ChatMessage::bot(format!("Hi {name}")),
            ChatMessage::bot(eliza.greeting().to_string()),
        ];
        Self {
            messages,
            input: Input::default(),
            waiting: false,
            eliza,
        }
    }

    /// Take the drafted message, if it is non-empty.
    pub fn take_input(&mut self) -> Option<String> {
        let text = self.input.value().trim().to_string();
        if text.is_empty() {
            return None;
        }
        self.input.reset();
        Some(text)
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
        self.waiting = true;
    }

    pub fn push_bot(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::bot(text));
        self.waiting = false;
    }

    /// Answer `input` with the local engine. Used when the remote bot call
    /// failed; the transcript shows a reply, never a transport error.
    pub fn fallback_reply(&mut self, input: &str) {
        let reply = self.eliza.respond(input);
        self.push_bot(reply);
    }
}

/// Last-resort grammar if the embedded script is unloadable.
fn minimal_script() -> telcome_eliza::Script {
    telcome_eliza::Script {
        version: "0".to_string(),
        initial: "How can I help you today?".to_string(),
        quit_phrases: vec!["bye".to_string()],
        quit_responses: vec!["Goodbye.".to_string()],
        empty_prompts: vec!["Please tell me what you need help with.".to_string()],
        repeat_responses: vec!["You already said that.".to_string()],
        fallbacks: vec!["Please go on.".to_string()],
        reflections: Default::default(),
        synonyms: Default::default(),
        keywords: Vec::new(),
    }
}
