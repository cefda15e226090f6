//! Chat transcript
//!
//! Append-only list of messages, except that the trailing ai message of an
//! in-flight reply is replaced as text streams in. Every reply is keyed by a
//! generation; only the holder of the current generation may mutate it.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transcript shared between the session and a running reply task
pub type SharedTranscript = Arc<RwLock<Transcript>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, text: text.into() }
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self { role: Role::Ai, text: text.into() }
    }
}

/// Right to mutate the trailing ai message of one reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    generation: u64,
}

impl ReplyTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default, Serialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    #[serde(skip)]
    generation: u64,
    #[serde(skip)]
    active: Option<u64>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared(self) -> SharedTranscript {
        Arc::new(RwLock::new(self))
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a reply currently holds the right to mutate
    pub fn reply_in_flight(&self) -> bool {
        self.active.is_some()
    }

    /// Start over for a newly opened paper, revoking any in-flight reply
    pub fn reset(&mut self, greeting: Option<String>) {
        self.invalidate();
        self.messages.clear();
        if let Some(greeting) = greeting {
            self.messages.push(ChatMessage::ai(greeting));
        }
    }

    /// Revoke the in-flight reply; its later chunks are discarded
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.active = None;
    }

    /// Record the user's message and the ai placeholder in one step.
    ///
    /// Any previous reply still streaming loses its ticket; its partial text
    /// stays where it is.
    pub fn record_user_turn(&mut self, message: &str, placeholder: &str) -> ReplyTicket {
        self.messages.push(ChatMessage::user(message));
        self.begin_reply(placeholder)
    }

    /// Append the ai placeholder and issue a fresh ticket for it
    pub fn begin_reply(&mut self, placeholder: &str) -> ReplyTicket {
        self.generation += 1;
        self.active = Some(self.generation);
        self.messages.push(ChatMessage::ai(placeholder));
        ReplyTicket { generation: self.generation }
    }

    pub fn is_current(&self, ticket: ReplyTicket) -> bool {
        self.active == Some(ticket.generation)
    }

    /// Replace the trailing ai message with `text`; false if the ticket is stale
    pub fn apply_partial(&mut self, ticket: ReplyTicket, text: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Ai => {
                last.text.clear();
                last.text.push_str(text);
                true
            }
            _ => false,
        }
    }

    /// Release the ticket; the message is frozen from here on
    pub fn finish_reply(&mut self, ticket: ReplyTicket) {
        if self.is_current(ticket) {
            self.active = None;
        }
    }
}
