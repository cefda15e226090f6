//! Citescope Chat
//!
//! Conversation state for the paper assistant:
//! - `transcript`: ordered messages with generation-keyed reply tickets
//! - `decoder`: UTF-8 decoding across arbitrary chunk boundaries
//! - `consumer`: turns a streamed reply into live transcript updates

pub mod consumer;
pub mod decoder;
pub mod transcript;

pub use consumer::{ChatStreamConsumer, ChatUpdate, ChunkStep, StreamOutcome, StreamState};
pub use decoder::Utf8StreamDecoder;
pub use transcript::{ChatMessage, ReplyTicket, Role, SharedTranscript, Transcript};
