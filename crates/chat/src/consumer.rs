//! Streaming chat reply consumer
//!
//! Reads the chat body chunk by chunk, decodes it as one continuous UTF-8
//! stream, and after every chunk replaces the transcript's trailing ai
//! message with everything received so far.
//!
//! State machine:
//! `Idle -> Requesting -> Streaming -> Done`, with `Failed` reachable from
//! `Requesting`/`Streaming` on transport errors and `Cancelled` once the
//! reply's ticket has been revoked.

use bytes::Bytes;
use citescope_common::api::PaperApi;
use citescope_common::errors::{AppError, Result};
use citescope_common::metrics;
use citescope_common::models::ChatRequest;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

use crate::decoder::Utf8StreamDecoder;
use crate::transcript::{ReplyTicket, SharedTranscript};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamState {
    Idle,
    Requesting,
    Streaming,
    Done,
    Failed,
    Cancelled,
}

impl StreamState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamState::Done | StreamState::Failed | StreamState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StreamState::Idle => "idle",
            StreamState::Requesting => "requesting",
            StreamState::Streaming => "streaming",
            StreamState::Done => "done",
            StreamState::Failed => "failed",
            StreamState::Cancelled => "cancelled",
        }
    }
}

/// Notification for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatUpdate {
    /// Newly decoded text appended to the reply
    Delta { generation: u64, text: String },
    /// The reply reached a terminal state
    Finished { generation: u64, state: StreamState },
}

/// Result of feeding one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStep {
    /// Transcript updated
    Applied,
    /// Only part of a character arrived; nothing to show yet
    Pending,
    /// The ticket was revoked; stop reading
    Stale,
    /// Consumer already finished; chunk ignored
    Closed,
}

/// How a reply ended
#[derive(Debug)]
pub struct StreamOutcome {
    pub state: StreamState,
    pub chunks: usize,
    pub text: String,
    pub error: Option<AppError>,
}

pub struct ChatStreamConsumer {
    transcript: SharedTranscript,
    ticket: ReplyTicket,
    state: StreamState,
    decoder: Utf8StreamDecoder,
    accumulated: String,
    chunks: usize,
    updates: Option<UnboundedSender<ChatUpdate>>,
}

impl ChatStreamConsumer {
    /// Consumer for the reply identified by `ticket`
    pub fn new(transcript: SharedTranscript, ticket: ReplyTicket) -> Self {
        Self {
            transcript,
            ticket,
            state: StreamState::Idle,
            decoder: Utf8StreamDecoder::new(),
            accumulated: String::new(),
            chunks: 0,
            updates: None,
        }
    }

    /// Also report progress on a channel
    pub fn with_updates(mut self, updates: UnboundedSender<ChatUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Text received so far
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    pub fn generation(&self) -> u64 {
        self.ticket.generation()
    }

    /// Open the chat request and consume the reply to the end
    pub async fn run(mut self, api: &dyn PaperApi, request: &ChatRequest) -> StreamOutcome {
        self.state = StreamState::Requesting;
        info!(
            paper_id = %request.paper_id,
            generation = self.generation(),
            "Opening chat stream"
        );

        match api.open_chat(request).await {
            Ok(stream) => self.consume(stream).await,
            Err(e) => self.fail(e).await,
        }
    }

    /// Consume an already-open chunk stream, strictly in arrival order
    pub async fn consume<S>(mut self, mut chunks: S) -> StreamOutcome
    where
        S: Stream<Item = Result<Bytes>> + Unpin,
    {
        if !self.state.is_terminal() {
            self.state = StreamState::Streaming;
        }

        while let Some(item) = chunks.next().await {
            match item {
                Ok(bytes) => match self.on_chunk(&bytes).await {
                    ChunkStep::Stale => return self.cancelled(),
                    ChunkStep::Closed => break,
                    ChunkStep::Applied | ChunkStep::Pending => {}
                },
                Err(e) => return self.fail(e).await,
            }
        }

        self.complete().await
    }

    /// Feed one chunk; the transcript reflects it before this returns
    pub async fn on_chunk(&mut self, bytes: &[u8]) -> ChunkStep {
        if self.state.is_terminal() {
            return ChunkStep::Closed;
        }
        self.state = StreamState::Streaming;
        self.chunks += 1;
        metrics::record_chat_chunk(bytes.len());

        let text = self.decoder.decode(bytes);
        if text.is_empty() {
            return ChunkStep::Pending;
        }
        self.push_text(text).await
    }

    /// End of stream: flush the decoder and freeze the message
    pub async fn complete(mut self) -> StreamOutcome {
        if self.state.is_terminal() {
            return self.outcome(None);
        }

        let tail = self.decoder.finish();
        if !tail.is_empty() && self.push_text(tail).await == ChunkStep::Stale {
            return self.cancelled();
        }

        self.transcript.write().await.finish_reply(self.ticket);
        self.state = StreamState::Done;

        if self.chunks == 0 {
            warn!(generation = self.generation(), "Chat stream ended without any data");
        }
        info!(
            generation = self.generation(),
            chunks = self.chunks,
            chars = self.accumulated.chars().count(),
            "Chat stream complete"
        );
        self.finish_with(None)
    }

    async fn push_text(&mut self, text: String) -> ChunkStep {
        self.accumulated.push_str(&text);

        let applied = self
            .transcript
            .write()
            .await
            .apply_partial(self.ticket, &self.accumulated);
        if !applied {
            return ChunkStep::Stale;
        }

        self.notify(ChatUpdate::Delta {
            generation: self.generation(),
            text,
        });
        ChunkStep::Applied
    }

    async fn fail(mut self, e: AppError) -> StreamOutcome {
        // Partial text stays in the transcript
        self.transcript.write().await.finish_reply(self.ticket);
        self.state = StreamState::Failed;

        error!(
            generation = self.generation(),
            chunks = self.chunks,
            error = %e,
            code = ?e.code(),
            transient = e.is_transient(),
            "Chat stream failed"
        );
        self.finish_with(Some(e))
    }

    fn cancelled(mut self) -> StreamOutcome {
        self.state = StreamState::Cancelled;
        info!(
            generation = self.generation(),
            chunks = self.chunks,
            "Chat stream superseded, discarding remaining chunks"
        );
        self.finish_with(None)
    }

    fn finish_with(self, error: Option<AppError>) -> StreamOutcome {
        metrics::record_chat_stream(self.state.as_str());
        self.notify(ChatUpdate::Finished {
            generation: self.generation(),
            state: self.state,
        });
        self.outcome(error)
    }

    fn notify(&self, update: ChatUpdate) {
        if let Some(updates) = &self.updates {
            // The receiver going away only means nobody is watching
            let _ = updates.send(update);
        }
    }

    fn outcome(self, error: Option<AppError>) -> StreamOutcome {
        StreamOutcome {
            state: self.state,
            chunks: self.chunks,
            text: self.accumulated,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{ChatMessage, Role, Transcript};
    use citescope_common::api::{ChatScript, MockPaperApi};
    use futures::stream;
    use tokio::sync::mpsc;

    async fn last_text(transcript: &SharedTranscript) -> String {
        transcript.read().await.last().map(|m| m.text.clone()).unwrap_or_default()
    }

    fn chunk_stream(chunks: &[&[u8]]) -> impl Stream<Item = Result<Bytes>> + Unpin {
        let items: Vec<Result<Bytes>> = chunks.iter().map(|c| Ok(Bytes::copy_from_slice(c))).collect();
        stream::iter(items)
    }

    #[tokio::test]
    async fn test_accumulates_after_every_chunk() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("greet me", "...");
        let mut consumer = ChatStreamConsumer::new(transcript.clone(), ticket);

        let mut observed = Vec::new();
        for chunk in ["Hel", "lo, ", "world"] {
            assert_eq!(consumer.on_chunk(chunk.as_bytes()).await, ChunkStep::Applied);
            observed.push(last_text(&transcript).await);
        }
        assert_eq!(observed, ["Hel", "Hello, ", "Hello, world"]);

        let outcome = consumer.complete().await;
        assert_eq!(outcome.state, StreamState::Done);
        assert_eq!(outcome.text, "Hello, world");

        let t = transcript.read().await;
        assert_eq!(t.len(), 2);
        assert_eq!(t.last(), Some(&ChatMessage::ai("Hello, world")));
        assert!(!t.reply_in_flight());
    }

    #[tokio::test]
    async fn test_placeholder_before_first_chunk() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("hi", "...");
        let consumer = ChatStreamConsumer::new(transcript.clone(), ticket);

        assert_eq!(consumer.state(), StreamState::Idle);
        let t = transcript.read().await;
        assert_eq!(t.last().map(|m| m.role), Some(Role::Ai));
        assert_eq!(t.messages()[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_multibyte_split_across_chunks() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("q", "...");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let consumer = ChatStreamConsumer::new(transcript.clone(), ticket).with_updates(tx);

        // "héllo" with é split across chunks
        let outcome = consumer
            .consume(chunk_stream(&[b"h\xC3", b"\xA9llo"]))
            .await;

        assert_eq!(outcome.state, StreamState::Done);
        assert_eq!(outcome.chunks, 2);
        assert_eq!(last_text(&transcript).await, "héllo");

        assert_eq!(rx.recv().await, Some(ChatUpdate::Delta { generation: ticket.generation(), text: "h".into() }));
        assert_eq!(rx.recv().await, Some(ChatUpdate::Delta { generation: ticket.generation(), text: "éllo".into() }));
        assert_eq!(
            rx.recv().await,
            Some(ChatUpdate::Finished { generation: ticket.generation(), state: StreamState::Done })
        );
    }

    #[tokio::test]
    async fn test_mid_stream_failure_keeps_partial_text() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("q", "...");
        let api = MockPaperApi::new().with_chat(ChatScript::FailAfter(
            vec![Bytes::from_static(b"Partial ")],
            "connection reset".into(),
        ));

        let request = ChatRequest::new("p1", "q").unwrap();
        let outcome = ChatStreamConsumer::new(transcript.clone(), ticket)
            .run(&api, &request)
            .await;

        assert_eq!(outcome.state, StreamState::Failed);
        assert!(matches!(outcome.error, Some(AppError::StreamInterrupted { .. })));
        assert_eq!(last_text(&transcript).await, "Partial ");
        assert!(!transcript.read().await.reply_in_flight());
    }

    #[tokio::test]
    async fn test_request_failure_leaves_placeholder() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("q", "...");
        let api = MockPaperApi::new().with_chat(ChatScript::Reject(500));

        let request = ChatRequest::new("p1", "q").unwrap();
        let outcome = ChatStreamConsumer::new(transcript.clone(), ticket)
            .run(&api, &request)
            .await;

        assert_eq!(outcome.state, StreamState::Failed);
        assert_eq!(outcome.chunks, 0);
        assert_eq!(last_text(&transcript).await, "...");
    }

    #[tokio::test]
    async fn test_stale_generation_discards_chunks() {
        let transcript = Transcript::new().shared();
        let stale = transcript.write().await.record_user_turn("first", "...");
        let mut consumer = ChatStreamConsumer::new(transcript.clone(), stale);
        assert_eq!(consumer.on_chunk(b"old ").await, ChunkStep::Applied);

        // User moves on before the first reply finishes
        let current = transcript.write().await.record_user_turn("second", "...");
        assert_eq!(consumer.on_chunk(b"late").await, ChunkStep::Stale);

        let t = transcript.read().await;
        assert_eq!(t.messages()[1].text, "old ");
        assert_eq!(t.last().unwrap().text, "...");
        assert!(t.is_current(current));
    }

    #[tokio::test]
    async fn test_consume_stops_when_superseded() {
        let transcript = Transcript::new().shared();
        let stale = transcript.write().await.record_user_turn("first", "...");
        transcript.write().await.reset(Some("System ready.".into()));

        let outcome = ChatStreamConsumer::new(transcript.clone(), stale)
            .consume(chunk_stream(&[b"never shown", b"nor this"]))
            .await;

        assert_eq!(outcome.state, StreamState::Cancelled);
        assert_eq!(outcome.chunks, 1);
        assert_eq!(last_text(&transcript).await, "System ready.");
    }

    #[tokio::test]
    async fn test_no_mutation_after_done() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("q", "...");
        let outcome = ChatStreamConsumer::new(transcript.clone(), ticket)
            .consume(chunk_stream(&[b"final"]))
            .await;
        assert_eq!(outcome.state, StreamState::Done);

        assert!(!transcript.write().await.apply_partial(ticket, "sneaky"));
        assert_eq!(last_text(&transcript).await, "final");
    }

    #[test]
    fn test_suspends_until_next_chunk() {
        let transcript = Transcript::new().shared();
        let ticket = tokio_test::block_on(async {
            transcript.write().await.record_user_turn("q", "...")
        });
        let (tx, rx) = futures::channel::mpsc::unbounded::<Result<Bytes>>();

        let mut task = tokio_test::task::spawn(
            ChatStreamConsumer::new(transcript.clone(), ticket).consume(rx),
        );
        tokio_test::assert_pending!(task.poll());
        assert_eq!(tokio_test::block_on(last_text(&transcript)), "...");

        tx.unbounded_send(Ok(Bytes::from_static(b"Hi"))).unwrap();
        assert!(task.is_woken());
        tokio_test::assert_pending!(task.poll());
        assert_eq!(tokio_test::block_on(last_text(&transcript)), "Hi");

        drop(tx);
        let outcome = tokio_test::assert_ready!(task.poll());
        assert_eq!(outcome.state, StreamState::Done);
    }

    #[tokio::test]
    async fn test_live_stream_is_sequential() {
        let transcript = Transcript::new().shared();
        let ticket = transcript.write().await.record_user_turn("q", "...");
        let (api, tx) = MockPaperApi::new().with_live_chat();
        let request = ChatRequest::new("p1", "q").unwrap();

        let handle = tokio::spawn({
            let transcript = transcript.clone();
            async move { ChatStreamConsumer::new(transcript, ticket).run(&api, &request).await }
        });

        for part in ["one ", "two ", "three"] {
            tx.unbounded_send(Ok(Bytes::from(part))).unwrap();
        }
        drop(tx);

        let outcome = handle.await.unwrap();
        assert_eq!(outcome.state, StreamState::Done);
        assert_eq!(outcome.text, "one two three");
        assert_eq!(last_text(&transcript).await, "one two three");
    }
}
