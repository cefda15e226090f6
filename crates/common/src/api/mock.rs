//! In-memory backend for tests

use super::{ChunkStream, PaperApi};
use crate::errors::{AppError, Result};
use crate::models::{ChatRequest, GraphPayload, PaperDetail, SearchResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::channel::mpsc;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

/// Scripted behaviour of one `open_chat` call
pub enum ChatScript {
    /// Deliver these chunks, then end the stream
    Chunks(Vec<Bytes>),
    /// Deliver these chunks, then fail mid-stream
    FailAfter(Vec<Bytes>, String),
    /// Reject the request before any byte is sent
    Reject(u16),
    /// Chunks are pushed by the test through the paired sender
    Live(mpsc::UnboundedReceiver<Result<Bytes>>),
}

/// Mock backend with scripted responses
#[derive(Default)]
pub struct MockPaperApi {
    papers: HashMap<String, PaperDetail>,
    graphs: HashMap<String, std::result::Result<GraphPayload, u16>>,
    search: Option<SearchResponse>,
    chats: Mutex<VecDeque<ChatScript>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    graph_requests: Mutex<Vec<(String, Option<u32>)>>,
}

impl MockPaperApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a paper detail record
    pub fn with_paper(mut self, paper: PaperDetail) -> Self {
        self.papers.insert(paper.id.clone(), paper);
        self
    }

    /// Register the graph payload returned for a paper
    pub fn with_graph(mut self, paper_id: &str, payload: GraphPayload) -> Self {
        self.graphs.insert(paper_id.to_string(), Ok(payload));
        self
    }

    /// Make the graph endpoint fail for a paper
    pub fn with_graph_failure(mut self, paper_id: &str, status: u16) -> Self {
        self.graphs.insert(paper_id.to_string(), Err(status));
        self
    }

    /// Set the response returned for every search
    pub fn with_search(mut self, response: SearchResponse) -> Self {
        self.search = Some(response);
        self
    }

    /// Queue the behaviour of the next `open_chat` call
    pub fn with_chat(mut self, script: ChatScript) -> Self {
        self.chats.get_mut().push_back(script);
        self
    }

    /// Queue a chat reply that delivers the given text chunks
    pub fn with_chat_chunks<I, S>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let chunks = chunks.into_iter().map(|c| Bytes::from(c.into())).collect();
        self.with_chat(ChatScript::Chunks(chunks))
    }

    /// Queue a chat reply driven chunk by chunk through the returned sender
    pub fn with_live_chat(self) -> (Self, mpsc::UnboundedSender<Result<Bytes>>) {
        let (tx, rx) = mpsc::unbounded();
        (self.with_chat(ChatScript::Live(rx)), tx)
    }

    /// Chat requests received so far
    pub async fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().await.clone()
    }

    /// Graph requests received so far
    pub async fn graph_requests(&self) -> Vec<(String, Option<u32>)> {
        self.graph_requests.lock().await.clone()
    }
}

#[async_trait]
impl PaperApi for MockPaperApi {
    async fn search(&self, _query: &str, k: usize) -> Result<SearchResponse> {
        let mut response = self.search.clone().unwrap_or_default();
        response.results.truncate(k);
        Ok(response)
    }

    async fn fetch_paper(&self, paper_id: &str) -> Result<PaperDetail> {
        self.papers
            .get(paper_id)
            .cloned()
            .ok_or_else(|| AppError::PaperNotFound {
                id: paper_id.to_string(),
            })
    }

    async fn fetch_graph(&self, paper_id: &str, depth: Option<u32>) -> Result<GraphPayload> {
        self.graph_requests
            .lock()
            .await
            .push((paper_id.to_string(), depth));

        match self.graphs.get(paper_id) {
            Some(Ok(payload)) => Ok(payload.clone()),
            Some(Err(status)) => Err(AppError::UpstreamStatus {
                status: *status,
                body: "graph unavailable".to_string(),
            }),
            None => Ok(GraphPayload::default()),
        }
    }

    async fn open_chat(&self, request: &ChatRequest) -> Result<ChunkStream> {
        self.chat_requests.lock().await.push(request.clone());

        let script = self.chats.lock().await.pop_front();
        match script {
            None => Ok(stream::empty().boxed()),
            Some(ChatScript::Chunks(chunks)) => Ok(stream::iter(chunks.into_iter().map(Ok)).boxed()),
            Some(ChatScript::FailAfter(chunks, message)) => {
                let failure = AppError::StreamInterrupted { message };
                Ok(stream::iter(chunks.into_iter().map(Ok))
                    .chain(stream::once(async move { Err(failure) }))
                    .boxed())
            }
            Some(ChatScript::Reject(status)) => Err(AppError::UpstreamStatus {
                status,
                body: "chat unavailable".to_string(),
            }),
            Some(ChatScript::Live(rx)) => Ok(rx.boxed()),
        }
    }
}
