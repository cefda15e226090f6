//! Graph session orchestrator
//!
//! Owns the currently selected paper. Selecting a paper fetches its detail
//! and citation neighbourhood and runs the graph pipeline once the fetch has
//! completed; chat replies run as separate tasks keyed by transcript
//! generation, so switching papers never lets an old reply touch the new
//! transcript.

use citescope_chat::{ChatStreamConsumer, ChatUpdate, ReplyTicket, SharedTranscript, StreamOutcome, Transcript};
use citescope_common::{
    api::PaperApi,
    config::AppConfig,
    errors::{AppError, Result},
    metrics::{self, GraphLoadMetrics},
    models::{ChatRequest, PaperDetail, SearchResponse},
};
use citescope_graph::{GraphPipeline, RenderGraph};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::events::UiEvent;

/// What the front end should do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct GraphSession {
    api: Arc<dyn PaperApi>,
    config: Arc<AppConfig>,
    pipeline: GraphPipeline,

    focal_id: Option<String>,
    paper: Option<PaperDetail>,
    graph: RenderGraph,
    loading_graph: bool,
    search: Option<SearchResponse>,

    transcript: SharedTranscript,
    chat_task: Option<JoinHandle<StreamOutcome>>,
    updates: UnboundedSender<ChatUpdate>,
}

impl GraphSession {
    /// Create a session; the receiver yields live chat updates for the view
    pub fn new(api: Arc<dyn PaperApi>, config: Arc<AppConfig>) -> (Self, UnboundedReceiver<ChatUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let pipeline = GraphPipeline::new(config.layout, config.render.clone());

        let session = Self {
            api,
            config,
            pipeline,
            focal_id: None,
            paper: None,
            graph: RenderGraph::default(),
            loading_graph: false,
            search: None,
            transcript: Transcript::new().shared(),
            chat_task: None,
            updates,
        };
        (session, rx)
    }

    /// Deliver one UI event
    pub async fn handle(&mut self, event: UiEvent) -> Result<Flow> {
        match event {
            UiEvent::Search(query) => self.search(&query).await?,
            UiEvent::OpenPaper(id) => self.open_paper(&id).await?,
            UiEvent::NodeClicked(id) => self.click_node(&id).await?,
            UiEvent::SendMessage(text) => {
                self.send_message(&text).await?;
            }
            UiEvent::CancelChat => self.cancel_chat().await,
            UiEvent::ShowGraph | UiEvent::ShowTranscript | UiEvent::Help => {}
            UiEvent::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    pub fn focal_id(&self) -> Option<&str> {
        self.focal_id.as_deref()
    }

    pub fn paper(&self) -> Option<&PaperDetail> {
        self.paper.as_ref()
    }

    pub fn render_graph(&self) -> &RenderGraph {
        &self.graph
    }

    pub fn is_loading_graph(&self) -> bool {
        self.loading_graph
    }

    pub fn search_results(&self) -> Option<&SearchResponse> {
        self.search.as_ref()
    }

    pub fn transcript(&self) -> SharedTranscript {
        self.transcript.clone()
    }

    /// Run a search and keep the results
    pub async fn search(&mut self, query: &str) -> Result<()> {
        let start = Instant::now();
        let result = self.api.search(query, self.config.api.search_k).await;
        metrics::record_search(start.elapsed().as_secs_f64(), result.is_ok());

        let response = result.map_err(|e| {
            error!(query, error = %e, "Search failed");
            e
        })?;

        info!(query, results = response.results.len(), took_ms = response.took_ms, "Search completed");
        self.search = Some(response);
        Ok(())
    }

    /// Select a paper: fetch its detail, restart the conversation, load its graph
    pub async fn open_paper(&mut self, paper_id: &str) -> Result<()> {
        let paper = self.api.fetch_paper(paper_id).await.map_err(|e| {
            error!(paper_id, error = %e, "Failed to open paper");
            e
        })?;

        self.abort_chat_task();
        self.transcript
            .write()
            .await
            .reset(Some(self.config.chat.greeting_for(&paper.title)));

        info!(paper_id, title = %paper.title, "Paper opened");
        self.focal_id = Some(paper.id.clone());
        self.paper = Some(paper);

        self.load_graph().await;
        Ok(())
    }

    /// Navigate to a paper shown in the graph
    pub async fn click_node(&mut self, node_id: &str) -> Result<()> {
        if self.graph.node(node_id).is_none() {
            return Err(AppError::Validation {
                message: format!("paper {} is not in the current graph", node_id),
                field: Some("node".to_string()),
            });
        }
        if self.focal_id.as_deref() == Some(node_id) {
            return Ok(());
        }
        self.open_paper(node_id).await
    }

    /// Fetch and lay out the neighbourhood of the focal paper.
    ///
    /// Failures leave an empty graph and a log entry.
    pub async fn load_graph(&mut self) {
        let Some(focal_id) = self.focal_id.clone() else {
            return;
        };

        self.loading_graph = true;
        self.graph = RenderGraph::default();
        let timer = GraphLoadMetrics::start();

        match self.api.fetch_graph(&focal_id, self.config.api.graph_depth).await {
            Ok(payload) => {
                let output = self.pipeline.run(payload, &focal_id);
                timer.finish(output.duplicates_dropped);
                info!(
                    paper_id = %focal_id,
                    nodes = output.graph.nodes.len(),
                    edges = output.graph.edges.len(),
                    duplicates_dropped = output.duplicates_dropped,
                    "Citation graph loaded"
                );
                self.graph = output.graph;
            }
            Err(e) => {
                timer.fail();
                error!(paper_id = %focal_id, error = %e, transient = e.is_transient(), "Failed to load graph");
            }
        }

        self.loading_graph = false;
    }

    /// Record the user's message, show the placeholder, and start streaming the reply
    pub async fn send_message(&mut self, text: &str) -> Result<ReplyTicket> {
        let Some(paper_id) = self.focal_id.clone() else {
            return Err(AppError::Validation {
                message: "open a paper before chatting".to_string(),
                field: Some("paper_id".to_string()),
            });
        };

        let max = self.config.chat.max_message_chars;
        if text.chars().count() as u64 > max {
            return Err(AppError::Validation {
                message: format!("message longer than {} characters", max),
                field: Some("message".to_string()),
            });
        }
        let request = ChatRequest::new(paper_id, text)?;

        self.abort_chat_task();
        let ticket = self
            .transcript
            .write()
            .await
            .record_user_turn(&request.message, &self.config.chat.placeholder);

        let consumer = ChatStreamConsumer::new(self.transcript.clone(), ticket)
            .with_updates(self.updates.clone());
        let api = self.api.clone();

        self.chat_task = Some(tokio::spawn(async move {
            consumer.run(api.as_ref(), &request).await
        }));
        Ok(ticket)
    }

    /// Abandon the in-flight reply, keeping whatever text it produced
    pub async fn cancel_chat(&mut self) {
        if self.abort_chat_task() {
            self.transcript.write().await.invalidate();
            info!("Chat reply cancelled");
        }
    }

    /// Wait for the current reply task to end
    pub async fn wait_for_reply(&mut self) -> Option<StreamOutcome> {
        let handle = self.chat_task.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Chat task did not complete");
                None
            }
        }
    }

    /// Abort the running reply task, if any; true when one was still running
    fn abort_chat_task(&mut self) -> bool {
        match self.chat_task.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }
}

impl Drop for GraphSession {
    fn drop(&mut self) {
        self.abort_chat_task();
    }
}
