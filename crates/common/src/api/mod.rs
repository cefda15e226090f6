//! Backend API abstraction
//!
//! Provides a unified interface over the paper backend:
//! - Search (`POST /search`)
//! - Paper detail (`GET /article/{id}`)
//! - Citation neighbourhood (`GET /graph/{id}`)
//! - Streaming chat (`POST /chat`)

mod mock;

pub use mock::{ChatScript, MockPaperApi};

use crate::config::ApiConfig;
use crate::errors::{AppError, Result};
use crate::models::{ChatRequest, GraphPayload, PaperDetail, SearchRequest, SearchResponse};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use std::time::Duration;

/// Raw body of a chat reply, chunked however the transport delivers it
pub type ChunkStream = BoxStream<'static, Result<Bytes>>;

/// Trait for the backend operations the client consumes
#[async_trait]
pub trait PaperApi: Send + Sync {
    /// Run a semantic search
    async fn search(&self, query: &str, k: usize) -> Result<SearchResponse>;

    /// Fetch the detail record for one paper
    async fn fetch_paper(&self, paper_id: &str) -> Result<PaperDetail>;

    /// Fetch the citation neighbourhood around a paper
    async fn fetch_graph(&self, paper_id: &str, depth: Option<u32>) -> Result<GraphPayload>;

    /// Open a chat reply stream about a paper
    async fn open_chat(&self, request: &ChatRequest) -> Result<ChunkStream>;
}

/// reqwest-backed client for the paper backend
pub struct HttpPaperApi {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpPaperApi {
    /// Create a new client for the configured base URL
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);

        // No whole-request timeout on the client: chat bodies stream for as
        // long as the model keeps generating.
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn graph_url(&self, paper_id: &str, depth: Option<u32>) -> String {
        match depth {
            Some(depth) => format!("{}/graph/{}?depth={}", self.base_url, paper_id, depth),
            None => format!("{}/graph/{}", self.base_url, paper_id),
        }
    }

    async fn check(response: reqwest::Response, paper_id: Option<&str>) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::from_status(status, body, paper_id))
    }
}

#[async_trait]
impl PaperApi for HttpPaperApi {
    async fn search(&self, query: &str, k: usize) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        let request = SearchRequest {
            query: query.to_string(),
            k,
        };

        let response = self.client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let response = Self::check(response, None).await?;
        Ok(response.json().await?)
    }

    async fn fetch_paper(&self, paper_id: &str) -> Result<PaperDetail> {
        let url = format!("{}/article/{}", self.base_url, paper_id);

        let response = self.client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::check(response, Some(paper_id)).await?;
        Ok(response.json().await?)
    }

    async fn fetch_graph(&self, paper_id: &str, depth: Option<u32>) -> Result<GraphPayload> {
        let url = self.graph_url(paper_id, depth);

        let response = self.client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await?;

        let response = Self::check(response, None).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn open_chat(&self, request: &ChatRequest) -> Result<ChunkStream> {
        let url = format!("{}/chat", self.base_url);

        let response = self.client
            .post(&url)
            .json(request)
            .send()
            .await?;

        let response = Self::check(response, Some(&request.paper_id)).await?;

        Ok(response
            .bytes_stream()
            .map(|chunk| {
                chunk.map_err(|e| AppError::StreamInterrupted {
                    message: e.to_string(),
                })
            })
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_url_depth() {
        let api = HttpPaperApi::new(&ApiConfig {
            base_url: "http://localhost:8000/".to_string(),
            ..ApiConfig::default()
        })
        .unwrap();

        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.graph_url("2401.1", Some(1)), "http://localhost:8000/graph/2401.1?depth=1");
        assert_eq!(api.graph_url("2401.1", None), "http://localhost:8000/graph/2401.1");
    }
}
