//! Search results and paper details

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{lenient_string, null_as_default};

/// Summary shown when a paper carries neither abstract nor body text
pub const NO_ABSTRACT: &str = "No abstract available.";

/// Characters of summary used for a result preview when no preview is supplied
pub const PREVIEW_CHARS: usize = 150;

/// `POST /search` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub k: usize,
}

/// `POST /search` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchHit>,

    /// Server-side latency in milliseconds
    #[serde(default)]
    pub took_ms: f64,

    /// Retrieval method reported by the backend
    #[serde(default)]
    pub method: String,
}

/// Author list; the backend sends either a list or a preformatted string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    List(Vec<String>),
    Single(String),
}

impl Default for Authors {
    fn default() -> Self {
        Authors::List(Vec::new())
    }
}

impl fmt::Display for Authors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authors::List(names) => f.write_str(&names.join(", ")),
            Authors::Single(names) => f.write_str(names),
        }
    }
}

/// One search result card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub score: f64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Authors,

    #[serde(default, deserialize_with = "lenient_string")]
    pub published: Option<String>,

    #[serde(default)]
    pub text_preview: Option<String>,

    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,

    #[serde(default)]
    pub text: Option<String>,
}

impl SearchHit {
    /// Preview line for the result card
    pub fn preview(&self) -> String {
        match self.text_preview.as_deref().filter(|p| !p.is_empty()) {
            Some(preview) => preview.to_string(),
            None => {
                let summary = summary_of(self.abstract_text.as_deref(), self.text.as_deref());
                summary.chars().take(PREVIEW_CHARS).collect()
            }
        }
    }

    /// Match score as a percentage
    pub fn match_percent(&self) -> f64 {
        self.score * 100.0
    }
}

/// `GET /article/{id}` response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperDetail {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Authors,

    #[serde(default, deserialize_with = "lenient_string")]
    pub published: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub arxiv_id: Option<String>,
}

impl PaperDetail {
    /// Abstract, falling back to body text
    pub fn summary(&self) -> &str {
        summary_of(self.abstract_text.as_deref(), self.text.as_deref())
    }

    /// Link to the PDF when the paper has an arXiv id
    pub fn pdf_url(&self) -> Option<String> {
        self.arxiv_id
            .as_deref()
            .map(|id| format!("https://arxiv.org/pdf/{}", id))
    }
}

fn summary_of<'a>(abstract_text: Option<&'a str>, text: Option<&'a str>) -> &'a str {
    abstract_text
        .filter(|s| !s.is_empty())
        .or(text.filter(|s| !s.is_empty()))
        .unwrap_or(NO_ABSTRACT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authors_either_shape() {
        let detail: PaperDetail = serde_json::from_str(
            r#"{"id": "1", "title": "T", "authors": ["Ada", "Grace"], "published": 2020}"#,
        )
        .unwrap();
        assert_eq!(detail.authors.to_string(), "Ada, Grace");
        assert_eq!(detail.published.as_deref(), Some("2020"));

        let detail: PaperDetail =
            serde_json::from_str(r#"{"id": "2", "authors": "Ada and Grace"}"#).unwrap();
        assert_eq!(detail.authors.to_string(), "Ada and Grace");
    }

    #[test]
    fn test_summary_fallbacks() {
        let mut detail: PaperDetail = serde_json::from_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(detail.summary(), NO_ABSTRACT);

        detail.text = Some("Body".into());
        assert_eq!(detail.summary(), "Body");

        detail.abstract_text = Some("Abstract".into());
        assert_eq!(detail.summary(), "Abstract");
    }

    #[test]
    fn test_preview_truncates_summary() {
        let hit: SearchHit = serde_json::from_value(serde_json::json!({
            "id": "x",
            "abstract": "é".repeat(400),
        }))
        .unwrap();
        assert_eq!(hit.preview().chars().count(), PREVIEW_CHARS);

        let hit: SearchHit = serde_json::from_value(serde_json::json!({
            "id": "y",
            "text_preview": "short",
            "score": 0.873,
        }))
        .unwrap();
        assert_eq!(hit.preview(), "short");
        assert!((hit.match_percent() - 87.3).abs() < 1e-9);
    }
}
