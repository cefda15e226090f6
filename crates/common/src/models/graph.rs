//! Citation neighbourhood payload returned by `GET /graph/{id}`

use serde::{Deserialize, Serialize};

use super::{lenient_string, null_as_default};

/// A paper as reported by the graph endpoint.
///
/// `is_center` is kept only as a hint from the backend. Whether a node is
/// focal is decided by comparing `id` with the requested paper id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperNode {
    pub id: String,

    #[serde(default, alias = "title", skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, rename = "isCenter", skip_serializing_if = "Option::is_none")]
    pub is_center: Option<bool>,
}

impl PaperNode {
    /// Node with only an id, as produced for sparse payloads
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            year: None,
            category: None,
            is_center: None,
        }
    }

    /// Builder-style label setter
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display text, empty when the backend sent none
    pub fn label_text(&self) -> &str {
        self.label.as_deref().unwrap_or("")
    }
}

/// Directed citation `source -> target`.
///
/// Either endpoint may name a paper absent from the node list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CitationEdge {
    pub source: String,
    pub target: String,
}

impl CitationEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Raw graph response; absent or null arrays are empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<PaperNode>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub edges: Vec<CitationEdge>,
}
