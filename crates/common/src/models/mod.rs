//! Wire models exchanged with the paper backend
//!
//! The backend is an external collaborator; these types only describe the
//! shape the client relies on and tolerate missing or loosely-typed fields.

mod chat;
mod graph;
mod paper;

pub use chat::ChatRequest;
pub use graph::{CitationEdge, GraphPayload, PaperNode};
pub use paper::{Authors, PaperDetail, SearchHit, SearchRequest, SearchResponse};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a string or a number and keep it as text (years, scores rendered as labels)
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
