//! `POST /chat` request body

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::Result;

/// Hard upper bound on `message`; the session also applies the configured limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1))]
    pub paper_id: String,

    #[validate(length(min = 1, max = 8000))]
    pub message: String,
}

impl ChatRequest {
    /// Build and validate a request, trimming the user's message
    pub fn new(paper_id: impl Into<String>, message: &str) -> Result<Self> {
        let request = Self {
            paper_id: paper_id.into(),
            message: message.trim().to_string(),
        };
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn test_rejects_blank_message() {
        let err = ChatRequest::new("p1", "   ").unwrap_err();
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "message"));
    }

    #[test]
    fn test_trims_message() {
        let req = ChatRequest::new("p1", "  what is new here?\n").unwrap();
        assert_eq!(req.message, "what is new here?");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"paper_id": "p1", "message": "what is new here?"})
        );
    }
}
