use serde::{Deserialize, Serialize};

/// Error body returned by the review backend on non-2xx responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Parses a response body. `Ok(None)` is a well-formed error body with no
    /// usable detail; `Err` is a body that is not an error body at all.
    pub fn detail_from_slice(body: &[u8]) -> serde_json::Result<Option<String>> {
        let parsed: ErrorBody = serde_json::from_slice(body)?;
        Ok(parsed
            .detail
            .map(|detail| detail.trim().to_string())
            .filter(|detail| !detail.is_empty()))
    }
}
