use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSnapshot;

/// Request body for `POST /download-audio`.
///
/// The field is optional so a missing key produces the API's own 400
/// message rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    /// Source video URL.
    #[serde(default)]
    pub url: Option<String>,
}

/// Response body for a successful `POST /download-audio`.
#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    /// Human-readable status message.
    pub message: String,
    /// File token to pass to `GET /files/{token}`.
    pub file: String,
    /// Size of the converted file in bytes.
    pub size: u64,
    /// Title reported by the source.
    pub title: String,
}

/// Request body for `POST /search`.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    /// Free-text search query.
    #[serde(default)]
    pub query_user: Option<String>,
}

/// Response body for `POST /search`: each entry is a
/// `[title, link, thumbnail]` triple.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub output: Vec<(String, String, String)>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub metrics: MetricsSnapshot,
}
