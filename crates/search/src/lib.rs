//! Video search proxy: forwards a query to the external search provider and
//! normalizes the top results into a fixed shape.
//!
//! The provider is a black box behind [`SearchProvider`]; the rest of the
//! system only ever sees [`SearchHit`] records with a guaranteed non-empty
//! thumbnail.

pub mod youtube;

use async_trait::async_trait;
use thiserror::Error;

pub use youtube::YoutubeSearch;

/// A single normalized search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Video title.
    pub title: String,
    /// Canonical watch URL.
    pub link: String,
    /// Thumbnail URL; a placeholder is substituted when the provider omits
    /// one, so this is never empty.
    pub thumbnail: String,
}

/// Errors that can occur while proxying a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was empty or whitespace; rejected before any external call.
    #[error("empty search query")]
    EmptyQuery,

    /// The provider call failed or returned a payload we could not read.
    #[error("search provider unavailable: {0}")]
    Unavailable(String),
}

/// The search black box: query in, ranked normalized hits out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, returning at most `limit` hits.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError>;
}
