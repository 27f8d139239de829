use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use audiofetch_extract::ExtractError;
use audiofetch_search::SearchError;

/// Errors that can occur while handling an API request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body was missing a required field or carried a value
    /// the handler rejects.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The extraction pipeline failed.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The search proxy failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Search(SearchError::EmptyQuery) => (
                StatusCode::BAD_REQUEST,
                "No search query provided".to_owned(),
            ),
            Self::Extract(e) => {
                // Keep process-level detail out of the response body.
                tracing::error!(error = %e, "extraction failed");
                let message = match e {
                    ExtractError::SourceUnreachable(_) => "Failed to access the requested source.",
                    ExtractError::ConversionFailed(_) => "Audio conversion failed.",
                    ExtractError::FormatInvalid(_) => "Invalid audio file generated.",
                    ExtractError::Io(_) => "Error verifying audio file.",
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_owned())
            }
            Self::Search(SearchError::Unavailable(detail)) => {
                tracing::error!(error = %detail, "search failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Search is currently unavailable.".to_owned(),
                )
            }
        };

        let body = serde_json::json!({ "message": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let response = ServerError::InvalidInput("No URL provided".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_query_maps_to_bad_request() {
        let response = ServerError::Search(SearchError::EmptyQuery).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn extraction_failures_map_to_internal_error() {
        let response =
            ServerError::Extract(ExtractError::ConversionFailed("exit status 1".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn search_outage_maps_to_internal_error() {
        let response =
            ServerError::Search(SearchError::Unavailable("connect refused".to_owned()))
                .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
