use axum::extract::State;
use axum::Json;

use super::schemas::{DownloadRequest, DownloadResponse};
use super::AppState;
use crate::error::ServerError;

/// `POST /download-audio`: probe the URL, extract its audio track and
/// register the converted file for a single download.
pub async fn download_audio(
    State(state): State<AppState>,
    Json(req): Json<DownloadRequest>,
) -> Result<Json<DownloadResponse>, ServerError> {
    let url = req
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ServerError::InvalidInput("No URL provided".to_owned()))?;

    if !state.source_pattern.matches(url) {
        return Err(ServerError::InvalidInput(
            "Invalid source URL provided".to_owned(),
        ));
    }

    tracing::info!(url, "starting audio extraction");

    let extraction = match state.extractor.extract(url, &state.output_dir).await {
        Ok(extraction) => extraction,
        Err(e) => {
            state.metrics.increment_downloads_failed();
            return Err(e.into());
        }
    };

    let token = state.store.register(
        extraction.file_path.clone(),
        extraction.title.clone(),
        extraction.format.content_type(),
    );
    state.metrics.increment_downloads_completed();

    tracing::info!(
        token = %token,
        size = extraction.size_bytes,
        "audio extraction complete"
    );

    Ok(Json(DownloadResponse {
        message: "Audio converted and saved".to_owned(),
        file: token,
        size: extraction.size_bytes,
        title: extraction.title,
    }))
}
