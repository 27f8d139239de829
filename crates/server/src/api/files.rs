use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use audiofetch_store::ServeGuard;

use super::AppState;

/// `GET /files/{token}`: stream a converted file exactly once.
///
/// The claim flips the entry to serving before any bytes move, so a
/// concurrent second request sees a bare 404. The guard travels inside the
/// response body and deletes the file when the stream is dropped, whether
/// the transfer completed or the client went away.
pub async fn serve_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Response {
    let Some(guard) = state.store.claim(&token) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let file = match File::open(guard.path()).await {
        Ok(file) => file,
        Err(e) => {
            // Guard drop cleans up the registry entry.
            tracing::error!(token = %token, error = %e, "claimed file missing on disk");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let size = match file.metadata().await {
        Ok(meta) => Some(meta.len()),
        Err(_) => None,
    };

    let content_type = guard.content_type().to_owned();
    let disposition = attachment_header(&token);
    state.metrics.increment_files_served();

    let stream = GuardedStream {
        inner: ReaderStream::new(file),
        _guard: guard,
    };

    let mut response = Body::from_stream(stream).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::try_from(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    if let Some(size) = size {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    }
    response
}

fn attachment_header(file_name: &str) -> HeaderValue {
    HeaderValue::try_from(format!("attachment; filename=\"{file_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// File byte stream that owns the serve guard for its whole lifetime.
struct GuardedStream {
    inner: ReaderStream<File>,
    _guard: ServeGuard,
}

impl Stream for GuardedStream {
    type Item = Result<Bytes, std::io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
