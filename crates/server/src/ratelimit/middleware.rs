use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use super::config::RouteClass;
use super::limiter::{RateLimitResult, RateLimiter, ANONYMOUS_BUCKET};

/// Tower layer that adds rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitLayer {
    limiter: Option<Arc<RateLimiter>>,
}

impl RateLimitLayer {
    pub fn new(limiter: Option<Arc<RateLimiter>>) -> Self {
        Self { limiter }
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            limiter: self.limiter.clone(),
        }
    }
}

/// Tower service that enforces per-route rate limits.
#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    limiter: Option<Arc<RateLimiter>>,
}

impl<S> Service<Request<Body>> for RateLimitMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let limiter = self.limiter.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(limiter) = limiter else {
                // Rate limiting disabled: pass through.
                return inner.call(req).await;
            };

            // Preflight requests are never counted.
            if req.method() == Method::OPTIONS {
                return inner.call(req).await;
            }

            let class = RouteClass::for_path(req.uri().path());
            let client = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map_or_else(|| ANONYMOUS_BUCKET.to_owned(), |info| info.0.ip().to_string());

            match limiter.check(class, &client) {
                Ok(result) => {
                    let response = inner.call(req).await?;
                    Ok(add_rate_limit_headers(response, &result))
                }
                Err(exceeded) => {
                    tracing::warn!(
                        route = class.as_str(),
                        client = %client,
                        retry_after = exceeded.retry_after,
                        "rate limit exceeded"
                    );
                    Ok(rate_limited_response(exceeded.retry_after, exceeded.limit))
                }
            }
        })
    }
}

/// Add rate limit headers to a successful response.
fn add_rate_limit_headers(response: Response, result: &RateLimitResult) -> Response {
    let (mut parts, body) = response.into_parts();

    parts
        .headers
        .insert("X-RateLimit-Limit", result.limit.into());
    parts
        .headers
        .insert("X-RateLimit-Remaining", result.remaining.into());
    parts
        .headers
        .insert("X-RateLimit-Reset", result.reset_after.into());

    Response::from_parts(parts, body)
}

/// Build a 429 Too Many Requests response.
fn rate_limited_response(retry_after: u64, limit: u64) -> Response {
    let body = serde_json::json!({
        "message": "Rate limit exceeded. Try again later.",
        "retry_after": retry_after,
        "limit": limit
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, axum::Json(body)).into_response();

    response
        .headers_mut()
        .insert(header::RETRY_AFTER, retry_after.into());
    response
        .headers_mut()
        .insert("X-RateLimit-Limit", limit.into());
    response
        .headers_mut()
        .insert("X-RateLimit-Remaining", 0u64.into());

    response
}
