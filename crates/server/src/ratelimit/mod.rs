pub mod config;
pub mod limiter;
pub mod middleware;

pub use config::{RateLimitConfig, RateLimitTier, RouteClass};
pub use limiter::RateLimiter;
pub use middleware::RateLimitLayer;
