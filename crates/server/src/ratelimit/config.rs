use serde::Deserialize;

/// Per-route rate limiting configuration (`[rate_limit]` in the config
/// file).
///
/// The download route is deliberately stricter than search: an extraction
/// job ties up a worker for its full duration, a search is one upstream
/// round-trip.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enforced at all.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Tier for `POST /download-audio`.
    #[serde(default = "default_download_tier")]
    pub download: RateLimitTier,
    /// Tier for `POST /search`.
    #[serde(default = "default_search_tier")]
    pub search: RateLimitTier,
    /// Tier for every other route.
    #[serde(default = "default_tier")]
    pub default: RateLimitTier,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            download: default_download_tier(),
            search: default_search_tier(),
            default: default_tier(),
        }
    }
}

impl RateLimitConfig {
    /// Resolve the tier applying to a route class.
    pub fn tier_for(&self, class: RouteClass) -> &RateLimitTier {
        match class {
            RouteClass::Download => &self.download,
            RouteClass::Search => &self.search,
            RouteClass::Default => &self.default,
        }
    }
}

/// A rate limit tier defining the limit and window.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitTier {
    /// Maximum number of requests allowed per window.
    pub requests_per_window: u64,
    /// Window duration in seconds.
    #[serde(default = "default_window")]
    pub window_seconds: u64,
}

/// Which limit bucket a request path falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Download,
    Search,
    Default,
}

impl RouteClass {
    /// Classify a request path.
    pub fn for_path(path: &str) -> Self {
        match path {
            "/download-audio" => Self::Download,
            "/search" => Self::Search,
            _ => Self::Default,
        }
    }

    /// Stable name used in counter keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Search => "search",
            Self::Default => "default",
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window() -> u64 {
    60
}

fn default_download_tier() -> RateLimitTier {
    RateLimitTier {
        requests_per_window: 5,
        window_seconds: 60,
    }
}

fn default_search_tier() -> RateLimitTier {
    RateLimitTier {
        requests_per_window: 10,
        window_seconds: 60,
    }
}

fn default_tier() -> RateLimitTier {
    RateLimitTier {
        requests_per_window: 20,
        window_seconds: 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_classification() {
        assert_eq!(RouteClass::for_path("/download-audio"), RouteClass::Download);
        assert_eq!(RouteClass::for_path("/search"), RouteClass::Search);
        assert_eq!(RouteClass::for_path("/files/a.mp3"), RouteClass::Default);
        assert_eq!(RouteClass::for_path("/health"), RouteClass::Default);
    }

    #[test]
    fn defaults_keep_download_strictest() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert!(
            config.download.requests_per_window < config.search.requests_per_window,
            "download tier must be stricter than search"
        );
    }

    #[test]
    fn parses_from_toml() {
        let config: RateLimitConfig = toml::from_str(
            r#"
            enabled = true
            download = { requests_per_window = 2, window_seconds = 10 }
            search = { requests_per_window = 4 }
            "#,
        )
        .unwrap();

        assert_eq!(config.download.requests_per_window, 2);
        assert_eq!(config.download.window_seconds, 10);
        assert_eq!(config.search.window_seconds, 60);
        assert_eq!(config.tier_for(RouteClass::Default).requests_per_window, 20);
    }
}
