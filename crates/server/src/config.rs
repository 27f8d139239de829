use serde::Deserialize;

use crate::ratelimit::RateLimitConfig;

/// Top-level configuration for the audiofetch server, loaded from a TOML
/// file.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Download and extraction configuration.
    #[serde(default)]
    pub download: DownloadConfig,
    /// Search proxy configuration.
    #[serde(default)]
    pub search: SearchConfig,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Download and extraction configuration.
#[derive(Debug, Deserialize)]
pub struct DownloadConfig {
    /// Directory extracted audio files are written to. Created on startup
    /// if missing.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Name or path of the extraction binary.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Regular expression accepted source URLs must match. Defaults to the
    /// built-in pattern when unset.
    pub source_pattern: Option<String>,
    /// Timeout for metadata probing in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_seconds: u64,
    /// Timeout for download and conversion in seconds.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_seconds: u64,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            binary: default_binary(),
            source_pattern: None,
            probe_timeout_seconds: default_probe_timeout(),
            download_timeout_seconds: default_download_timeout(),
        }
    }
}

/// Search proxy configuration.
#[derive(Debug, Deserialize)]
pub struct SearchConfig {
    /// Thumbnail URL substituted when a result carries none.
    #[serde(default = "default_placeholder_thumbnail")]
    pub placeholder_thumbnail: String,
    /// Maximum number of results returned per query.
    #[serde(default = "default_search_limit")]
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            placeholder_thumbnail: default_placeholder_thumbnail(),
            default_limit: default_search_limit(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    4000
}

fn default_output_dir() -> String {
    "saved_content".to_owned()
}

fn default_binary() -> String {
    "yt-dlp".to_owned()
}

fn default_probe_timeout() -> u64 {
    30
}

fn default_download_timeout() -> u64 {
    600
}

fn default_placeholder_thumbnail() -> String {
    "/images/side.gif".to_owned()
}

fn default_search_limit() -> usize {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.download.output_dir, "saved_content");
        assert_eq!(config.download.binary, "yt-dlp");
        assert!(config.download.source_pattern.is_none());
        assert_eq!(config.search.placeholder_thumbnail, "/images/side.gif");
        assert_eq!(config.search.default_limit, 1);
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn partial_config_overrides_only_named_fields() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 8080

            [download]
            output_dir = "/var/lib/audiofetch"

            [rate_limit]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.download.output_dir, "/var/lib/audiofetch");
        assert_eq!(config.download.probe_timeout_seconds, 30);
        assert!(!config.rate_limit.enabled);
    }
}
