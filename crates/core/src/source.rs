use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Default accepted-domain pattern: YouTube watch/share URLs, with optional
/// scheme and `www.` prefix.
pub const DEFAULT_SOURCE_PATTERN: &str = r"^(https?://)?(www\.)?(youtube\.com|youtu\.?be)/.+$";

/// Error returned when an accepted-source pattern fails to compile.
#[derive(Debug, Error)]
#[error("invalid source pattern: {0}")]
pub struct SourcePatternError(#[from] regex::Error);

/// Classifier for submitted media-source URLs.
///
/// The accepted-domain set is configuration, not core logic: callers inject
/// the pattern (or use [`SourcePattern::default`]) and the classifier stays a
/// pure predicate. Matching is case-insensitive on the whole pattern so that
/// `HTTPS://WWW.YOUTUBE.COM/...` is treated the same as its lowercase form.
#[derive(Debug, Clone)]
pub struct SourcePattern {
    regex: Regex,
}

impl SourcePattern {
    /// Compile an accepted-source pattern.
    pub fn new(pattern: &str) -> Result<Self, SourcePatternError> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    /// Returns `true` if `url` is an acceptable media-source URL.
    pub fn matches(&self, url: &str) -> bool {
        !url.is_empty() && self.regex.is_match(url)
    }
}

impl Default for SourcePattern {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_PATTERN).expect("default pattern compiles")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_watch_urls() {
        let pattern = SourcePattern::default();
        assert!(pattern.matches("https://www.youtube.com/watch?v=abc123"));
        assert!(pattern.matches("http://youtube.com/watch?v=abc123"));
        assert!(pattern.matches("youtube.com/watch?v=abc123"));
        assert!(pattern.matches("https://youtu.be/abc123"));
        assert!(pattern.matches("www.youtube.com/shorts/xyz"));
    }

    #[test]
    fn case_insensitive_on_scheme_and_host() {
        let pattern = SourcePattern::default();
        assert!(pattern.matches("HTTPS://WWW.YOUTUBE.COM/watch?v=abc"));
        assert!(pattern.matches("YouTu.Be/abc123"));
    }

    #[test]
    fn rejects_empty_and_unrelated() {
        let pattern = SourcePattern::default();
        assert!(!pattern.matches(""));
        assert!(!pattern.matches("https://example.com/watch?v=abc"));
        assert!(!pattern.matches("not a url"));
        assert!(!pattern.matches("ftp://youtube.com/watch"));
        // Domain alone, no path: nothing to download.
        assert!(!pattern.matches("https://www.youtube.com"));
    }

    #[test]
    fn rejects_lookalike_domains() {
        let pattern = SourcePattern::default();
        assert!(!pattern.matches("https://notyoutube.org/watch?v=abc"));
        assert!(!pattern.matches("https://youtube.com.evil.example/watch?v=abc"));
    }

    #[test]
    fn custom_pattern_is_injectable() {
        let pattern = SourcePattern::new(r"^(https?://)?media\.example\.org/.+$").unwrap();
        assert!(pattern.matches("https://media.example.org/clip/42"));
        assert!(!pattern.matches("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        assert!(SourcePattern::new("(unclosed").is_err());
    }
}
