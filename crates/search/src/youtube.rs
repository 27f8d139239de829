use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{SearchError, SearchHit, SearchProvider};

/// Public search endpoint used by the web client.
const DEFAULT_ENDPOINT: &str = "https://www.youtube.com/youtubei/v1/search?prettyPrint=false";

/// Search filter parameter restricting results to videos.
const VIDEOS_ONLY_PARAMS: &str = "EgIQAQ%3D%3D";

const CLIENT_NAME: &str = "WEB";
const CLIENT_VERSION: &str = "2.20240101.00.00";

/// Search provider backed by YouTube's public `youtubei` search endpoint.
///
/// Sends the same JSON request the web client does and walks the renderer
/// tree of the response. Anything unexpected in the payload degrades to
/// [`SearchError::Unavailable`]; individual malformed entries are skipped.
pub struct YoutubeSearch {
    client: reqwest::Client,
    endpoint: String,
    placeholder_thumbnail: String,
}

impl YoutubeSearch {
    /// Create a provider with the given placeholder thumbnail URL.
    pub fn new(placeholder_thumbnail: impl Into<String>) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            placeholder_thumbnail: placeholder_thumbnail.into(),
        })
    }

    /// Override the provider endpoint (used by tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for YoutubeSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let body = json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                }
            },
            "query": query,
            "params": VIDEOS_ONLY_PARAMS,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SearchError::Unavailable(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Unavailable(e.to_string()))?;

        let hits = parse_results(&payload, limit, &self.placeholder_thumbnail)?;
        debug!(query, returned = hits.len(), "search proxied");
        Ok(hits)
    }
}

/// Walk the renderer tree of a search response and collect video hits.
fn parse_results(
    payload: &Value,
    limit: usize,
    placeholder: &str,
) -> Result<Vec<SearchHit>, SearchError> {
    let sections = payload["contents"]["twoColumnSearchResultsRenderer"]["primaryContents"]
        ["sectionListRenderer"]["contents"]
        .as_array()
        .ok_or_else(|| SearchError::Unavailable("malformed search payload".to_owned()))?;

    let mut hits = Vec::new();
    for section in sections {
        let Some(items) = section["itemSectionRenderer"]["contents"].as_array() else {
            continue;
        };
        for item in items {
            if hits.len() >= limit {
                return Ok(hits);
            }
            if let Some(hit) = parse_video(&item["videoRenderer"], placeholder) {
                hits.push(hit);
            }
        }
    }

    Ok(hits)
}

/// Map one `videoRenderer` node to a hit; `None` for ads, shelves, and other
/// non-video entries.
fn parse_video(renderer: &Value, placeholder: &str) -> Option<SearchHit> {
    let video_id = renderer["videoId"].as_str()?;
    let title = renderer["title"]["runs"][0]["text"].as_str()?;

    let thumbnail = renderer["thumbnail"]["thumbnails"]
        .as_array()
        .and_then(|t| t.last())
        .and_then(|t| t["url"].as_str())
        .filter(|u| !u.is_empty())
        .unwrap_or(placeholder);

    Some(SearchHit {
        title: title.to_owned(),
        link: format!("https://www.youtube.com/watch?v={video_id}"),
        thumbnail: thumbnail.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "/images/side.gif";

    fn payload_with(items: Value) -> Value {
        json!({
            "contents": {
                "twoColumnSearchResultsRenderer": {
                    "primaryContents": {
                        "sectionListRenderer": {
                            "contents": [
                                { "itemSectionRenderer": { "contents": items } }
                            ]
                        }
                    }
                }
            }
        })
    }

    fn video(id: &str, title: &str, thumb: Option<&str>) -> Value {
        let mut v = json!({
            "videoRenderer": {
                "videoId": id,
                "title": { "runs": [ { "text": title } ] },
            }
        });
        if let Some(url) = thumb {
            v["videoRenderer"]["thumbnail"] =
                json!({ "thumbnails": [ { "url": url, "width": 360 } ] });
        }
        v
    }

    #[test]
    fn parses_video_hits() {
        let payload = payload_with(json!([
            video("abc123", "Lofi Beats", Some("https://i.ytimg.com/vi/abc123/hq720.jpg")),
        ]));

        let hits = parse_results(&payload, 1, PLACEHOLDER).unwrap();
        assert_eq!(
            hits,
            vec![SearchHit {
                title: "Lofi Beats".to_owned(),
                link: "https://www.youtube.com/watch?v=abc123".to_owned(),
                thumbnail: "https://i.ytimg.com/vi/abc123/hq720.jpg".to_owned(),
            }]
        );
    }

    #[test]
    fn placeholder_substituted_when_thumbnail_missing() {
        let payload = payload_with(json!([video("xyz", "No Thumb", None)]));
        let hits = parse_results(&payload, 1, PLACEHOLDER).unwrap();
        assert_eq!(hits[0].thumbnail, PLACEHOLDER);
    }

    #[test]
    fn limit_is_respected_and_non_videos_skipped() {
        let payload = payload_with(json!([
            { "adSlotRenderer": { "kind": "ad" } },
            video("a", "First", None),
            video("b", "Second", None),
            video("c", "Third", None),
        ]));

        let hits = parse_results(&payload, 2, PLACEHOLDER).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "First");
        assert_eq!(hits[1].title, "Second");
    }

    #[test]
    fn malformed_payload_is_unavailable() {
        let err = parse_results(&json!({"unexpected": true}), 1, PLACEHOLDER).unwrap_err();
        assert!(matches!(err, SearchError::Unavailable(_)));
    }

    #[tokio::test]
    async fn empty_query_fails_before_any_call() {
        // Endpoint is unroutable: reaching it would fail the test with
        // Unavailable instead of EmptyQuery.
        let provider = YoutubeSearch::new(PLACEHOLDER)
            .unwrap()
            .with_endpoint("http://127.0.0.1:1/search");

        let err = provider.search("   ", 1).await.unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
    }
}
