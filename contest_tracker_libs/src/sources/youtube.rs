use crate::sources::{Result, SourceError};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::time::Duration;

const PLAYLIST_ITEMS_API: &str = "https://www.googleapis.com/youtube/v3/playlistItems";
const PAGE_SIZE: u32 = 50;
const MAX_PAGES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistVideo {
    pub title: String,
    pub video_id: String,
    pub published_at: Option<String>,
}

impl PlaylistVideo {
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Fetch every item of the playlist. Each page is requested once and the first failure is returned.
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<Vec<PlaylistVideo>>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemListResponse {
    next_page_token: Option<String>,
    items: Option<Vec<PlaylistItem>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistItemSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistItemSnippet {
    title: String,
    published_at: Option<String>,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: Option<String>,
}

impl PlaylistItemListResponse {
    fn into_videos(self) -> (Vec<PlaylistVideo>, Option<String>) {
        let videos = self
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let snippet = item.snippet;
                snippet.resource_id.video_id.map(|video_id| PlaylistVideo {
                    title: snippet.title,
                    video_id,
                    published_at: snippet.published_at,
                })
            })
            .collect();

        (videos, self.next_page_token)
    }
}

pub struct YouTubeClient {
    url: Url,
    api_key: Option<String>,
    client: Client,
}

impl YouTubeClient {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(PLAYLIST_ITEMS_API, api_key)
    }

    pub fn with_base_url(url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .gzip(true)
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            url: Url::parse(url)?,
            api_key,
            client,
        })
    }

    async fn fetch_page(
        &self,
        api_key: &str,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse> {
        let mut params = vec![
            ("part", String::from("snippet")),
            ("playlistId", String::from(playlist_id)),
            ("maxResults", PAGE_SIZE.to_string()),
            ("key", String::from(api_key)),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", String::from(token)));
        }

        let res = self
            .client
            .get(self.url.clone())
            .query(&params)
            .send()
            .await?;

        match res.error_for_status_ref() {
            Ok(_) => Ok(res.json().await?),
            Err(e) => {
                let body = res.text().await.unwrap_or_default();
                Err(SourceError::UnexpectedError(format!(
                    "unexpected error [{}] cause [{}]",
                    e, body
                )))
            }
        }
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn fetch_playlist(&self, playlist_id: &str) -> Result<Vec<PlaylistVideo>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("YOUTUBE_API_KEY"))?;

        let mut videos: Vec<PlaylistVideo> = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page = self
                .fetch_page(api_key, playlist_id, page_token.as_deref())
                .await?;
            let (mut page_videos, next) = page.into_videos();
            videos.append(&mut page_videos);

            match next {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        if videos.is_empty() {
            tracing::warn!("No videos found in playlist {}", playlist_id);
        }

        Ok(videos)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::{
        extract::{Extension, Query},
        http::StatusCode,
        routing, Json, Router, Server,
    };
    use serde_json::{json, Value};
    use std::{
        collections::HashMap,
        net::SocketAddr,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    #[derive(Debug, Clone, Copy)]
    enum Playback {
        TwoPages,
        Endless,
        FailOnSecondPage,
    }

    struct PlaylistServer {
        playback: Playback,
        requests: AtomicUsize,
    }

    /// Serves one video per page; page `n` links to `page-{n+1}`.
    async fn playlist_items(
        Query(params): Query<HashMap<String, String>>,
        Extension(server): Extension<Arc<PlaylistServer>>,
    ) -> (StatusCode, Json<Value>) {
        let page = server.requests.fetch_add(1, Ordering::SeqCst) + 1;

        let expected_token = (page > 1).then(|| format!("page-{}", page));
        if params.get("pageToken") != expected_token.as_ref()
            || params.get("key").map(String::as_str) != Some("test-key")
            || params.get("maxResults").map(String::as_str) != Some("50")
        {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad request"})));
        }

        let next = match server.playback {
            Playback::TwoPages if page >= 2 => None,
            Playback::FailOnSecondPage if page >= 2 => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "backendError"})),
                )
            }
            _ => Some(format!("page-{}", page + 1)),
        };

        (
            StatusCode::OK,
            Json(json!({
                "nextPageToken": next,
                "items": [{
                    "snippet": {
                        "title": format!("Weekly Contest {} Solution", 400 + page),
                        "publishedAt": "2024-06-09T05:12:44Z",
                        "resourceId": {"videoId": format!("v{}", page)}
                    }
                }]
            })),
        )
    }

    async fn serve(playback: Playback) -> (YouTubeClient, Arc<PlaylistServer>) {
        let state = Arc::new(PlaylistServer {
            playback,
            requests: AtomicUsize::new(0),
        });
        let app = Router::new()
            .route("/youtube/v3/playlistItems", routing::get(playlist_items))
            .layer(Extension(state.clone()));
        let server =
            Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(app.into_make_service());
        let url = format!("http://{}/youtube/v3/playlistItems", server.local_addr());
        tokio::spawn(server);

        let client = YouTubeClient::with_base_url(&url, Some(String::from("test-key"))).unwrap();
        (client, state)
    }

    #[tokio::test]
    async fn test_fetch_playlist_follows_page_tokens() {
        let (client, server) = serve(Playback::TwoPages).await;

        let videos = client.fetch_playlist("PL-leetcode").await.unwrap();

        let ids: Vec<&str> = videos.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
        assert_eq!(server.requests.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_fetch_playlist_stops_at_max_pages() {
        let (client, server) = serve(Playback::Endless).await;

        let videos = client.fetch_playlist("PL-leetcode").await.unwrap();

        assert_eq!(videos.len(), MAX_PAGES);
        assert_eq!(server.requests.load(Ordering::SeqCst), MAX_PAGES);
    }

    #[tokio::test]
    async fn test_fetch_playlist_fails_when_a_page_fails() {
        let (client, server) = serve(Playback::FailOnSecondPage).await;

        let result = client.fetch_playlist("PL-leetcode").await;

        assert!(matches!(result, Err(SourceError::UnexpectedError(_))));
        assert_eq!(server.requests.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_deserialize_playlist_items() {
        let raw = r#"
        {
            "kind": "youtube#playlistItemListResponse",
            "nextPageToken": "EAAaBlBUOkNESQ",
            "items": [
                {
                    "kind": "youtube#playlistItem",
                    "id": "UExjWHBrSTlB",
                    "snippet": {
                        "publishedAt": "2024-06-09T05:12:44Z",
                        "title": "Leetcode Weekly Contest 401 | Video Solutions - A to D",
                        "resourceId": {"kind": "youtube#video", "videoId": "dQw4w9WgXcQ"}
                    }
                },
                {
                    "kind": "youtube#playlistItem",
                    "id": "UExjWHBrSTlC",
                    "snippet": {
                        "title": "Deleted video",
                        "resourceId": {"kind": "youtube#video"}
                    }
                }
            ]
        }
        "#;

        let response: PlaylistItemListResponse = serde_json::from_str(raw).unwrap();
        let (videos, next) = response.into_videos();

        assert_eq!(next, Some(String::from("EAAaBlBUOkNESQ")));
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "dQw4w9WgXcQ");
        assert_eq!(
            videos[0].published_at.as_deref(),
            Some("2024-06-09T05:12:44Z")
        );
        assert_eq!(
            videos[0].watch_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_deserialize_empty_playlist() {
        let response: PlaylistItemListResponse =
            serde_json::from_str(r#"{"kind": "youtube#playlistItemListResponse"}"#).unwrap();
        let (videos, next) = response.into_videos();

        assert!(videos.is_empty());
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = YouTubeClient::new(None).unwrap();
        let result = client.fetch_playlist("PLxxxx").await;

        assert!(matches!(
            result,
            Err(SourceError::MissingCredential("YOUTUBE_API_KEY"))
        ));
    }
}
