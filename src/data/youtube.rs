//! YouTube Data API integration: video metadata by id.
//!
//! Only the `videos` endpoint is used. Ids are sent in fixed-size chunks (the
//! API accepts at most 50 per request); there is no page-token handling.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data::duration::{format_hms, parse_iso8601_duration};
use crate::domain::VideoRecord;
use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
const MAX_IDS_PER_REQUEST: usize = 50;

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const BASE_URL_VAR: &str = "YOUTUBE_API_BASE_URL";

/// Explicit client configuration.
#[derive(Clone)]
pub struct YouTubeConfig {
    pub api_key: String,
    pub base_url: String,
}

impl YouTubeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Read the key (and optional base URL) from the environment, loading `.env` first.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::new(2, format!("Missing {API_KEY_VAR} in environment (.env).")))?;
        let base_url = std::env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self { api_key, base_url })
    }
}

impl std::fmt::Debug for YouTubeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeConfig")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// First five characters of a key followed by `...`.
pub fn mask_key(key: &str) -> String {
    let prefix: String = key.chars().take(5).collect();
    format!("{prefix}...")
}

pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    pub fn new(config: YouTubeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(YouTubeConfig::from_env()?))
    }

    /// Fetch metadata for every id, in response order.
    ///
    /// Items the API returns without a usable duration, date, or view count are
    /// skipped with a warning. Ids the API does not know are silently absent.
    pub fn fetch_videos(&self, ids: &[String]) -> Result<Vec<VideoRecord>, AppError> {
        if ids.is_empty() {
            return Err(AppError::new(2, "No video ids to fetch."));
        }

        let mut out = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_REQUEST) {
            let body = self.fetch_chunk(chunk)?;
            for item in body.items {
                match video_from_item(item) {
                    Ok(video) => out.push(video),
                    Err(msg) => warn!("{msg}"),
                }
            }
        }

        info!(requested = ids.len(), received = out.len(), "fetched video metadata");
        Ok(out)
    }

    fn fetch_chunk(&self, ids: &[String]) -> Result<VideosResponse, AppError> {
        let url = format!("{}/videos", self.config.base_url.trim_end_matches('/'));
        debug!(count = ids.len(), %url, "requesting video chunk");

        let id_list = ids.join(",");
        let max_results = MAX_IDS_PER_REQUEST.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails,statistics"),
                ("id", id_list.as_str()),
                ("key", self.config.api_key.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("YouTube request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("YouTube request failed with status {}.", resp.status()),
            ));
        }

        resp.json()
            .map_err(|e| AppError::new(4, format!("Failed to parse YouTube response: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<Snippet>,
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    published_at: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    /// The API sends counts as strings; hidden counts are absent.
    view_count: Option<String>,
}

fn video_from_item(item: VideoItem) -> Result<VideoRecord, String> {
    let id = item.id;
    let snippet = item
        .snippet
        .ok_or_else(|| format!("Video {id}: missing snippet, skipped."))?;
    let published_at = DateTime::parse_from_rfc3339(&snippet.published_at)
        .map_err(|e| format!("Video {id}: invalid publishedAt '{}': {e}", snippet.published_at))?
        .with_timezone(&Utc);

    let raw_duration = item
        .content_details
        .map(|d| d.duration)
        .ok_or_else(|| format!("Video {id}: missing contentDetails, skipped."))?;
    let seconds = parse_iso8601_duration(&raw_duration)
        .ok_or_else(|| format!("Video {id}: unparseable duration '{raw_duration}', skipped."))?;

    let views = item
        .statistics
        .and_then(|s| s.view_count)
        .ok_or_else(|| format!("Video {id}: view count hidden, skipped."))?
        .parse::<u64>()
        .map_err(|e| format!("Video {id}: invalid view count: {e}"))?;

    Ok(VideoRecord {
        video_id: id,
        title: snippet.title,
        published_at,
        views,
        duration_readable: format_hms(seconds),
    })
}
