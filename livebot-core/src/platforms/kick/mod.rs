// File: livebot-core/src/platforms/kick/mod.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};

use livebot_common::models::{LiveInfo, Platform};
use livebot_common::traits::platform_traits::StreamProbe;

use crate::http::HttpClient;

const CHANNELS_URL: &str = "https://kick.com/api/v1/channels";

/// Kick sits behind aggressive anti-bot protection; a slow response is
/// as good as no response for a poll cycle.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    user: Option<KickUser>,
    livestream: Option<Livestream>,
}

#[derive(Debug, Deserialize)]
struct KickUser {
    username: String,
}

#[derive(Debug, Deserialize)]
struct Livestream {
    id: Option<u64>,
    is_live: bool,
    session_title: Option<String>,
    categories: Option<Vec<Category>>,
    viewer_count: Option<u64>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Category {
    name: String,
}

/// Live-status probe for Kick. One channel-info request per identifier,
/// all in flight at once, each with its own timeout.
pub struct KickProbe {
    http: Arc<dyn HttpClient>,
    timeout: Duration,
}

impl KickProbe {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_timeout(http, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(http: Arc<dyn HttpClient>, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// One channel-info fetch. Every failure mode maps to `None`: a
    /// channel we cannot check is treated as offline rather than
    /// unknown, trading false negatives for spam avoidance.
    async fn fetch_channel(&self, slug: &str) -> Option<LiveInfo> {
        let url = format!("{CHANNELS_URL}/{slug}");
        let result = tokio::time::timeout(self.timeout, self.http.get(url, HashMap::new())).await;
        let response = match result {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!("Kick check failed for {slug}: {e}");
                return None;
            }
            Err(_) => {
                debug!("Kick check timed out for {slug}");
                return None;
            }
        };

        if response.status == 403 || response.status == 503 {
            // Anti-bot block; common enough that it is not worth a log
            // line per channel per cycle.
            return None;
        }
        if !response.is_success() {
            debug!("Kick check for {slug}: HTTP {}", response.status);
            return None;
        }

        let parsed: ChannelResponse = match serde_json::from_str(&response.body) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Kick channel payload parse error for {slug}: {e}");
                return None;
            }
        };

        let livestream = parsed.livestream?;
        if !livestream.is_live {
            return None;
        }

        let display_name = parsed
            .user
            .map(|u| u.username)
            .unwrap_or_else(|| slug.to_string());
        let category = livestream
            .categories
            .as_ref()
            .and_then(|c| c.first())
            .map(|c| c.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Some(LiveInfo {
            display_name,
            title: livestream.session_title.unwrap_or_default(),
            category,
            viewer_count: livestream.viewer_count.unwrap_or(0),
            started_at: parse_created_at(livestream.created_at.as_deref(), slug),
            session_id: livestream.id.map(|id| id.to_string()),
        })
    }
}

/// Kick reports `created_at` either as RFC 3339 or as a bare
/// `YYYY-MM-DD HH:MM:SS` in UTC.
fn parse_created_at(raw: Option<&str>, slug: &str) -> DateTime<Utc> {
    let Some(raw) = raw else {
        return Utc::now();
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return naive.and_utc();
    }
    warn!("Unparseable Kick created_at '{raw}' for {slug}; using current time");
    Utc::now()
}

#[async_trait]
impl StreamProbe for KickProbe {
    fn platform(&self) -> Platform {
        Platform::Kick
    }

    async fn check(&self, identifier: &str) -> Option<LiveInfo> {
        self.fetch_channel(identifier).await
    }

    async fn check_all(&self, identifiers: &[String]) -> HashMap<String, LiveInfo> {
        let checks = identifiers
            .iter()
            .map(|slug| async move { (slug.to_lowercase(), self.fetch_channel(slug).await) });
        join_all(checks)
            .await
            .into_iter()
            .filter_map(|(slug, info)| info.map(|i| (slug, i)))
            .collect()
    }
}
