// File: livebot-core/src/platforms/twitch/mod.rs

pub mod auth;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, warn};

use livebot_common::Error;
use livebot_common::models::{LiveInfo, Platform};
use livebot_common::traits::platform_traits::StreamProbe;

use crate::http::HttpClient;

pub use auth::TwitchAuthenticator;

const STREAMS_URL: &str = "https://api.twitch.tv/helix/streams";

/// Helix caps `user_login` filters at 100 per request.
const BATCH_SIZE: usize = 100;

/// Response from the Helix "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
struct StreamsResponse {
    data: Vec<StreamData>,
}

/// Single stream data record.
#[derive(Debug, Deserialize)]
struct StreamData {
    id: String,
    user_login: String,
    user_name: String,
    game_name: String,
    #[serde(rename = "type")]
    type_field: String,
    title: String,
    viewer_count: u64,
    started_at: String,
}

impl From<StreamData> for LiveInfo {
    fn from(stream: StreamData) -> Self {
        let started_at = parse_started_at(&stream.started_at);
        LiveInfo {
            display_name: stream.user_name,
            title: stream.title,
            category: stream.game_name,
            viewer_count: stream.viewer_count,
            started_at,
            session_id: Some(stream.id),
        }
    }
}

fn parse_started_at(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            warn!("Unparseable started_at '{raw}': {e}; using current time");
            Utc::now()
        }
    }
}

/// Live-status probe for Twitch, batched through the Helix streams
/// endpoint.
pub struct TwitchProbe {
    auth: Arc<TwitchAuthenticator>,
    http: Arc<dyn HttpClient>,
}

impl TwitchProbe {
    pub fn new(auth: Arc<TwitchAuthenticator>, http: Arc<dyn HttpClient>) -> Self {
        Self { auth, http }
    }

    async fn fetch_chunk(&self, token: &str, chunk: &[String]) -> Result<Vec<StreamData>, Error> {
        let query = chunk
            .iter()
            .map(|login| format!("user_login={login}"))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{STREAMS_URL}?{query}");

        let mut headers = HashMap::new();
        headers.insert("Client-Id".to_string(), self.auth.client_id().to_string());
        headers.insert("Authorization".to_string(), format!("Bearer {token}"));

        let response = self.http.get(url, headers).await?;
        if response.status == 401 {
            // Helix no longer accepts the cached token; drop it so the
            // next cycle re-exchanges.
            self.auth.invalidate().await;
            return Err(Error::Auth("Helix rejected app access token (401)".into()));
        }
        if !response.is_success() {
            return Err(Error::Platform(format!(
                "Helix streams: HTTP {}",
                response.status
            )));
        }
        let parsed: StreamsResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::Platform(format!("Helix streams parse error: {e}")))?;
        Ok(parsed.data)
    }
}

#[async_trait]
impl StreamProbe for TwitchProbe {
    fn platform(&self) -> Platform {
        Platform::Twitch
    }

    async fn check(&self, identifier: &str) -> Option<LiveInfo> {
        let identifiers = [identifier.to_string()];
        let mut online = self.check_all(&identifiers).await;
        online.remove(&identifier.to_lowercase())
    }

    async fn check_all(&self, identifiers: &[String]) -> HashMap<String, LiveInfo> {
        let mut online = HashMap::new();
        if identifiers.is_empty() {
            return online;
        }

        // A credential failure skips the whole batch for this cycle;
        // the next cycle retries the exchange.
        let token = match self.auth.app_access_token().await {
            Ok(token) => token,
            Err(e) => {
                error!("Twitch auth failed, skipping batch this cycle: {e}");
                return online;
            }
        };

        for chunk in identifiers.chunks(BATCH_SIZE) {
            match self.fetch_chunk(&token, chunk).await {
                Ok(streams) => {
                    for stream in streams {
                        if stream.type_field != "live" {
                            continue;
                        }
                        let login = stream.user_login.to_lowercase();
                        online.insert(login, LiveInfo::from(stream));
                    }
                }
                Err(e) => {
                    error!(
                        "Twitch streams check failed for a chunk of {}: {e}",
                        chunk.len()
                    );
                }
            }
        }
        online
    }
}
