// File: livebot-core/src/platforms/twitch/auth.rs

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use livebot_common::Error;

use crate::http::HttpClient;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Treat the token as expired this many seconds before Twitch does.
const EXPIRY_BUFFER_SECS: i64 = 60;

#[derive(Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// App access token cache for the Helix API (client-credentials grant).
///
/// One instance is shared for the life of the process: the token is
/// fetched on first use, reused until the buffered expiry, and dropped
/// on `invalidate` so the next call re-exchanges.
pub struct TwitchAuthenticator {
    client_id: String,
    client_secret: String,
    http: Arc<dyn HttpClient>,
    cached: Mutex<Option<CachedToken>>,
}

impl TwitchAuthenticator {
    pub fn new(client_id: String, client_secret: String, http: Arc<dyn HttpClient>) -> Self {
        Self {
            client_id,
            client_secret,
            http,
            cached: Mutex::new(None),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns a bearer token, exchanging client credentials if the
    /// cached one is missing or past its buffered expiry.
    pub async fn app_access_token(&self) -> Result<String, Error> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.expires_at {
                return Ok(token.access_token.clone());
            }
        }

        let form = vec![
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
            ("grant_type".to_string(), "client_credentials".to_string()),
        ];
        let response = self
            .http
            .post_form(TOKEN_URL.to_string(), form)
            .await
            .map_err(|e| Error::Auth(format!("Twitch token endpoint error: {e}")))?;
        if !response.is_success() {
            return Err(Error::Auth(format!(
                "Twitch token endpoint returned HTTP {}",
                response.status
            )));
        }
        let parsed: TwitchTokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| Error::Auth(format!("Parse error on token JSON: {e}")))?;

        let expires_at =
            Utc::now() + Duration::seconds(parsed.expires_in as i64 - EXPIRY_BUFFER_SECS);
        debug!("Obtained Twitch app access token, expires_at={expires_at}");
        *cached = Some(CachedToken {
            access_token: parsed.access_token.clone(),
            expires_at,
        });
        Ok(parsed.access_token)
    }

    /// Drops the cached token so the next use re-exchanges. Called when
    /// Helix rejects the credential.
    pub async fn invalidate(&self) {
        let mut cached = self.cached.lock().await;
        *cached = None;
    }
}
