//! HTTP client abstraction for the platform probes.
//!
//! Probes and the Twitch authenticator take an `Arc<dyn HttpClient>` so
//! tests can run against canned responses instead of the real Twitch
//! and Kick endpoints. The default implementation wraps reqwest.

use std::collections::HashMap;

use async_trait::async_trait;

use livebot_common::Error;

/// Status and body of an upstream response. Probes branch on the status
/// (Kick's anti-bot 403/503 handling, Helix 401), so a plain body
/// string is not enough here.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A generic trait for making HTTP requests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, Error>;

    async fn post_form(
        &self,
        url: String,
        form: Vec<(String, String)>,
    ) -> Result<HttpResponse, Error>;
}

#[derive(Clone, Default)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn get(
        &self,
        url: String,
        headers: HashMap<String, String>,
    ) -> Result<HttpResponse, Error> {
        let mut request = self.client.get(&url);
        for (key, value) in headers {
            request = request.header(&key, value);
        }
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    async fn post_form(
        &self,
        url: String,
        form: Vec<(String, String)>,
    ) -> Result<HttpResponse, Error> {
        let response = self.client.post(&url).form(&form).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
