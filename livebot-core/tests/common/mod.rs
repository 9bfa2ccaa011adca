// Shared mock implementations and fixtures for the livebot-core tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use livebot_common::Error;
use livebot_common::models::{LiveInfo, Platform};
use livebot_common::traits::platform_traits::{
    ChannelMessage, ChannelPermissions, NotifyChannelApi, StreamProbe,
};
use livebot_common::traits::repository_traits::GuildConfigRepository;
use livebot_core::http::{HttpClient, HttpResponse};
use livebot_core::repositories::{JsonGuildConfigRepository, JsonStreamStateRepository};
use livebot_core::services::notify_service::NotifyService;
use livebot_core::services::stream_service::StreamService;
use livebot_core::store::JsonStore;

/// Fixed broadcast start used by the fixtures so history-scan tests can
/// place messages deterministically before or after it.
pub fn stream_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap()
}

pub fn live_info(display_name: &str, session_id: Option<&str>) -> LiveInfo {
    LiveInfo {
        display_name: display_name.to_string(),
        title: "Test broadcast".to_string(),
        category: "Just Chatting".to_string(),
        viewer_count: 42,
        started_at: stream_start(),
        session_id: session_id.map(str::to_string),
    }
}

// ------------------------------------------------------------------
// Canned-response HTTP client
// ------------------------------------------------------------------

/// Serves canned responses and records every request. GET responses are
/// popped in registration order; once the queue is empty the default
/// response repeats. No canned response at all means the request errors.
#[derive(Default)]
pub struct MockHttpClient {
    post_response: Mutex<Option<HttpResponse>>,
    get_responses: Mutex<VecDeque<HttpResponse>>,
    default_get: Mutex<Option<HttpResponse>>,
    get_delay: Mutex<Option<Duration>>,
    pub get_urls: Mutex<Vec<String>>,
    pub post_count: AtomicUsize,
}

impl MockHttpClient {
    pub fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    pub fn set_post_response(&self, response: Option<HttpResponse>) {
        *self.post_response.lock().unwrap() = response;
    }

    pub fn push_get(&self, response: HttpResponse) {
        self.get_responses.lock().unwrap().push_back(response);
    }

    pub fn set_default_get(&self, response: HttpResponse) {
        *self.default_get.lock().unwrap() = Some(response);
    }

    pub fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = Some(delay);
    }

    pub fn get_count(&self) -> usize {
        self.get_urls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(
        &self,
        url: String,
        _headers: HashMap<String, String>,
    ) -> Result<HttpResponse, Error> {
        let delay = *self.get_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.get_urls.lock().unwrap().push(url);
        if let Some(response) = self.get_responses.lock().unwrap().pop_front() {
            return Ok(response);
        }
        match self.default_get.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(Error::Platform("no canned GET response".into())),
        }
    }

    async fn post_form(
        &self,
        _url: String,
        _form: Vec<(String, String)>,
    ) -> Result<HttpResponse, Error> {
        self.post_count.fetch_add(1, Ordering::SeqCst);
        match self.post_response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(Error::Platform("token endpoint unreachable".into())),
        }
    }
}

// ------------------------------------------------------------------
// Recording delivery channel
// ------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct ChannelBehavior {
    pub exists: bool,
    pub permissions: ChannelPermissions,
    pub history: Vec<ChannelMessage>,
    pub history_fails: bool,
    pub send_fails: bool,
}

impl Default for ChannelBehavior {
    fn default() -> Self {
        Self {
            exists: true,
            permissions: ChannelPermissions {
                view_channel: true,
                send_messages: true,
                read_history: true,
                mention_everyone: true,
            },
            history: Vec::new(),
            history_fails: false,
            send_fails: false,
        }
    }
}

/// In-memory stand-in for the Discord delivery backend; records every
/// message the dispatcher sends.
#[derive(Default)]
pub struct RecordingChannelApi {
    channels: Mutex<HashMap<String, ChannelBehavior>>,
    sent: Mutex<Vec<SentMessage>>,
}

#[derive(Clone, Debug)]
pub struct SentMessage {
    pub channel_id: String,
    pub content: String,
    pub mention_everyone: bool,
}

impl RecordingChannelApi {
    pub fn add_channel(&self, channel_id: &str, behavior: ChannelBehavior) {
        self.channels
            .lock()
            .unwrap()
            .insert(channel_id.to_string(), behavior);
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotifyChannelApi for RecordingChannelApi {
    async fn channel_exists(&self, channel_id: &str) -> Result<bool, Error> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .get(channel_id)
            .map(|c| c.exists)
            .unwrap_or(false))
    }

    async fn channel_permissions(&self, channel_id: &str) -> Result<ChannelPermissions, Error> {
        self.channels
            .lock()
            .unwrap()
            .get(channel_id)
            .map(|c| c.permissions)
            .ok_or_else(|| Error::NotFound(format!("channel {channel_id}")))
    }

    async fn recent_messages(
        &self,
        channel_id: &str,
        _limit: u16,
    ) -> Result<Vec<ChannelMessage>, Error> {
        let channels = self.channels.lock().unwrap();
        let Some(channel) = channels.get(channel_id) else {
            return Ok(Vec::new());
        };
        if channel.history_fails {
            return Err(Error::Platform("history fetch failed".into()));
        }
        Ok(channel.history.clone())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> Result<(), Error> {
        let send_fails = self
            .channels
            .lock()
            .unwrap()
            .get(channel_id)
            .map(|c| c.send_fails)
            .unwrap_or(false);
        if send_fails {
            return Err(Error::Platform("send failed".into()));
        }
        self.sent.lock().unwrap().push(SentMessage {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
            mention_everyone,
        });
        Ok(())
    }
}

// ------------------------------------------------------------------
// Programmable probe
// ------------------------------------------------------------------

/// A probe whose answers are set by the test; counts every check and
/// can delay to simulate a slow upstream.
pub struct MockProbe {
    platform: Platform,
    online: Mutex<HashMap<String, LiveInfo>>,
    delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl MockProbe {
    pub fn new(platform: Platform) -> Self {
        Self::with_delay_opt(platform, None)
    }

    pub fn with_delay(platform: Platform, delay: Duration) -> Self {
        Self::with_delay_opt(platform, Some(delay))
    }

    fn with_delay_opt(platform: Platform, delay: Option<Duration>) -> Self {
        Self {
            platform,
            online: Mutex::new(HashMap::new()),
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_online(&self, identifier: &str, info: LiveInfo) {
        self.online
            .lock()
            .unwrap()
            .insert(identifier.to_lowercase(), info);
    }

    pub fn set_offline(&self, identifier: &str) {
        self.online.lock().unwrap().remove(&identifier.to_lowercase());
    }
}

#[async_trait]
impl StreamProbe for MockProbe {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn check(&self, identifier: &str) -> Option<LiveInfo> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.online
            .lock()
            .unwrap()
            .get(&identifier.to_lowercase())
            .cloned()
    }
}

// ------------------------------------------------------------------
// Wired-up service stack over a temp store
// ------------------------------------------------------------------

pub struct Harness {
    pub guild_repo: Arc<JsonGuildConfigRepository>,
    pub state_repo: Arc<JsonStreamStateRepository>,
    pub api: Arc<RecordingChannelApi>,
    pub service: Arc<StreamService>,
    pub notify: Arc<NotifyService>,
    _dir: tempfile::TempDir,
}

pub fn harness(has_durable_persistence: bool) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonStore::open(dir.path().join("livebot.json")));
    let guild_repo = Arc::new(JsonGuildConfigRepository::new(store.clone()));
    let state_repo = Arc::new(JsonStreamStateRepository::new(store.clone()));
    let api = Arc::new(RecordingChannelApi::default());
    let notify = Arc::new(NotifyService::new(
        guild_repo.clone(),
        api.clone(),
        has_durable_persistence,
    ));
    let service = Arc::new(StreamService::new(state_repo.clone(), notify.clone()));
    Harness {
        guild_repo,
        state_repo,
        api,
        service,
        notify,
        _dir: dir,
    }
}

impl Harness {
    /// Registers a guild with a working destination channel watching
    /// one (platform, identifier).
    pub async fn watch(&self, guild_id: &str, channel_id: &str, platform: Platform, identifier: &str) {
        self.guild_repo
            .set_notify_channel(guild_id, channel_id, false)
            .await;
        self.guild_repo
            .add_watch(guild_id, platform, identifier)
            .await;
        self.api.add_channel(channel_id, ChannelBehavior::default());
    }
}
