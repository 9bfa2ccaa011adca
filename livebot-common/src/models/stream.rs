// File: livebot-common/src/models/stream.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamStatus {
    Online,
    #[default]
    Offline,
}

/// Last known liveness for one physical channel, shared by every guild
/// that watches it. The default is the state of a channel we have never
/// probed: offline, never notified.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamState {
    pub last_status: StreamStatus,
    pub last_notified: Option<DateTime<Utc>>,
    pub last_stream_id: Option<String>,
}

impl StreamState {
    pub fn apply(&mut self, update: StreamStateUpdate) {
        if let Some(status) = update.last_status {
            self.last_status = status;
        }
        if let Some(notified) = update.last_notified {
            self.last_notified = Some(notified);
        }
        if let Some(stream_id) = update.last_stream_id {
            self.last_stream_id = Some(stream_id);
        }
    }
}

/// Shallow-merge patch for `StreamState`; unset fields keep their old
/// values. The offline transition sets only `last_status`, so the
/// session id survives the offline dip.
#[derive(Debug, Default, Clone)]
pub struct StreamStateUpdate {
    pub last_status: Option<StreamStatus>,
    pub last_notified: Option<DateTime<Utc>>,
    pub last_stream_id: Option<String>,
}

/// What a probe reports for a channel that is currently broadcasting.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveInfo {
    pub display_name: String,
    pub title: String,
    pub category: String,
    pub viewer_count: u64,
    pub started_at: DateTime<Utc>,
    /// Platform-assigned id for this continuous broadcast. Absent ids
    /// get a synthetic fallback in the transition engine.
    pub session_id: Option<String>,
}
