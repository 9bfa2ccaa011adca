// File: livebot-common/src/models/watch.rs

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::platform::Platform;

/// One watched channel inside a guild's configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub platform: Platform,
    pub identifier: String,
    #[serde(default)]
    pub vod_enabled: bool,
}

impl WatchEntry {
    /// Identifiers are case-insensitive on both platforms.
    pub fn matches(&self, platform: Platform, identifier: &str) -> bool {
        self.platform == platform && self.identifier.eq_ignore_ascii_case(identifier)
    }
}

/// Per-guild notification settings and watch list. Created lazily on
/// first access and never deleted.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildConfig {
    pub notify_channel_id: Option<String>,
    pub mentions_enabled: bool,
    pub watched: Vec<WatchEntry>,
}

/// The distinct identifiers to probe in one poll cycle, per platform.
/// Lowercased on insertion.
#[derive(Debug, Default, Clone)]
pub struct WatchedChannels {
    pub twitch: BTreeSet<String>,
    pub kick: BTreeSet<String>,
}

impl WatchedChannels {
    pub fn for_platform(&self, platform: Platform) -> &BTreeSet<String> {
        match platform {
            Platform::Twitch => &self.twitch,
            Platform::Kick => &self.kick,
        }
    }

    pub fn insert(&mut self, platform: Platform, identifier: String) {
        match platform {
            Platform::Twitch => self.twitch.insert(identifier),
            Platform::Kick => self.kick.insert(identifier),
        };
    }

    pub fn is_empty(&self) -> bool {
        self.twitch.is_empty() && self.kick.is_empty()
    }
}
