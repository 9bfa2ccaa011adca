// File: livebot-core/src/repositories/json/guild_config.rs

use std::sync::Arc;

use async_trait::async_trait;

use livebot_common::models::{GuildConfig, Platform, WatchEntry, WatchedChannels};
use livebot_common::traits::repository_traits::GuildConfigRepository;

use crate::store::JsonStore;

#[derive(Clone)]
pub struct JsonGuildConfigRepository {
    store: Arc<JsonStore>,
}

impl JsonGuildConfigRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl GuildConfigRepository for JsonGuildConfigRepository {
    async fn get_or_create(&self, guild_id: &str) -> GuildConfig {
        let existing = self
            .store
            .read(|doc| doc.guilds.get(guild_id).cloned())
            .await;
        if let Some(config) = existing {
            return config;
        }
        // First access writes the default config back, so the guild is
        // part of the document from then on.
        self.store
            .mutate(|doc| doc.guilds.entry(guild_id.to_string()).or_default().clone())
            .await
    }

    async fn set_notify_channel(&self, guild_id: &str, channel_id: &str, mentions_enabled: bool) {
        self.store
            .mutate(|doc| {
                let guild = doc.guilds.entry(guild_id.to_string()).or_default();
                guild.notify_channel_id = Some(channel_id.to_string());
                guild.mentions_enabled = mentions_enabled;
            })
            .await
    }

    async fn add_watch(&self, guild_id: &str, platform: Platform, identifier: &str) -> bool {
        self.store
            .mutate(|doc| {
                let guild = doc.guilds.entry(guild_id.to_string()).or_default();
                if guild.watched.iter().any(|w| w.matches(platform, identifier)) {
                    return false;
                }
                guild.watched.push(WatchEntry {
                    platform,
                    identifier: identifier.to_string(),
                    vod_enabled: false,
                });
                true
            })
            .await
    }

    async fn remove_watch(&self, guild_id: &str, platform: Platform, identifier: &str) -> bool {
        self.store
            .mutate(|doc| {
                let Some(guild) = doc.guilds.get_mut(guild_id) else {
                    return false;
                };
                let before = guild.watched.len();
                guild.watched.retain(|w| !w.matches(platform, identifier));
                guild.watched.len() != before
            })
            .await
    }

    async fn watch_list(&self, guild_id: &str) -> Vec<WatchEntry> {
        self.store
            .read(|doc| {
                doc.guilds
                    .get(guild_id)
                    .map(|g| g.watched.clone())
                    .unwrap_or_default()
            })
            .await
    }

    async fn set_vod_enabled(
        &self,
        guild_id: &str,
        platform: Platform,
        identifier: &str,
        enabled: bool,
    ) -> bool {
        self.store
            .mutate(|doc| {
                let Some(guild) = doc.guilds.get_mut(guild_id) else {
                    return false;
                };
                match guild
                    .watched
                    .iter_mut()
                    .find(|w| w.matches(platform, identifier))
                {
                    Some(entry) => {
                        entry.vod_enabled = enabled;
                        true
                    }
                    None => false,
                }
            })
            .await
    }

    async fn all_guilds(&self) -> Vec<(String, GuildConfig)> {
        self.store
            .read(|doc| {
                doc.guilds
                    .iter()
                    .map(|(id, config)| (id.clone(), config.clone()))
                    .collect()
            })
            .await
    }

    async fn get_all_watched_channels(&self) -> WatchedChannels {
        self.store
            .read(|doc| {
                let mut watched = WatchedChannels::default();
                for guild in doc.guilds.values() {
                    // Guilds without a destination are skipped on
                    // purpose: there is nowhere to deliver for them, so
                    // there is no reason to probe on their behalf.
                    if guild.notify_channel_id.is_none() {
                        continue;
                    }
                    for entry in &guild.watched {
                        watched.insert(entry.platform, entry.identifier.to_lowercase());
                    }
                }
                watched
            })
            .await
    }

    async fn should_download_vod(&self, platform: Platform, identifier: &str) -> bool {
        // Any one guild opting in turns VOD capture on for the channel.
        self.store
            .read(|doc| {
                doc.guilds.values().any(|guild| {
                    guild
                        .watched
                        .iter()
                        .any(|w| w.matches(platform, identifier) && w.vod_enabled)
                })
            })
            .await
    }
}
