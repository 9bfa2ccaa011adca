// File: livebot-common/src/traits/repository_traits.rs

use async_trait::async_trait;

use crate::models::{GuildConfig, Platform, StreamState, StreamStateUpdate, WatchEntry, WatchedChannels};

/// Storage contract for per-guild notification settings and watch
/// lists. Persistence failures are the repository's problem: they are
/// logged and swallowed, and the in-memory state stays authoritative,
/// so these methods do not return errors.
#[async_trait]
pub trait GuildConfigRepository: Send + Sync {
    /// Fetches a guild's configuration, creating the default lazily on
    /// first access.
    async fn get_or_create(&self, guild_id: &str) -> GuildConfig;

    async fn set_notify_channel(&self, guild_id: &str, channel_id: &str, mentions_enabled: bool);

    /// Returns false when the (platform, identifier) pair is already
    /// watched by this guild.
    async fn add_watch(&self, guild_id: &str, platform: Platform, identifier: &str) -> bool;

    /// Returns false when nothing was removed.
    async fn remove_watch(&self, guild_id: &str, platform: Platform, identifier: &str) -> bool;

    async fn watch_list(&self, guild_id: &str) -> Vec<WatchEntry>;

    /// Toggles VOD capture for an already-watched entry. Returns false
    /// when the entry is not on this guild's watch list.
    async fn set_vod_enabled(
        &self,
        guild_id: &str,
        platform: Platform,
        identifier: &str,
        enabled: bool,
    ) -> bool;

    async fn all_guilds(&self) -> Vec<(String, GuildConfig)>;

    /// The distinct channel set to probe, unioned across guilds that
    /// have a notification channel configured. Guilds without one are
    /// excluded on purpose: there is nowhere to deliver for them.
    async fn get_all_watched_channels(&self) -> WatchedChannels;

    /// OR-reduced across all guilds: any one guild enabling VOD capture
    /// turns it on for the channel.
    async fn should_download_vod(&self, platform: Platform, identifier: &str) -> bool;
}

/// Global last-known liveness per (platform, identifier).
#[async_trait]
pub trait StreamStateRepository: Send + Sync {
    /// Absent keys read as the default state (offline, never notified);
    /// never an error.
    async fn get(&self, platform: Platform, identifier: &str) -> StreamState;

    /// Shallow-merges `update` over the stored state and persists
    /// before returning, so a read after this call never sees the old
    /// value.
    async fn update(&self, platform: Platform, identifier: &str, update: StreamStateUpdate);
}
