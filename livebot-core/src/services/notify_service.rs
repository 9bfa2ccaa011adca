// File: livebot-core/src/services/notify_service.rs

//! Fan-out of live events to every subscribing guild destination.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use livebot_common::models::{GuildConfig, LiveInfo, Platform};
use livebot_common::traits::platform_traits::NotifyChannelApi;
use livebot_common::traits::repository_traits::GuildConfigRepository;

/// How much history the stateless dedupe scan reads.
const HISTORY_SCAN_LIMIT: u16 = 20;

pub struct NotifyService {
    guild_repo: Arc<dyn GuildConfigRepository>,
    channel_api: Arc<dyn NotifyChannelApi>,
    /// With a durable store the stream-state ledger is the sole dedupe
    /// source. Stateless deployments (fresh disk every boot) fall back
    /// to scanning the destination's own message history.
    has_durable_persistence: bool,
}

impl NotifyService {
    pub fn new(
        guild_repo: Arc<dyn GuildConfigRepository>,
        channel_api: Arc<dyn NotifyChannelApi>,
        has_durable_persistence: bool,
    ) -> Self {
        Self {
            guild_repo,
            channel_api,
            has_durable_persistence,
        }
    }

    /// Fans a live event out to every guild watching the channel. Each
    /// destination fails independently; one broken guild never blocks
    /// the rest.
    pub async fn broadcast_live(&self, platform: Platform, identifier: &str, info: &LiveInfo) {
        let url = platform.channel_url(identifier);

        for (guild_id, config) in self.guild_repo.all_guilds().await {
            if config.notify_channel_id.is_none() {
                continue;
            }
            if !config.watched.iter().any(|w| w.matches(platform, identifier)) {
                continue;
            }
            self.notify_guild(&guild_id, &config, platform, identifier, info, &url)
                .await;
        }
    }

    async fn notify_guild(
        &self,
        guild_id: &str,
        config: &GuildConfig,
        platform: Platform,
        identifier: &str,
        info: &LiveInfo,
        url: &str,
    ) {
        let Some(channel_id) = config.notify_channel_id.as_deref() else {
            return;
        };

        match self.channel_api.channel_exists(channel_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!("Notify channel {channel_id} missing for guild {guild_id}");
                return;
            }
            Err(e) => {
                warn!("Could not resolve notify channel {channel_id} for guild {guild_id}: {e}");
                return;
            }
        }

        let perms = match self.channel_api.channel_permissions(channel_id).await {
            Ok(perms) => perms,
            Err(e) => {
                error!("Permission check failed for channel {channel_id} in guild {guild_id}: {e}");
                return;
            }
        };
        if !perms.view_channel || !perms.send_messages || !perms.read_history {
            error!(
                "Missing channel permissions in guild {guild_id} (view={}, send={}, history={})",
                perms.view_channel, perms.send_messages, perms.read_history
            );
            return;
        }

        if !self.has_durable_persistence
            && self.already_announced(channel_id, guild_id, url, info).await
        {
            debug!("{platform}:{identifier} already announced in channel {channel_id}; skipping");
            return;
        }

        let mention = if config.mentions_enabled {
            if perms.mention_everyone {
                "@everyone "
            } else {
                warn!(
                    "Mentions enabled for guild {guild_id} but 'Mention Everyone' permission is missing"
                );
                ""
            }
        } else {
            ""
        };
        let mention_scope = config.mentions_enabled && perms.mention_everyone;

        let content = format!(
            "{mention}🔴 {} | **{}** is live! {url}\n> **{}**\n> 🎮 {}",
            platform.label(),
            info.display_name,
            info.title,
            info.category,
        );

        match self
            .channel_api
            .send_message(channel_id, &content, mention_scope)
            .await
        {
            Ok(()) => info!("Notified guild {guild_id} that {platform}:{identifier} is live"),
            Err(e) => error!("Failed to send notification to guild {guild_id}: {e}"),
        }
    }

    /// Stateless-mode dedupe: if one of the destination's recent
    /// messages is ours, carries this channel's URL, and is no older
    /// than the stream start, the event was already announced (likely
    /// by a previous deployment of this process).
    async fn already_announced(
        &self,
        channel_id: &str,
        guild_id: &str,
        url: &str,
        info: &LiveInfo,
    ) -> bool {
        let history = match self
            .channel_api
            .recent_messages(channel_id, HISTORY_SCAN_LIMIT)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                // Fail closed: without history we cannot rule out a
                // duplicate, and a missed ping beats a double ping.
                warn!(
                    "History fetch failed for channel {channel_id} in guild {guild_id}: {e}; skipping send"
                );
                return true;
            }
        };
        history
            .iter()
            .any(|m| m.author_is_self && m.content.contains(url) && m.timestamp >= info.started_at)
    }
}
