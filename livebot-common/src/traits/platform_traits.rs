// File: livebot-common/src/traits/platform_traits.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::models::{LiveInfo, Platform};

/// A live-status probe for one platform.
///
/// Implementations must never let an upstream failure escape this
/// boundary: a channel that cannot be checked is reported as absent
/// (offline), so one bad channel or a platform outage cannot corrupt a
/// poll cycle.
#[async_trait]
pub trait StreamProbe: Send + Sync {
    fn platform(&self) -> Platform;

    /// Live status for a single identifier.
    async fn check(&self, identifier: &str) -> Option<LiveInfo>;

    /// Live status for a set of identifiers. Keys are lowercased; a
    /// missing key means offline (or could-not-check). The default
    /// walks `check` one identifier at a time; platforms with a bulk
    /// endpoint override it.
    async fn check_all(&self, identifiers: &[String]) -> HashMap<String, LiveInfo> {
        let mut online = HashMap::new();
        for identifier in identifiers {
            if let Some(info) = self.check(identifier).await {
                online.insert(identifier.to_lowercase(), info);
            }
        }
        online
    }
}

/// Effective permissions the bot holds in a destination channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelPermissions {
    pub view_channel: bool,
    pub send_messages: bool,
    pub read_history: bool,
    pub mention_everyone: bool,
}

/// A recent message in a destination channel; just enough of it for the
/// history-scan dedupe.
#[derive(Debug, Clone)]
pub struct ChannelMessage {
    pub author_is_self: bool,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Delivery-side abstraction over the messaging platform: resolve a
/// destination, inspect the bot's permissions there, read recent
/// history, send a message.
#[async_trait]
pub trait NotifyChannelApi: Send + Sync {
    /// Ok(false) when the channel no longer exists (or the bot cannot
    /// see it at all).
    async fn channel_exists(&self, channel_id: &str) -> Result<bool, Error>;

    async fn channel_permissions(&self, channel_id: &str) -> Result<ChannelPermissions, Error>;

    /// Newest-first recent messages from the destination.
    async fn recent_messages(&self, channel_id: &str, limit: u16) -> Result<Vec<ChannelMessage>, Error>;

    /// `mention_everyone` sets the allowed-mentions scope: when false,
    /// an `@everyone` inside the content must not actually ping.
    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> Result<(), Error>;
}
