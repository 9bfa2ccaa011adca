// File: livebot-core/src/platforms/discord/runtime.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use twilight_http::Client as HttpClient;
use twilight_http::client::ClientBuilder;
use twilight_http::error::ErrorType;
use twilight_model::channel::Channel;
use twilight_model::channel::message::{AllowedMentions, MentionType};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::{ChannelMarker, RoleMarker, UserMarker};
use twilight_util::permission_calculator::PermissionCalculator;

use livebot_common::Error;
use livebot_common::traits::platform_traits::{ChannelMessage, ChannelPermissions, NotifyChannelApi};

/// Discord delivery backend over the REST API.
///
/// No gateway session: the dispatcher only ever sends, inspects
/// permissions, and reads recent history, all of which are plain HTTP.
/// The bot's own user id is resolved once and cached for the life of
/// the process.
pub struct DiscordPlatform {
    http: HttpClient,
    current_user_id: Mutex<Option<Id<UserMarker>>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        let http = ClientBuilder::new()
            .token(token)
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            http,
            current_user_id: Mutex::new(None),
        }
    }

    async fn current_user_id(&self) -> Result<Id<UserMarker>, Error> {
        let mut cached = self.current_user_id.lock().await;
        if let Some(id) = *cached {
            return Ok(id);
        }
        let user = self
            .http
            .current_user()
            .await
            .map_err(|e| Error::Platform(format!("Error fetching current user: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Parse(format!("Error parsing current user: {e}")))?;
        debug!("Resolved own Discord user id: {}", user.id);
        *cached = Some(user.id);
        Ok(user.id)
    }

    fn parse_channel_id(channel_id: &str) -> Result<Id<ChannelMarker>, Error> {
        let raw: u64 = channel_id
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid channel ID: {channel_id}")))?;
        Ok(Id::new(raw))
    }

    /// Ok(None) when Discord reports the channel as gone (404); other
    /// failures are real errors.
    async fn fetch_channel(&self, channel_id: Id<ChannelMarker>) -> Result<Option<Channel>, Error> {
        match self.http.channel(channel_id).await {
            Ok(response) => {
                let channel = response
                    .model()
                    .await
                    .map_err(|e| Error::Parse(format!("Error parsing channel: {e}")))?;
                Ok(Some(channel))
            }
            Err(e) => match e.kind() {
                ErrorType::Response { status, .. } if status.get() == 404 => Ok(None),
                _ => Err(Error::Platform(format!("Error fetching channel: {e}"))),
            },
        }
    }

    async fn compute_permissions(&self, channel: &Channel) -> Result<ChannelPermissions, Error> {
        let guild_id = channel
            .guild_id
            .ok_or_else(|| Error::Platform("Destination channel is not in a guild".into()))?;
        let user_id = self.current_user_id().await?;

        let member = self
            .http
            .guild_member(guild_id, user_id)
            .await
            .map_err(|e| Error::Platform(format!("Error fetching own guild member: {e}")))?
            .model()
            .await
            .map_err(|e| Error::Parse(format!("Error parsing guild member: {e}")))?;

        let roles = self
            .http
            .roles(guild_id)
            .await
            .map_err(|e| Error::Platform(format!("Error fetching guild roles: {e}")))?
            .models()
            .await
            .map_err(|e| Error::Parse(format!("Error parsing guild roles: {e}")))?;

        // The @everyone role shares the guild's id.
        let everyone = roles
            .iter()
            .find(|role| role.id.get() == guild_id.get())
            .map(|role| role.permissions)
            .unwrap_or_else(Permissions::empty);

        let member_roles: Vec<(Id<RoleMarker>, Permissions)> = roles
            .iter()
            .filter(|role| member.roles.contains(&role.id))
            .map(|role| (role.id, role.permissions))
            .collect();

        let calculator = PermissionCalculator::new(guild_id, user_id, everyone, &member_roles);
        let overwrites = channel.permission_overwrites.clone().unwrap_or_default();
        let permissions = calculator.in_channel(channel.kind, &overwrites);

        Ok(ChannelPermissions {
            view_channel: permissions.contains(Permissions::VIEW_CHANNEL),
            send_messages: permissions.contains(Permissions::SEND_MESSAGES),
            read_history: permissions.contains(Permissions::READ_MESSAGE_HISTORY),
            mention_everyone: permissions.contains(Permissions::MENTION_EVERYONE),
        })
    }
}

fn timestamp_to_utc(timestamp: twilight_model::util::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp_micros(timestamp.as_micros()).unwrap_or_else(Utc::now)
}

#[async_trait]
impl NotifyChannelApi for DiscordPlatform {
    async fn channel_exists(&self, channel_id: &str) -> Result<bool, Error> {
        let channel_id = Self::parse_channel_id(channel_id)?;
        Ok(self.fetch_channel(channel_id).await?.is_some())
    }

    async fn channel_permissions(&self, channel_id: &str) -> Result<ChannelPermissions, Error> {
        let parsed = Self::parse_channel_id(channel_id)?;
        let channel = self
            .fetch_channel(parsed)
            .await?
            .ok_or_else(|| Error::NotFound(format!("channel {channel_id}")))?;
        self.compute_permissions(&channel).await
    }

    async fn recent_messages(
        &self,
        channel_id: &str,
        limit: u16,
    ) -> Result<Vec<ChannelMessage>, Error> {
        let parsed = Self::parse_channel_id(channel_id)?;
        let self_id = self.current_user_id().await?;
        let messages = self
            .http
            .channel_messages(parsed)
            .limit(limit)
            .await
            .map_err(|e| Error::Platform(format!("Error fetching channel history: {e}")))?
            .models()
            .await
            .map_err(|e| Error::Parse(format!("Error parsing channel history: {e}")))?;

        Ok(messages
            .into_iter()
            .map(|message| ChannelMessage {
                author_is_self: message.author.id == self_id,
                content: message.content,
                timestamp: timestamp_to_utc(message.timestamp),
            })
            .collect())
    }

    async fn send_message(
        &self,
        channel_id: &str,
        content: &str,
        mention_everyone: bool,
    ) -> Result<(), Error> {
        let parsed = Self::parse_channel_id(channel_id)?;
        let allowed = if mention_everyone {
            AllowedMentions {
                parse: vec![MentionType::Everyone],
                ..AllowedMentions::default()
            }
        } else {
            AllowedMentions::default()
        };
        self.http
            .create_message(parsed)
            .content(content)
            .allowed_mentions(Some(&allowed))
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e}")))?;
        Ok(())
    }
}
