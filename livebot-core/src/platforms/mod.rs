// File: livebot-core/src/platforms/mod.rs

pub mod discord;
pub mod kick;
pub mod twitch;

pub use livebot_common::traits::platform_traits::{NotifyChannelApi, StreamProbe};
