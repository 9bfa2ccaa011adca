// File: livebot-common/src/models/platform.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The livestream platforms the bot can watch.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Kick,
}

impl Platform {
    /// Canonical channel URL, as posted in notifications and matched by
    /// the history-scan dedupe.
    pub fn channel_url(&self, identifier: &str) -> String {
        match self {
            Platform::Twitch => format!("https://twitch.tv/{identifier}"),
            Platform::Kick => format!("https://kick.com/{identifier}"),
        }
    }

    /// Display label with the platform's own capitalization.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Twitch => "Twitch",
            Platform::Kick => "Kick",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Twitch => write!(f, "twitch"),
            Platform::Kick => write!(f, "kick"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitch" => Ok(Platform::Twitch),
            "kick" => Ok(Platform::Kick),
            _ => Err(format!("Unknown platform: {}", s)),
        }
    }
}
