pub mod platform;
pub mod stream;
pub mod watch;

pub use platform::Platform;
pub use stream::{LiveInfo, StreamState, StreamStateUpdate, StreamStatus};
pub use watch::{GuildConfig, WatchEntry, WatchedChannels};
