pub mod guild_config;
pub mod stream_state;

pub use guild_config::JsonGuildConfigRepository;
pub use stream_state::JsonStreamStateRepository;
