pub mod json;

pub use json::{JsonGuildConfigRepository, JsonStreamStateRepository};
