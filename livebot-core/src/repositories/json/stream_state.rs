// File: livebot-core/src/repositories/json/stream_state.rs

use std::sync::Arc;

use async_trait::async_trait;

use livebot_common::models::{Platform, StreamState, StreamStateUpdate};
use livebot_common::traits::repository_traits::StreamStateRepository;

use crate::store::JsonStore;

#[derive(Clone)]
pub struct JsonStreamStateRepository {
    store: Arc<JsonStore>,
}

impl JsonStreamStateRepository {
    pub fn new(store: Arc<JsonStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl StreamStateRepository for JsonStreamStateRepository {
    async fn get(&self, platform: Platform, identifier: &str) -> StreamState {
        let key = JsonStore::state_key(platform, identifier);
        self.store
            .read(|doc| doc.stream_state.get(&key).cloned().unwrap_or_default())
            .await
    }

    async fn update(&self, platform: Platform, identifier: &str, update: StreamStateUpdate) {
        let key = JsonStore::state_key(platform, identifier);
        self.store
            .mutate(|doc| doc.stream_state.entry(key).or_default().apply(update))
            .await
    }
}
