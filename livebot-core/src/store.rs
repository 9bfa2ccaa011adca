// File: livebot-core/src/store.rs

//! Whole-document JSON persistence.
//!
//! All bot state lives in one JSON file: a `guilds` map and a
//! `streamState` map, read once at startup and rewritten in full on
//! every mutation. A missing or corrupt file starts the process from
//! defaults; a failed write keeps serving the in-memory document until
//! the next write succeeds.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{error, warn};

use livebot_common::models::{GuildConfig, Platform, StreamState};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoreDocument {
    pub guilds: HashMap<String, GuildConfig>,
    pub stream_state: HashMap<String, StreamState>,
}

pub struct JsonStore {
    path: PathBuf,
    doc: RwLock<StoreDocument>,
}

impl JsonStore {
    /// Opens the store, loading the existing document if one is
    /// present.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<StoreDocument>(&contents) {
                Ok(doc) => doc,
                Err(e) => {
                    error!(
                        "Failed to parse store at {}: {e}; starting from defaults",
                        path.display()
                    );
                    StoreDocument::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => {
                error!(
                    "Failed to read store at {}: {e}; starting from defaults",
                    path.display()
                );
                StoreDocument::default()
            }
        };
        Self {
            path,
            doc: RwLock::new(doc),
        }
    }

    /// Read access to the current document.
    pub async fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> T) -> T {
        let guard = self.doc.read().await;
        f(&*guard)
    }

    /// Mutates the document and rewrites the file before returning.
    /// Write failures are logged and swallowed: the in-memory document
    /// remains authoritative and the next mutation retries the write.
    pub async fn mutate<T>(&self, f: impl FnOnce(&mut StoreDocument) -> T) -> T {
        let mut guard = self.doc.write().await;
        let out = f(&mut *guard);
        if let Err(e) = self.persist(&guard) {
            warn!("Failed to persist store to {}: {e}", self.path.display());
        }
        out
    }

    fn persist(&self, doc: &StoreDocument) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(doc).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, json)
    }

    /// Key into the global stream-state map. Identifiers are
    /// case-insensitive on both platforms, so they are lowercased here.
    pub fn state_key(platform: Platform, identifier: &str) -> String {
        format!("{platform}:{}", identifier.to_lowercase())
    }
}
