// File: livebot-core/src/services/stream_service.rs

//! Per-channel state transitions between poll cycles.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use livebot_common::models::{LiveInfo, Platform, StreamState, StreamStateUpdate, StreamStatus};
use livebot_common::traits::repository_traits::StreamStateRepository;

use crate::services::notify_service::NotifyService;

pub struct StreamService {
    state_repo: Arc<dyn StreamStateRepository>,
    notify: Arc<NotifyService>,
}

impl StreamService {
    pub fn new(state_repo: Arc<dyn StreamStateRepository>, notify: Arc<NotifyService>) -> Self {
        Self { state_repo, notify }
    }

    /// Applies one probe result to the stored state for a channel,
    /// broadcasting when the result amounts to a new live session.
    pub async fn handle_probe_result(
        &self,
        platform: Platform,
        identifier: &str,
        probe: Option<LiveInfo>,
    ) {
        let current = self.state_repo.get(platform, identifier).await;

        match probe {
            Some(info) => {
                self.handle_live(platform, identifier, current, info).await;
            }
            None => {
                if current.last_status == StreamStatus::Online {
                    info!("{platform}:{identifier} went offline");
                    // Only the status flips; the session id survives
                    // the offline dip so a same-id recovery stays
                    // deduped.
                    self.state_repo
                        .update(
                            platform,
                            identifier,
                            StreamStateUpdate {
                                last_status: Some(StreamStatus::Offline),
                                ..Default::default()
                            },
                        )
                        .await;
                }
            }
        }
    }

    async fn handle_live(
        &self,
        platform: Platform,
        identifier: &str,
        current: StreamState,
        info: LiveInfo,
    ) {
        // A probe result without a session id gets a synthetic one.
        // That defeats restart dedupe for this result (every cycle
        // looks like a new session), which we accept over guessing
        // broadcast identity.
        let session_id = info
            .session_id
            .clone()
            .unwrap_or_else(|| format!("session-{}", Utc::now().timestamp_millis()));

        let already_notified = current.last_stream_id.as_deref() == Some(session_id.as_str());

        if current.last_status == StreamStatus::Online && already_notified {
            // Same broadcast as last cycle.
            return;
        }

        if already_notified {
            // Offline in our books, but this exact session was already
            // announced (a prior cycle or process lifetime). Catch the
            // status up without a second ping.
            debug!("{platform}:{identifier} already notified for session {session_id}");
            self.state_repo
                .update(
                    platform,
                    identifier,
                    StreamStateUpdate {
                        last_status: Some(StreamStatus::Online),
                        ..Default::default()
                    },
                )
                .await;
            return;
        }

        if current.last_status == StreamStatus::Online {
            info!("{platform}:{identifier} restarted without an offline tick (session {session_id})");
        } else {
            info!("{platform}:{identifier} went live (session {session_id})");
        }

        self.notify.broadcast_live(platform, identifier, &info).await;

        self.state_repo
            .update(
                platform,
                identifier,
                StreamStateUpdate {
                    last_status: Some(StreamStatus::Online),
                    last_notified: Some(Utc::now()),
                    last_stream_id: Some(session_id),
                },
            )
            .await;
    }
}
