// File: livebot-core/src/tasks/stream_monitor.rs

//! The recurring poll cycle: collect the watched channel set, run the
//! platform probes, and feed every result through the transition
//! engine.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Mutex;
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

use livebot_common::models::LiveInfo;
use livebot_common::traits::platform_traits::StreamProbe;
use livebot_common::traits::repository_traits::GuildConfigRepository;

use crate::services::stream_service::StreamService;

pub struct StreamMonitor {
    guild_repo: Arc<dyn GuildConfigRepository>,
    probes: Vec<Arc<dyn StreamProbe>>,
    stream_service: Arc<StreamService>,
    cycle_lock: Mutex<()>,
}

impl StreamMonitor {
    pub fn new(
        guild_repo: Arc<dyn GuildConfigRepository>,
        probes: Vec<Arc<dyn StreamProbe>>,
        stream_service: Arc<StreamService>,
    ) -> Self {
        Self {
            guild_repo,
            probes,
            stream_service,
            cycle_lock: Mutex::new(()),
        }
    }

    /// Runs one full poll cycle, unless one is already in flight.
    /// Returns false when this tick was skipped by the guard.
    pub async fn tick(&self) -> bool {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!("Previous poll cycle still running; skipping this tick");
            return false;
        };
        self.run_cycle().await;
        true
    }

    async fn run_cycle(&self) {
        let watched = self.guild_repo.get_all_watched_channels().await;
        if watched.is_empty() {
            debug!("No watched channels; nothing to poll");
            return;
        }

        // All platforms probe concurrently. Within Kick the per-channel
        // fetches are already parallel; within Twitch the batch calls
        // are sequential.
        let checks = self.probes.iter().map(|probe| {
            let platform = probe.platform();
            let identifiers: Vec<String> =
                watched.for_platform(platform).iter().cloned().collect();
            async move {
                let online: HashMap<String, LiveInfo> = if identifiers.is_empty() {
                    HashMap::new()
                } else {
                    probe.check_all(&identifiers).await
                };
                (platform, identifiers, online)
            }
        });

        for (platform, identifiers, mut online) in join_all(checks).await {
            for identifier in &identifiers {
                let info = online.remove(&identifier.to_lowercase());
                self.stream_service
                    .handle_probe_result(platform, identifier, info)
                    .await;
            }
        }
    }
}

/// Spawns the recurring monitor task: an immediate first cycle, then
/// one per interval.
pub fn spawn_stream_monitor_task(
    monitor: Arc<StreamMonitor>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("Stream monitor started (interval {poll_interval:?})");
        let mut ticker = interval(poll_interval);
        loop {
            ticker.tick().await;
            monitor.tick().await;
        }
    })
}
