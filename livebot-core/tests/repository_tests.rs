// File: livebot-core/tests/repository_tests.rs
//
// The JSON store and both repositories over it: defaults, merge
// semantics, reload round-trips, and the watch-registry policies.

use std::sync::Arc;

use livebot_common::models::{Platform, StreamStateUpdate, StreamStatus};
use livebot_common::traits::repository_traits::{GuildConfigRepository, StreamStateRepository};
use livebot_core::repositories::{JsonGuildConfigRepository, JsonStreamStateRepository};
use livebot_core::store::JsonStore;

fn open_repos(path: &std::path::Path) -> (JsonGuildConfigRepository, JsonStreamStateRepository) {
    let store = Arc::new(JsonStore::open(path));
    (
        JsonGuildConfigRepository::new(store.clone()),
        JsonStreamStateRepository::new(store),
    )
}

#[tokio::test]
async fn unseen_channel_reads_as_default_offline_state() {
    let dir = tempfile::tempdir().unwrap();
    let (_, states) = open_repos(&dir.path().join("db.json"));

    let state = states.get(Platform::Twitch, "never_seen").await;
    assert_eq!(state.last_status, StreamStatus::Offline);
    assert!(state.last_notified.is_none());
    assert!(state.last_stream_id.is_none());
}

#[tokio::test]
async fn update_merges_shallowly_over_existing_state() {
    let dir = tempfile::tempdir().unwrap();
    let (_, states) = open_repos(&dir.path().join("db.json"));

    states
        .update(
            Platform::Twitch,
            "streamer",
            StreamStateUpdate {
                last_status: Some(StreamStatus::Online),
                last_notified: Some(chrono::Utc::now()),
                last_stream_id: Some("A".to_string()),
            },
        )
        .await;

    // Status-only patch: the other fields must survive.
    states
        .update(
            Platform::Twitch,
            "streamer",
            StreamStateUpdate {
                last_status: Some(StreamStatus::Offline),
                ..Default::default()
            },
        )
        .await;

    let state = states.get(Platform::Twitch, "streamer").await;
    assert_eq!(state.last_status, StreamStatus::Offline);
    assert_eq!(state.last_stream_id.as_deref(), Some("A"));
    assert!(state.last_notified.is_some());
}

#[tokio::test]
async fn state_keys_are_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let (_, states) = open_repos(&dir.path().join("db.json"));

    states
        .update(
            Platform::Kick,
            "StreamerName",
            StreamStateUpdate {
                last_status: Some(StreamStatus::Online),
                ..Default::default()
            },
        )
        .await;

    let state = states.get(Platform::Kick, "streamername").await;
    assert_eq!(state.last_status, StreamStatus::Online);
}

#[tokio::test]
async fn document_survives_a_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    {
        let (guilds, states) = open_repos(&path);
        guilds.set_notify_channel("guild-1", "100", true).await;
        guilds.add_watch("guild-1", Platform::Twitch, "streamer").await;
        states
            .update(
                Platform::Twitch,
                "streamer",
                StreamStateUpdate {
                    last_status: Some(StreamStatus::Online),
                    last_stream_id: Some("A".to_string()),
                    ..Default::default()
                },
            )
            .await;
    }

    // Fresh store over the same file.
    let (guilds, states) = open_repos(&path);
    let config = guilds.get_or_create("guild-1").await;
    assert_eq!(config.notify_channel_id.as_deref(), Some("100"));
    assert!(config.mentions_enabled);
    assert_eq!(config.watched.len(), 1);

    let state = states.get(Platform::Twitch, "streamer").await;
    assert_eq!(state.last_status, StreamStatus::Online);
    assert_eq!(state.last_stream_id.as_deref(), Some("A"));
}

#[tokio::test]
async fn corrupt_document_starts_from_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");
    std::fs::write(&path, "{not valid json").unwrap();

    let (guilds, states) = open_repos(&path);
    assert!(guilds.all_guilds().await.is_empty());
    let state = states.get(Platform::Twitch, "anyone").await;
    assert_eq!(state.last_status, StreamStatus::Offline);
}

#[tokio::test]
async fn add_watch_rejects_case_insensitive_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let (guilds, _) = open_repos(&dir.path().join("db.json"));

    assert!(guilds.add_watch("guild-1", Platform::Twitch, "Streamer").await);
    assert!(!guilds.add_watch("guild-1", Platform::Twitch, "streamer").await);
    // Same identifier on the other platform is a distinct entry.
    assert!(guilds.add_watch("guild-1", Platform::Kick, "streamer").await);

    assert_eq!(guilds.watch_list("guild-1").await.len(), 2);
}

#[tokio::test]
async fn remove_watch_reports_whether_anything_changed() {
    let dir = tempfile::tempdir().unwrap();
    let (guilds, _) = open_repos(&dir.path().join("db.json"));

    guilds.add_watch("guild-1", Platform::Twitch, "streamer").await;
    assert!(guilds.remove_watch("guild-1", Platform::Twitch, "STREAMER").await);
    assert!(!guilds.remove_watch("guild-1", Platform::Twitch, "streamer").await);
    assert!(guilds.watch_list("guild-1").await.is_empty());
}

#[tokio::test]
async fn watched_channel_union_excludes_guilds_without_a_destination() {
    let dir = tempfile::tempdir().unwrap();
    let (guilds, _) = open_repos(&dir.path().join("db.json"));

    guilds.set_notify_channel("configured", "100", false).await;
    guilds.add_watch("configured", Platform::Twitch, "Alpha").await;
    guilds.add_watch("configured", Platform::Kick, "beta").await;

    // Watch entries but no destination: deliberately ignored.
    guilds.add_watch("unconfigured", Platform::Twitch, "gamma").await;

    let watched = guilds.get_all_watched_channels().await;
    assert_eq!(
        watched.twitch.iter().cloned().collect::<Vec<_>>(),
        vec!["alpha".to_string()]
    );
    assert_eq!(
        watched.kick.iter().cloned().collect::<Vec<_>>(),
        vec!["beta".to_string()]
    );
}

#[tokio::test]
async fn watched_channel_union_dedupes_across_guilds() {
    let dir = tempfile::tempdir().unwrap();
    let (guilds, _) = open_repos(&dir.path().join("db.json"));

    guilds.set_notify_channel("guild-1", "100", false).await;
    guilds.add_watch("guild-1", Platform::Twitch, "Streamer").await;
    guilds.set_notify_channel("guild-2", "200", false).await;
    guilds.add_watch("guild-2", Platform::Twitch, "STREAMER").await;

    let watched = guilds.get_all_watched_channels().await;
    assert_eq!(watched.twitch.len(), 1);
}

#[tokio::test]
async fn vod_flag_requires_a_watched_entry_and_ors_across_guilds() {
    let dir = tempfile::tempdir().unwrap();
    let (guilds, _) = open_repos(&dir.path().join("db.json"));

    // Not watched yet: refuse the toggle.
    assert!(
        !guilds
            .set_vod_enabled("guild-1", Platform::Kick, "streamer", true)
            .await
    );

    guilds.add_watch("guild-1", Platform::Kick, "streamer").await;
    guilds.add_watch("guild-2", Platform::Kick, "streamer").await;
    assert!(!guilds.should_download_vod(Platform::Kick, "streamer").await);

    // One guild opting in flips the channel-wide policy.
    assert!(
        guilds
            .set_vod_enabled("guild-1", Platform::Kick, "streamer", true)
            .await
    );
    assert!(guilds.should_download_vod(Platform::Kick, "streamer").await);

    // And opting back out clears it when no other guild wants VODs.
    guilds
        .set_vod_enabled("guild-1", Platform::Kick, "streamer", false)
        .await;
    assert!(!guilds.should_download_vod(Platform::Kick, "streamer").await);
}

#[tokio::test]
async fn get_or_create_is_lazy_and_persistent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("db.json");

    {
        let (guilds, _) = open_repos(&path);
        let config = guilds.get_or_create("guild-1").await;
        assert!(config.notify_channel_id.is_none());
        assert!(!config.mentions_enabled);
        assert!(config.watched.is_empty());
    }

    let (guilds, _) = open_repos(&path);
    assert_eq!(guilds.all_guilds().await.len(), 1);
}
