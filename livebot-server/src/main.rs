use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use livebot_common::traits::platform_traits::StreamProbe;
use livebot_core::http::DefaultHttpClient;
use livebot_core::platforms::discord::DiscordPlatform;
use livebot_core::platforms::kick::KickProbe;
use livebot_core::platforms::twitch::{TwitchAuthenticator, TwitchProbe};
use livebot_core::repositories::{JsonGuildConfigRepository, JsonStreamStateRepository};
use livebot_core::services::notify_service::NotifyService;
use livebot_core::services::stream_service::StreamService;
use livebot_core::store::JsonStore;
use livebot_core::tasks::stream_monitor::{StreamMonitor, spawn_stream_monitor_task};

mod http;

#[derive(Parser, Debug, Clone)]
#[command(name = "livebot")]
#[command(author, version, about = "Twitch/Kick live notifications for Discord")]
struct Args {
    /// Address for the trigger/health HTTP server
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind_addr: String,

    /// Path to the JSON state document
    #[arg(long, default_value = "data/livebot.json")]
    data_path: String,

    /// Seconds between poll cycles
    #[arg(long, default_value_t = 60)]
    poll_interval: u64,

    /// Whether the data path survives restarts. When disabled the
    /// dispatcher falls back to scanning each destination's recent
    /// history for duplicates.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    durable_persistence: bool,

    /// Disable the in-process polling timer (cron-trigger-only mode)
    #[arg(long, default_value_t = false)]
    no_timer: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let discord_token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN is missing from the environment"))?;

    let store = Arc::new(JsonStore::open(&args.data_path));
    let guild_repo = Arc::new(JsonGuildConfigRepository::new(store.clone()));
    let state_repo = Arc::new(JsonStreamStateRepository::new(store.clone()));

    let http_client = Arc::new(DefaultHttpClient::new());

    let mut probes: Vec<Arc<dyn StreamProbe>> = Vec::new();
    match (
        std::env::var("TWITCH_CLIENT_ID"),
        std::env::var("TWITCH_CLIENT_SECRET"),
    ) {
        (Ok(client_id), Ok(client_secret)) => {
            let auth = Arc::new(TwitchAuthenticator::new(
                client_id,
                client_secret,
                http_client.clone(),
            ));
            probes.push(Arc::new(TwitchProbe::new(auth, http_client.clone())));
        }
        _ => {
            warn!("TWITCH_CLIENT_ID / TWITCH_CLIENT_SECRET missing; Twitch monitoring disabled");
        }
    }
    probes.push(Arc::new(KickProbe::new(http_client.clone())));

    let discord = Arc::new(DiscordPlatform::new(discord_token));
    let notify = Arc::new(NotifyService::new(
        guild_repo.clone(),
        discord,
        args.durable_persistence,
    ));
    let stream_service = Arc::new(StreamService::new(state_repo, notify));
    let monitor = Arc::new(StreamMonitor::new(guild_repo, probes, stream_service));

    if args.no_timer {
        info!("In-process polling timer disabled; cycles run only via /cron");
    } else {
        spawn_stream_monitor_task(monitor.clone(), Duration::from_secs(args.poll_interval));
    }

    let cron_secret = std::env::var("CRON_SECRET").ok();
    http::serve(&args.bind_addr, monitor, cron_secret).await?;
    Ok(())
}
