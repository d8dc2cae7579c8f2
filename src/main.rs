//! ntfy-bridge binary entry point.
//!
//! Subcommands: `start` (poll loop + stdin command surface),
//! `check-config`, and `publish` (one-shot outbound publish).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use ntfy_bridge::adapters::cli;
use ntfy_bridge::bridge::outbound::GateOutcome;
use ntfy_bridge::bridge::{
    ChannelSink, ConnectionGuard, NotificationSource, OutboundGate, PollEngine, Publisher,
};
use ntfy_bridge::config::{self, Config};
use ntfy_bridge::logging;
use ntfy_bridge::ntfy::NtfyClient;

#[derive(Parser)]
#[command(name = "ntfy-bridge", version, about = "Bridge between a chat surface and ntfy topics")]
struct Cli {
    /// Path to config.toml (default: ~/.ntfy-bridge/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the bridge: inbound poll loop plus the stdin command surface.
    Start,
    /// Load and validate the configuration, then exit.
    CheckConfig,
    /// Publish one message through the outbound gate, then exit.
    Publish {
        /// Message body to publish.
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config::config_dir()?.join("config.toml"),
    };

    match cli.command {
        Command::Start => run_start(&config_path).await,
        Command::CheckConfig => run_check_config(&config_path),
        Command::Publish { message } => run_publish(&config_path, &message).await,
    }
}

/// Load and validate config, failing with context on either step.
fn load_validated(config_path: &Path) -> anyhow::Result<Config> {
    let config = config::load_config(config_path).context("failed to load configuration")?;
    config
        .ntfy
        .validate()
        .context("ntfy configuration is incomplete")?;
    Ok(config)
}

async fn run_start(config_path: &Path) -> anyhow::Result<()> {
    let config = load_validated(config_path)?;

    let logs_dir = config::config_dir()?.join("logs");
    let _logging_guard = logging::init_production(&logs_dir)?;
    info!(version = env!("CARGO_PKG_VERSION"), "ntfy-bridge starting");

    let client = Arc::new(NtfyClient::new(
        &config.ntfy.host,
        &config.ntfy.token,
        &config.ntfy.subscribe_topic,
    ));
    let connection = Arc::new(ConnectionGuard::new());

    let (outbound_tx, outbound_rx) = mpsc::channel(64);
    let sink = Arc::new(ChannelSink::new(outbound_tx));

    let source: Arc<dyn NotificationSource> = client.clone();
    let publisher: Arc<dyn Publisher> = client.clone();

    let engine = Arc::new(PollEngine::new(
        source,
        sink,
        Arc::clone(&connection),
        config.poll.dispatch_delay(),
    ));
    engine.start();

    let gate = OutboundGate::new(publisher, Arc::clone(&connection), &config.ntfy);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = {
        let engine = Arc::clone(&engine);
        let interval = config.poll.interval();
        tokio::spawn(async move { engine.run(interval, shutdown_rx).await })
    };

    info!("ntfy-bridge ready; commands: /ntfy <text>, /ntfy_test");
    cli::run(&gate, &config.ntfy, outbound_rx).await?;

    engine.stop();
    let _ = shutdown_tx.send(true);
    if let Err(e) = poller.await {
        warn!(error = %e, "poller task join failed");
    }

    info!("ntfy-bridge shut down cleanly");
    Ok(())
}

fn run_check_config(config_path: &Path) -> anyhow::Result<()> {
    logging::init_cli();
    let config = load_validated(config_path)?;
    println!(
        "config OK: host={} subscribe_topic={} publish_topic={} senders={}",
        config.ntfy.host,
        config.ntfy.subscribe_topic,
        config.ntfy.resolved_publish_topic().unwrap_or_default(),
        config.ntfy.authorized_senders().len(),
    );
    Ok(())
}

async fn run_publish(config_path: &Path, message: &str) -> anyhow::Result<()> {
    logging::init_cli();
    let config = load_validated(config_path)?;

    let client = Arc::new(NtfyClient::new(
        &config.ntfy.host,
        &config.ntfy.token,
        &config.ntfy.subscribe_topic,
    ));
    let connection = Arc::new(ConnectionGuard::new());
    let gate = OutboundGate::new(client, connection, &config.ntfy);

    let event = cli::owner_event(&config.ntfy, message);
    match gate.try_publish(&event, message).await {
        GateOutcome::Attempted(Ok(_)) => {
            println!("published to {}", gate.topic().unwrap_or_default());
            Ok(())
        }
        GateOutcome::Attempted(Err(e)) => Err(anyhow::anyhow!("publish failed: {e}")),
        GateOutcome::Denied => Err(anyhow::anyhow!("sender is not allow-listed")),
        GateOutcome::NoTopic => Err(anyhow::anyhow!("publish topic resolves to empty")),
    }
}
