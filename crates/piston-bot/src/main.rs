use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use piston_bot::commands::RunCommand;
use piston_bot::config::Config;
use piston_bot::followup::WebhookClient;
use piston_bot::languages::LanguageCatalog;
use piston_bot::piston::PistonClient;
use piston_bot::queue::ExecQueue;
use piston_bot::registry::Registry;
use piston_bot::server::{serve, AppState};

/// Code execution bot CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/piston-bot.toml")]
    config: String,

    /// Piston API base URL (overrides config file)
    #[arg(long, env = "PISTON_URL")]
    piston_url: Option<String>,

    /// HTTP listening port (overrides config file)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "piston_bot=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting code execution bot");

    let args = Args::parse();

    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };
    if let Some(piston_url) = args.piston_url {
        config.piston.base_url = piston_url;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let http = reqwest::Client::new();
    let piston = PistonClient::new(http.clone(), config.piston.base_url.clone());

    // Populate the language catalog before accepting traffic. A failed
    // fetch is survivable: the catalog stays empty and every language
    // is rejected until the process is restarted.
    let catalog = Arc::new(LanguageCatalog::empty());
    if let Err(e) = catalog.refresh(&piston).await {
        warn!(error = %e, "Could not load runtime list, all languages will be rejected");
    }

    let queue = Arc::new(ExecQueue::new(
        piston,
        Duration::from_millis(config.piston.min_interval_ms),
    ));
    let webhook = Arc::new(WebhookClient::new(
        http,
        config.discord.api_base.clone(),
        config.discord.application_id.clone(),
    ));

    let mut registry = Registry::new();
    registry.register(Arc::new(RunCommand::new(catalog, queue, webhook)));

    let state = AppState::new(Arc::new(registry), config.discord.public_key.clone());
    serve(state, config.port).await
}
