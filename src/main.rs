// src/main.rs

use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- Module Declarations ---
mod config;
mod error;
mod irc;
mod relay;
mod state;

// --- Imports ---
use crate::config::load_settings;
use crate::error::Result as AppResult;
use crate::irc::{IrcWriter, connect, register};
use crate::relay::{AccessFilter, ChannelRegistry, RelayBot};

const USAGE: &str = "Usage: multichat [-c|--config <path>]";

#[derive(Debug, Default)]
struct CliArgs {
    config: Option<PathBuf>,
}

impl CliArgs {
    fn parse() -> Result<Self, lexopt::Error> {
        use lexopt::prelude::*;

        let mut args = Self::default();
        let mut parser = lexopt::Parser::from_env();
        while let Some(arg) = parser.next()? {
            match arg {
                Short('c') | Long("config") => {
                    args.config = Some(PathBuf::from(parser.value()?));
                }
                Short('h') | Long("help") => {
                    println!("{}", USAGE);
                    std::process::exit(0);
                }
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(args)
    }
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Setup tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = CliArgs::parse()?;

    // Load Configuration. Anything missing is fatal before we touch the network.
    let settings = load_settings(cli.config.as_deref())?;
    tracing::info!("Configuration loaded: {:?}", settings);

    let stream = connect(&settings.server).await?;
    let (reader, writer) = tokio::io::split(stream);
    let mut writer = IrcWriter::new(writer);
    register(
        &mut writer,
        &settings.bot_username,
        settings.oauth_token.expose(),
        &settings.channels,
    )
    .await?;

    let registry = ChannelRegistry::new(settings.channels);
    let access = AccessFilter::new(settings.whitelist, settings.blacklist);
    let bot = RelayBot::new(writer, registry.clone(), access);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut worker = tokio::spawn(bot.run(reader, shutdown_rx));

    let outcome = tokio::select! {
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => tracing::info!("Interrupt received, shutting down"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt, shutting down"),
            }
            let _ = shutdown_tx.send(());
            worker.await
        }
        finished = &mut worker => finished,
    };

    let final_channels = registry.snapshot().await.channels;
    tracing::info!(channels = ?final_channels, "Relay stopped");

    match outcome? {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "Relay worker terminated");
            Err(e.into())
        }
    }
}
