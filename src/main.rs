//! Lorencia - headless console client for MU Online private servers.
//!
//! Connects to a Connect Server, discovers game servers, switches to the
//! selected one, authenticates and keeps a live mirror of the character and
//! its surroundings while commands are read from stdin.

mod client;
mod common;
mod config;
mod console;
mod data;
mod protocol;
mod state;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::signal;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use client::{ClientChannels, MuClient, SessionEnd};
use common::events::EventSink;
use config::load_and_validate;
use state::scope::ScopeMap;

fn config_path() -> String {
    std::env::args()
        .nth(1)
        .unwrap_or_else(|| "lorencia.conf".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Lorencia v{} starting...", env!("CARGO_PKG_VERSION"));

    let path = config_path();
    info!("Loading configuration from {}...", path);
    let config = load_and_validate(&path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", path);
        e
    })?;

    info!("Configuration loaded successfully");
    info!("  Connect Server: {}:{}", config.server.host, config.server.port);
    info!("  Account: {}", config.account.username);
    info!("  Protocol: {}", config.client.protocol);

    let character_state = state::character::shared();
    let scope = Arc::new(ScopeMap::new());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Observer tasks: event printer and stdin command reader.
    let printer_task = tokio::spawn(console::run_printer(event_rx));
    let console_task = tokio::spawn(console::run_console(
        character_state.clone(),
        scope.clone(),
        command_tx,
    ));

    let mut client = MuClient::new(
        config,
        ClientChannels {
            events: EventSink::new(event_tx),
            commands: command_rx,
            shutdown: shutdown_rx.clone(),
        },
        character_state,
        scope,
    );

    // Client task: run sessions forever, backing off between failures.
    let mut reconnect_shutdown_rx = shutdown_rx;
    let mut client_task = tokio::spawn(async move {
        use backon::BackoffBuilder;

        fn session_backoff() -> impl Iterator<Item = Duration> {
            backon::ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(2))
                .with_max_delay(Duration::from_secs(60))
                .with_jitter()
                .without_max_times()
                .build()
        }

        let mut backoff = session_backoff();

        loop {
            match client.run_session().await {
                Ok(SessionEnd::Shutdown) => break,
                Ok(SessionEnd::Disconnected) => {
                    info!("Session ended");
                    backoff = session_backoff();
                }
                Err(e) => error!("Session failed: {e}"),
            }

            if *reconnect_shutdown_rx.borrow() {
                break;
            }

            let delay = backoff.next().unwrap_or(Duration::from_secs(60));
            info!("Reconnecting in {:.1} seconds...", delay.as_secs_f64());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                changed = reconnect_shutdown_rx.changed() => {
                    if changed.is_err() || *reconnect_shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }
    });

    let shutdown = tokio::select! {
        biased;
        _ = shutdown_signal() => {
            info!("Shutdown signal received - logging out...");
            true
        }
        _ = &mut client_task => false,
    };

    if shutdown {
        if let Err(e) = shutdown_tx.send(true) {
            warn!("Failed to send shutdown: {}", e);
        }
        match tokio::time::timeout(Duration::from_secs(8), client_task).await {
            Ok(Ok(())) => info!("Client shut down gracefully"),
            Ok(Err(e)) => warn!("Client task panicked: {}", e),
            Err(_) => warn!("Client shutdown timed out"),
        }
    }

    printer_task.abort();
    console_task.abort();

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
