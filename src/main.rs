//! jarvis-daemon: Background daemon for a voice/text command assistant
//!
//! This daemon runs as a background service and provides:
//! - Wake-word gated voice input and typed text input
//! - An explicit activation state machine for command execution
//! - Optional human confirmation before any command takes effect
//! - Spoken replies with word-synchronized captions
//! - A Wikipedia -> DuckDuckGo fallback for open-domain questions
//! - IPC server for recognizer, UI and renderer communication
//!
//! Out of scope:
//! - Visual scene rendering, gesture tracking, camera capture
//! - Speech recognition itself (transcripts arrive over IPC)

mod config;
mod confirm;
mod events;
mod input;
mod ipc;
mod knowledge;
mod lifecycle;
mod pipeline;
mod resolver;
mod speech;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::confirm::ConfirmationGate;
use crate::events::CoreEvent;
use crate::input::{ConsoleListener, InputGate};
use crate::ipc::Server;
use crate::knowledge::{DuckDuckGoSource, KnowledgeChain, WikipediaSource};
use crate::lifecycle::ShutdownSignal;
use crate::pipeline::Assistant;
use crate::speech::{ConsoleSynthesizer, SpeechRenderer};
use crate::state::StateMachine;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries spoken replies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "jarvis-daemon starting"
    );

    let config = Config::load()?;
    config.ensure_dirs()?;
    info!(?config.socket_path, "configuration loaded");

    let shutdown = ShutdownSignal::new();

    // Collaborators and the console -> assistant loop
    let (request_tx, request_rx) = mpsc::channel(32);
    let (console_tx, console_rx) = mpsc::channel(32);
    // Assistant -> subscribers (IPC clients, event log)
    let (event_tx, _) = broadcast::channel::<CoreEvent>(256);

    let client = knowledge::build_client(concat!("jarvis-daemon/", env!("CARGO_PKG_VERSION")))
        .context("failed to build HTTP client")?;
    let knowledge = KnowledgeChain::new(
        Arc::new(WikipediaSource::new(client.clone(), &config.wikipedia_url)),
        Arc::new(DuckDuckGoSource::new(client, &config.duckduckgo_url)),
    );

    let renderer = SpeechRenderer::new(
        Arc::new(ConsoleSynthesizer::new(config.words_per_minute)),
        event_tx.clone(),
        config.captions_enabled,
    );

    let mut assistant = Assistant::new(
        StateMachine::new(event_tx.clone()),
        ConfirmationGate::new(config.confirm_commands),
        renderer,
        knowledge,
        InputGate::new(&config.wake_word, config.input_cooldown),
        event_tx.clone(),
    );

    // Typed input from the terminal (runs on dedicated thread)
    let console = ConsoleListener::new(console_tx);
    match console.start() {
        Ok(()) => info!("console input started"),
        Err(e) => warn!(%e, "continuing without console input"),
    }

    let server = Server::new(&config.socket_path, request_tx, event_tx.clone())?;

    let mut log_rx = event_tx.subscribe();

    info!("daemon initialized, entering main loop");

    tokio::select! {
        _ = assistant.run(request_rx, console_rx) => {
            info!("assistant loop exited");
        }

        result = server.run() => {
            if let Err(e) = result {
                error!(?e, "IPC server error");
            }
        }

        _ = async {
            loop {
                match log_rx.recv().await {
                    Ok(event) => info!(%event, "core event"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "event log receiver lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        } => {
            info!("event log exited");
        }

        _ = async {
            if let Err(e) = shutdown.wait().await {
                error!(?e, "signal handling unavailable, running until the assistant exits");
                std::future::pending::<()>().await;
            }
        } => {
            info!("shutdown signal received");
        }
    }

    info!("shutting down...");

    if console.is_running() {
        console.stop();
    }
    server.shutdown().await;

    info!("jarvis-daemon stopped");

    Ok(())
}
