//! Library root for `ops-bot`.
//!
//! Ops-bot is a Slack assistant that listens over socket mode and answers @-mentions:
//! - Mentions asking for leave get the leave-request format to fill in
//! - Every other mention gets a short greeting offering help
//! - One-shot notifications can be posted to a channel from the command line
//!
//! The bot keeps a persistent socket-mode connection to Slack, acknowledges every
//! inbound envelope, and routes it through a closed classifier to its handler. The
//! architecture is built around traits for the transport and the chat API so that
//! each can be swapped or mocked.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use anyhow::anyhow;
use base::{
    config::Config,
    types::{MessageRef, Res, Void},
};
use interaction::notify::send_notification;
use rustls::crypto;
use service::chat::ChatClient;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Installs the process-wide TLS crypto provider.
fn install_crypto_provider() -> Void {
    crypto::ring::default_provider().install_default().map_err(|_| anyhow!("Failed to install the crypto provider."))
}

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the ops-bot runtime:
/// - Initializes the crypto provider
/// - Connects the chat client and the socket-mode transport
/// - Runs the event loop until Ctrl-C
pub async fn start(config: Config) -> Void {
    info!("Starting ops-bot ...");

    // Start the crypto provider.
    install_crypto_provider()?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Cancel everything on Ctrl-C.
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();

    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", err);
            return;
        }

        info!("Received Ctrl-C ...");
        signal.cancel();
    });

    // Start the runtime.
    runtime.start(shutdown).await?;

    Ok(())
}

/// Posts a single notification and exits.
///
/// The channel falls back to `slack_channel_id` from the configuration.
pub async fn notify(config: Config, channel_id: Option<String>, text: &str) -> Res<MessageRef> {
    let channel_id = channel_id
        .or_else(|| config.slack_channel_id.clone())
        .ok_or(anyhow!("No channel given, and `slack_channel_id` is not configured."))?;

    install_crypto_provider()?;

    let chat = ChatClient::slack(&config).await?;

    send_notification(&chat, &channel_id, text).await
}
