//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default capacity of the envelope queue between the transport and the dispatcher.
fn default_event_buffer() -> usize {
    64
}

/// Default time a socket-mode callback waits for the dispatcher to acknowledge.
fn default_ack_timeout_ms() -> u64 {
    2500
}

/// Slack closes the envelope if it is not acknowledged within three seconds.
const MAX_ACK_TIMEOUT_MS: u64 = 3000;

/// Configuration for the ops-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack bot token (`SLACK_BOT_TOKEN`, or the older `SLACK_AUTH_TOKEN`), used for the REST calls.
    #[serde(alias = "slack_auth_token")]
    pub slack_bot_token: String,
    /// Slack app-level token (`SLACK_APP_TOKEN`), used to open the socket-mode connection.
    pub slack_app_token: String,
    /// Default channel for one-shot notifications (`SLACK_CHANNEL_ID`).
    #[serde(default)]
    pub slack_channel_id: Option<String>,
    /// Capacity of the inbound envelope queue (`OPS_BOT_EVENT_BUFFER`).
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
    /// How long a socket-mode callback waits for the dispatcher's ack (`OPS_BOT_ACK_TIMEOUT_MS`).
    #[serde(default = "default_ack_timeout_ms")]
    pub ack_timeout_ms: u64,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        // Pick up a local `.env`, if any, before reading the environment.
        let _ = dotenvy::dotenv();

        let mut cfg = config::Config::builder();

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        cfg = cfg
            .add_source(config::Environment::with_prefix("SLACK").keep_prefix(true))
            .add_source(config::Environment::with_prefix("OPS_BOT"));

        let inner: ConfigInner = cfg.build()?.try_deserialize()?;

        Self::from_inner(inner)
    }

    /// Wraps and validates an already-deserialized configuration.
    pub fn from_inner(inner: ConfigInner) -> Res<Self> {
        let result = Config { inner: Arc::new(inner) };

        if result.slack_bot_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack bot token must not be empty."));
        }

        if result.slack_app_token.trim().is_empty() {
            return Err(anyhow::anyhow!("Slack app token must not be empty."));
        }

        if result.event_buffer < 1 {
            return Err(anyhow::anyhow!("Event buffer must be at least 1."));
        }

        if result.ack_timeout_ms < 1 || result.ack_timeout_ms > MAX_ACK_TIMEOUT_MS {
            return Err(anyhow::anyhow!("Ack timeout must be between 1 and {} milliseconds.", MAX_ACK_TIMEOUT_MS));
        }

        Ok(result)
    }
}
