//! Error taxonomy for the transport, the dispatcher, and the mention handler.

use thiserror::Error;

/// Boxed cause carried by handler-level errors.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the bot.
///
/// Only [`BotError::Auth`] and [`BotError::Connection`] are fatal; everything else is
/// scoped to a single envelope and is reported without stopping the dispatcher.
#[derive(Debug, Error)]
pub enum BotError {
    /// The platform rejected one of the tokens.
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The transport could not be established or failed unrecoverably.
    #[error("connection failed: {0}")]
    Connection(String),
    /// An events API payload that the classifier does not handle.
    #[error("unsupported event type: {0}")]
    UnsupportedEvent(String),
    /// The author of a mention could not be resolved.
    #[error("failed to look up user `{user_id}`: {source}")]
    UserLookup {
        user_id: String,
        #[source]
        source: Cause,
    },
    /// The reply could not be posted.
    #[error("failed to post message to `{channel_id}`: {source}")]
    Post {
        channel_id: String,
        #[source]
        source: Cause,
    },
}

impl BotError {
    /// Whether this error should bring the whole process down.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(_) | Self::Connection(_))
    }
}
