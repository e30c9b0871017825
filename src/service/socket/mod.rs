pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::base::{
    error::BotError,
    event::{EventEnvelope, RequestRef},
    types::Res,
};

// Types.

/// Inbound envelopes, in delivery order.
pub type EventStream = mpsc::Receiver<EventEnvelope>;

// Traits.

/// Generic socket-mode transport trait that clients must implement.
///
/// The transport owns the persistent connection to the chat platform. It delivers
/// envelopes through [`GenericSocketClient::events`] and takes acknowledgments through
/// [`GenericSocketClient::ack`], while [`GenericSocketClient::run`] drives the
/// underlying connection machinery (heartbeats, reconnects).
#[async_trait]
pub trait GenericSocketClient: Send + Sync + 'static {
    /// Drive the connection until `shutdown` is cancelled.
    ///
    /// This must run concurrently with the consumer of [`GenericSocketClient::events`].
    /// Returns an error only for fatal transport failures.
    async fn run(&self, shutdown: CancellationToken) -> Result<(), BotError>;

    /// Take the inbound envelope stream.
    ///
    /// The stream can only be taken once.
    async fn events(&self) -> Res<EventStream>;

    /// Acknowledge receipt of an envelope.
    ///
    /// Fire-and-forget: acknowledgment means "received", not "handled".
    fn ack(&self, request_ref: RequestRef);
}

// Structs.

/// Socket-mode transport for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct SocketClient {
    inner: Arc<dyn GenericSocketClient>,
}

impl Deref for SocketClient {
    type Target = dyn GenericSocketClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl SocketClient {
    pub fn new(inner: Arc<dyn GenericSocketClient>) -> Self {
        Self { inner }
    }
}
