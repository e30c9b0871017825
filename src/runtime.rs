//! Runtime services and shared state for the ops-bot.

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::dispatch::Dispatcher,
    service::{chat::ChatClient, socket::SocketClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the transport, the chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The socket-mode transport instance.
    pub socket: SocketClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    ///
    /// Fails if either token is rejected.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        // Initialize the transport.
        let socket = SocketClient::slack(&config).await?;

        Ok(Self { config, socket, chat })
    }

    /// Run the transport and the dispatcher until `shutdown` fires.
    ///
    /// The two run concurrently; a fatal transport error cancels the dispatcher too.
    pub async fn start(&self, shutdown: CancellationToken) -> Void {
        let events = self.socket.events().await?;

        let dispatcher = Dispatcher::new(self.socket.clone(), self.chat.clone());
        let dispatcher = tokio::spawn(dispatcher.run(events, shutdown.clone()));

        let result = self.socket.run(shutdown.clone()).await;

        if let Err(err) = &result {
            error!("Transport failed: {}", err);
            shutdown.cancel();
        }

        let state = dispatcher.await?;

        info!("Event dispatcher stopped ({:?}).", state);

        Ok(result?)
    }
}
