//! The event dispatcher: pulls envelopes off the transport and routes them.
//!
//! The dispatcher is a two-state machine. It starts [`DispatcherState::Running`] and moves
//! to [`DispatcherState::ShuttingDown`] once the shared cancellation token fires, after
//! which no new envelope is consumed. Errors from a single envelope are reported and
//! the loop moves on to the next one.

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::{
    base::{
        error::BotError,
        event::{EnvelopeKind, EventEnvelope},
        types::MessageRef,
    },
    interaction::{
        app_mention::handle_app_mention,
        classify::{Classified, classify},
    },
    service::{
        chat::ChatClient,
        socket::{EventStream, SocketClient},
    },
};

/// Lifecycle of the dispatcher loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Running,
    ShuttingDown,
}

/// Result of dispatching a single envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ignored,
    Replied(MessageRef),
}

/// Routes envelopes from the transport to their handlers.
#[derive(Clone)]
pub struct Dispatcher {
    socket: SocketClient,
    chat: ChatClient,
    state: DispatcherState,
}

impl Dispatcher {
    pub fn new(socket: SocketClient, chat: ChatClient) -> Self {
        Self {
            socket,
            chat,
            state: DispatcherState::Running,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Consumes envelopes until `shutdown` fires or the stream closes.
    ///
    /// Cancellation is checked before every read, so envelopes still queued when the
    /// token fires are never dispatched. An in-flight dispatch is dropped on cancellation.
    pub async fn run(mut self, mut events: EventStream, shutdown: CancellationToken) -> DispatcherState {
        info!("Event dispatcher is running ...");

        while self.state == DispatcherState::Running {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutting down event dispatcher ...");
                    self.state = DispatcherState::ShuttingDown;
                }

                envelope = events.recv() => match envelope {
                    Some(envelope) => self.dispatch_until_cancelled(envelope, &shutdown).await,
                    None => {
                        warn!("Event stream closed; stopping event dispatcher.");
                        self.state = DispatcherState::ShuttingDown;
                    }
                },
            }
        }

        self.state
    }

    /// Dispatches one envelope, dropping the work if `shutdown` fires first.
    async fn dispatch_until_cancelled(&self, envelope: EventEnvelope, shutdown: &CancellationToken) {
        let span = info_span!("envelope", kind = ?envelope.kind, request_id = %envelope.request_ref.id());

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                warn!("Cancelled while dispatching an envelope.");
            }

            result = self.dispatch(envelope).instrument(span) => {
                report(result);
            }
        }
    }

    /// Acknowledges, classifies, and handles a single envelope.
    ///
    /// Every `EventsApi` envelope is acknowledged before it is handled, whatever the
    /// outcome of handling.
    pub async fn dispatch(&self, envelope: EventEnvelope) -> Result<Outcome, BotError> {
        let EventEnvelope { kind, request_ref, payload } = envelope;

        if kind == EnvelopeKind::EventsApi {
            self.socket.ack(request_ref);
        }

        match classify(kind, &payload) {
            Classified::Ignore => Ok(Outcome::Ignored),
            Classified::Unsupported(event_type) => Err(BotError::UnsupportedEvent(event_type)),
            Classified::Mention(mention) => {
                info!("Received app mention event ...");
                handle_app_mention(mention, &self.chat).await.map(Outcome::Replied)
            }
        }
    }
}

/// Logs the result of a single dispatch.
fn report(result: Result<Outcome, BotError>) {
    match result {
        Ok(Outcome::Ignored) => debug!("Ignored envelope."),
        Ok(Outcome::Replied(message)) => info!("Replied in `{}` at `{}`.", message.channel_id, message.ts),
        Err(err @ BotError::UnsupportedEvent(_)) => warn!("{}", err),
        Err(err) => error!("Error while handling: {}", err),
    }
}
