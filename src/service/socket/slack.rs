//! Slack socket-mode implementation of the transport.
//!
//! Slack-morphism drives the WebSocket connections (heartbeats, reconnects) and invokes
//! callbacks per inbound envelope. The callbacks translate Slack's types into the
//! crate's event unions and hand them to the dispatcher over a bounded queue.
//!
//! Slack-morphism sends the wire-level acknowledgment when a callback returns, so the
//! push callback waits until the dispatcher acknowledges the envelope (bounded by the
//! configured ack timeout).

use crate::{
    base::{
        config::Config,
        error::BotError,
        event::{AppMentionEvent, CallbackEvent, EnvelopeKind, EnvelopePayload, EventEnvelope, EventsApiEvent, InnerEvent, RequestRef},
        types::Res,
    },
    service::slack::{FullClient, classify_slack_error, new_client},
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use super::{EventStream, GenericSocketClient, SocketClient};

// Type aliases.

type Listener = SlackClientSocketModeListener<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `SocketClient` applied by the slack implementation.

impl SocketClient {
    /// Connects a new Slack socket-mode transport.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackSocketClient::connect(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket listener.
struct SlackSocketState {
    inbound_tx: mpsc::Sender<EventEnvelope>,
    ack_timeout: Duration,
    next_local_id: AtomicU64,
}

impl SlackSocketState {
    /// Request IDs for envelopes that carry no platform ID of their own.
    fn local_id(&self) -> String {
        format!("local-{}", self.next_local_id.fetch_add(1, Ordering::Relaxed))
    }
}

/// Slack socket-mode transport.
struct SlackSocketClient {
    listener: Listener,
    events: Mutex<Option<EventStream>>,
}

impl SlackSocketClient {
    /// Register the app token with a socket-mode listener.
    ///
    /// Fails with [`BotError::Auth`] if Slack rejects the token.
    #[instrument(name = "SlackSocketClient::connect", skip_all)]
    pub async fn connect(config: &Config) -> Res<Self> {
        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let client: Arc<FullClient> = new_client()?;

        let (inbound_tx, inbound_rx) = mpsc::channel(config.event_buffer);

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        let listener_environment = Arc::new(
            SlackClientEventsListenerEnvironment::new(client)
                .with_error_handler(handle_listener_error)
                .with_user_state(SlackSocketState {
                    inbound_tx,
                    ack_timeout: Duration::from_millis(config.ack_timeout_ms),
                    next_local_id: AtomicU64::new(0),
                }),
        );

        let listener = SlackClientSocketModeListener::new(&SlackClientSocketModeConfig::new(), listener_environment, socket_mode_callbacks);

        // Register an app token to listen for events.
        listener.listen_for(&app_token).await.map_err(classify_slack_error)?;

        info!("Socket mode listener registered.");

        Ok(Self {
            listener,
            events: Mutex::new(Some(inbound_rx)),
        })
    }
}

#[async_trait]
impl GenericSocketClient for SlackSocketClient {
    async fn run(&self, shutdown: CancellationToken) -> Result<(), BotError> {
        // Open the WS connections; slack-morphism keeps them alive from here on.
        self.listener.start().await;

        info!("Socket mode connections started.");

        shutdown.cancelled().await;

        info!("Shutting down socket mode connections ...");
        self.listener.shutdown().await;

        Ok(())
    }

    async fn events(&self) -> Res<EventStream> {
        self.events.lock().await.take().ok_or(anyhow::anyhow!("The event stream has already been taken."))
    }

    fn ack(&self, request_ref: RequestRef) {
        debug!("Acknowledging `{}`.", request_ref.id());
        request_ref.complete();
    }
}

// Conversions from slack-morphism types.

fn callback_event(event_callback: SlackPushEventCallback) -> CallbackEvent {
    CallbackEvent {
        team_id: event_callback.team_id.0,
        event_id: event_callback.event_id.0,
        inner_event: inner_event(event_callback.event),
    }
}

fn inner_event(body: SlackEventCallbackBody) -> InnerEvent {
    match body {
        SlackEventCallbackBody::AppMention(mention) => InnerEvent::AppMention(AppMentionEvent {
            user_id: mention.user.0,
            channel_id: mention.channel.0,
            text: mention.content.text.unwrap_or_default(),
        }),
        SlackEventCallbackBody::Message(_) => InnerEvent::Message,
        other => {
            let event_type = serde_json::to_value(&other)
                .ok()
                .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_owned))
                .unwrap_or_else(|| "unknown".to_string());

            InnerEvent::Other { event_type }
        }
    }
}

// Socket mode listener callbacks for Slack.

/// Pulls the queue handle out of the listener's user state.
async fn socket_state(states: &SlackClientEventsUserState) -> Res<(mpsc::Sender<EventEnvelope>, Duration, String)> {
    let states = states.read().await;
    let state = states.get_user_state::<SlackSocketState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    Ok((state.inbound_tx.clone(), state.ack_timeout, state.local_id()))
}

/// Handles push (events API) envelopes from Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    forward_push(event_callback, &states).await?;

    Ok(())
}

/// How a queued push event was let go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushRelease {
    Acknowledged,
    Dropped,
    TimedOut,
    StreamClosed,
}

/// Queues a push event, then waits for the dispatcher's ack before letting Slack's ack go out.
async fn forward_push(event_callback: SlackPushEventCallback, states: &SlackClientEventsUserState) -> Res<PushRelease> {
    let (inbound_tx, ack_timeout, _) = socket_state(states).await?;

    let (request_ref, acked) = RequestRef::with_responder(event_callback.event_id.0.clone());

    let envelope = EventEnvelope {
        kind: EnvelopeKind::EventsApi,
        request_ref,
        payload: EnvelopePayload::EventsApi(EventsApiEvent::Callback(callback_event(event_callback))),
    };

    if inbound_tx.send(envelope).await.is_err() {
        warn!("Dropping push event: the event stream is closed.");
        return Ok(PushRelease::StreamClosed);
    }

    // Hold the callback until the dispatcher has acknowledged receipt.

    let release = match tokio::time::timeout(ack_timeout, acked).await {
        Ok(Ok(())) => PushRelease::Acknowledged,
        Ok(Err(_)) => PushRelease::Dropped,
        Err(_) => PushRelease::TimedOut,
    };

    match release {
        PushRelease::TimedOut => warn!("Timed out waiting for the dispatcher to acknowledge a push event."),
        other => debug!("Push event released: {:?}.", other),
    }

    Ok(release)
}

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    forward_opaque(&states, EnvelopeKind::SlashCommands, format!("{:?}", event)).await?;

    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    forward_opaque(&states, EnvelopeKind::Interactive, format!("{:?}", event)).await?;

    Ok(())
}

/// Queues an envelope the transport does not decode.
async fn forward_opaque(states: &SlackClientEventsUserState, kind: EnvelopeKind, summary: String) -> Res<()> {
    let (inbound_tx, _, id) = socket_state(states).await?;

    let envelope = EventEnvelope {
        kind,
        request_ref: RequestRef::new(id),
        payload: EnvelopePayload::Other(summary),
    };

    if inbound_tx.send(envelope).await.is_err() {
        warn!("Dropping {:?} envelope: the event stream is closed.", kind);
    }

    Ok(())
}

/// Handles errors raised inside the socket mode listener.
fn handle_listener_error(err: Box<dyn std::error::Error + Send + Sync>, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> HttpStatusCode {
    warn!("Socket mode listener error: {}", err);

    HttpStatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket_state_with(inbound_tx: mpsc::Sender<EventEnvelope>, ack_timeout: Duration) -> SlackSocketState {
        SlackSocketState {
            inbound_tx,
            ack_timeout,
            next_local_id: AtomicU64::new(0),
        }
    }

    fn user_state(state: SlackSocketState) -> SlackClientEventsUserState {
        let mut storage = SlackClientEventsUserStateStorage::new();
        storage.set_user_state(state);

        SlackClientEventsUserState::new(storage)
    }

    fn push_callback(event: serde_json::Value) -> SlackPushEventCallback {
        serde_json::from_value(serde_json::json!({
            "team_id": "T1",
            "api_app_id": "A1",
            "event_id": "Ev1",
            "event_time": 1700000000,
            "event": event,
        }))
        .unwrap()
    }

    fn mention_callback() -> SlackPushEventCallback {
        push_callback(serde_json::json!({
            "type": "app_mention",
            "user": "U1",
            "channel": "C1",
            "ts": "1700000000.000100",
            "text": "<@B1> please approve my leave",
        }))
    }

    #[test]
    fn local_ids_are_unique() {
        let (inbound_tx, _inbound_rx) = mpsc::channel(1);
        let state = socket_state_with(inbound_tx, Duration::from_millis(10));

        assert_eq!(state.local_id(), "local-0");
        assert_eq!(state.local_id(), "local-1");
    }

    #[test]
    fn converts_an_app_mention() {
        let event = callback_event(mention_callback());

        assert_eq!(
            event,
            CallbackEvent {
                team_id: "T1".to_string(),
                event_id: "Ev1".to_string(),
                inner_event: InnerEvent::AppMention(AppMentionEvent {
                    user_id: "U1".to_string(),
                    channel_id: "C1".to_string(),
                    text: "<@B1> please approve my leave".to_string(),
                }),
            }
        );
    }

    #[test]
    fn converts_an_app_mention_without_text_to_empty_text() {
        let event = callback_event(push_callback(serde_json::json!({
            "type": "app_mention",
            "user": "U1",
            "channel": "C1",
            "ts": "1700000000.000100",
        })));

        match event.inner_event {
            InnerEvent::AppMention(mention) => assert_eq!(mention.text, ""),
            other => panic!("expected an app mention, got {:?}", other),
        }
    }

    #[test]
    fn converts_a_message() {
        let event = callback_event(push_callback(serde_json::json!({
            "type": "message",
            "user": "U2",
            "channel": "C1",
            "ts": "1700000000.000200",
            "text": "hello",
        })));

        assert_eq!(event.inner_event, InnerEvent::Message);
    }

    #[test]
    fn other_events_keep_their_type() {
        let joined = callback_event(push_callback(serde_json::json!({
            "type": "member_joined_channel",
            "user": "U2",
            "channel": "C1",
            "channel_type": "C",
            "team": "T1",
        })));

        assert_eq!(
            joined.inner_event,
            InnerEvent::Other {
                event_type: "member_joined_channel".to_string()
            }
        );

        let unmodeled = callback_event(push_callback(serde_json::json!({
            "type": "pin_added",
            "user": "U2",
            "channel_id": "C1",
        })));

        assert_eq!(
            unmodeled.inner_event,
            InnerEvent::Other {
                event_type: "pin_added".to_string()
            }
        );
    }

    #[tokio::test]
    async fn push_event_is_held_until_acknowledged() {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(1);
        let states = user_state(socket_state_with(inbound_tx, Duration::from_secs(5)));

        let pending = tokio::spawn(async move { forward_push(mention_callback(), &states).await.unwrap() });

        let envelope = inbound_rx.recv().await.unwrap();
        assert_eq!(envelope.kind, EnvelopeKind::EventsApi);
        assert_eq!(envelope.request_ref.id(), "Ev1");

        // Not released while the envelope sits with the dispatcher.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pending.is_finished());

        envelope.request_ref.complete();

        assert_eq!(pending.await.unwrap(), PushRelease::Acknowledged);
    }

    #[tokio::test]
    async fn push_event_is_released_when_dropped() {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(1);
        let states = user_state(socket_state_with(inbound_tx, Duration::from_secs(5)));

        let pending = tokio::spawn(async move { forward_push(mention_callback(), &states).await.unwrap() });

        drop(inbound_rx.recv().await.unwrap());

        assert_eq!(pending.await.unwrap(), PushRelease::Dropped);
    }

    #[tokio::test]
    async fn push_event_is_released_after_the_ack_timeout() {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(1);
        let states = user_state(socket_state_with(inbound_tx, Duration::from_millis(10)));

        let pending = tokio::spawn(async move { forward_push(mention_callback(), &states).await.unwrap() });

        let _held = inbound_rx.recv().await.unwrap();

        assert_eq!(pending.await.unwrap(), PushRelease::TimedOut);
    }

    #[tokio::test]
    async fn push_event_is_released_when_the_stream_is_closed() {
        let (inbound_tx, inbound_rx) = mpsc::channel(1);
        drop(inbound_rx);
        let states = user_state(socket_state_with(inbound_tx, Duration::from_secs(5)));

        assert_eq!(forward_push(mention_callback(), &states).await.unwrap(), PushRelease::StreamClosed);
    }

    #[tokio::test]
    async fn opaque_envelopes_get_local_ids() {
        let (inbound_tx, mut inbound_rx) = mpsc::channel(2);
        let states = user_state(socket_state_with(inbound_tx, Duration::from_secs(5)));

        forward_opaque(&states, EnvelopeKind::SlashCommands, "/ops".to_string()).await.unwrap();
        forward_opaque(&states, EnvelopeKind::Interactive, "block_actions".to_string()).await.unwrap();

        let command = inbound_rx.recv().await.unwrap();
        assert_eq!(command.kind, EnvelopeKind::SlashCommands);
        assert_eq!(command.request_ref.id(), "local-0");
        assert_eq!(command.payload, EnvelopePayload::Other("/ops".to_string()));

        let interaction = inbound_rx.recv().await.unwrap();
        assert_eq!(interaction.kind, EnvelopeKind::Interactive);
        assert_eq!(interaction.request_ref.id(), "local-1");
    }
}
