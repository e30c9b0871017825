//! Closed event unions produced by the socket-mode transport.
//!
//! Inbound traffic is decoded into three nested levels: the [`EventEnvelope`] kind, the
//! [`EventsApiEvent`] callback type, and the [`InnerEvent`] variant. Each level is a
//! closed enum so that routing over it can be checked for exhaustiveness.

use tokio::sync::oneshot;

// Envelope.

/// Kind tag of a socket-mode envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    EventsApi,
    SlashCommands,
    Interactive,
}

/// Handle used to acknowledge an envelope.
///
/// Acknowledging consumes the handle, so an envelope can be acknowledged at most once.
/// Dropping it without acknowledging releases any waiting transport callback.
#[derive(Debug)]
pub struct RequestRef {
    id: String,
    responder: Option<oneshot::Sender<()>>,
}

impl RequestRef {
    /// A handle with nothing waiting on the other side.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), responder: None }
    }

    /// A handle paired with a receiver that resolves once the handle is acknowledged.
    ///
    /// The receiver yields an error if the handle is dropped unacknowledged.
    pub fn with_responder(id: impl Into<String>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { id: id.into(), responder: Some(tx) }, rx)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Signals the waiting side, if any.
    pub fn complete(mut self) {
        if let Some(responder) = self.responder.take() {
            // The waiting side may have timed out already.
            let _ = responder.send(());
        }
    }
}

/// A single inbound unit from the transport.
#[derive(Debug)]
pub struct EventEnvelope {
    pub kind: EnvelopeKind,
    pub request_ref: RequestRef,
    pub payload: EnvelopePayload,
}

/// Payload carried by an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopePayload {
    /// A decoded events API payload.
    EventsApi(EventsApiEvent),
    /// Anything the transport does not decode; kept as a summary for logging.
    Other(String),
}

// Events API.

/// Decoded payload of an `EventsApi` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsApiEvent {
    Callback(CallbackEvent),
    AppRateLimited,
    UrlVerification,
}

/// Fieldless discriminant of [`EventsApiEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackType {
    EventCallback,
    AppRateLimited,
    UrlVerification,
}

impl EventsApiEvent {
    pub fn callback_type(&self) -> CallbackType {
        match self {
            Self::Callback(_) => CallbackType::EventCallback,
            Self::AppRateLimited => CallbackType::AppRateLimited,
            Self::UrlVerification => CallbackType::UrlVerification,
        }
    }
}

impl CallbackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventCallback => "event_callback",
            Self::AppRateLimited => "app_rate_limited",
            Self::UrlVerification => "url_verification",
        }
    }
}

/// An `event_callback` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub team_id: String,
    pub event_id: String,
    pub inner_event: InnerEvent,
}

// Inner events.

/// The platform event wrapped by a [`CallbackEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InnerEvent {
    AppMention(AppMentionEvent),
    Message,
    Other { event_type: String },
}

/// Fieldless discriminant of [`InnerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InnerEventType {
    AppMention,
    Message,
    Other,
}

impl InnerEvent {
    pub fn event_type(&self) -> InnerEventType {
        match self {
            Self::AppMention(_) => InnerEventType::AppMention,
            Self::Message => InnerEventType::Message,
            Self::Other { .. } => InnerEventType::Other,
        }
    }
}

/// The bot was @-mentioned in a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMentionEvent {
    pub user_id: String,
    pub channel_id: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_wakes_the_responder() {
        let (request_ref, rx) = RequestRef::with_responder("Ev1");
        assert_eq!(request_ref.id(), "Ev1");

        request_ref.complete();

        assert!(rx.await.is_ok());
    }

    #[tokio::test]
    async fn dropping_releases_the_responder() {
        let (request_ref, rx) = RequestRef::with_responder("Ev2");

        drop(request_ref);

        assert!(rx.await.is_err());
    }

    #[test]
    fn complete_without_responder_is_a_no_op() {
        RequestRef::new("Ev3").complete();
    }
}
