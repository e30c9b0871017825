//! Three-level routing of inbound envelopes.
//!
//! [`route`] is a pure, total mapping over the fieldless discriminants of each level, so
//! every combination is either handled, explicitly ignored, or explicitly reported.
//! [`classify`] extracts those discriminants from an envelope and applies the mapping.

use crate::base::event::{AppMentionEvent, CallbackType, EnvelopeKind, EnvelopePayload, EventsApiEvent, InnerEvent, InnerEventType};

/// What to do with an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ignore,
    Unsupported,
    HandleMention,
}

/// An envelope after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    Ignore,
    /// Reported, not fatal; carries the name of what was not handled.
    Unsupported(String),
    Mention(&'a AppMentionEvent),
}

/// Maps the three levels of an envelope to a route.
pub fn route(kind: EnvelopeKind, callback: Option<CallbackType>, inner: Option<InnerEventType>) -> Route {
    match (kind, callback, inner) {
        (EnvelopeKind::EventsApi, Some(CallbackType::EventCallback), Some(InnerEventType::AppMention)) => Route::HandleMention,
        (EnvelopeKind::EventsApi, Some(CallbackType::EventCallback), Some(InnerEventType::Message | InnerEventType::Other) | None) => Route::Ignore,
        (EnvelopeKind::EventsApi, Some(CallbackType::AppRateLimited | CallbackType::UrlVerification) | None, _) => Route::Unsupported,
        (EnvelopeKind::SlashCommands | EnvelopeKind::Interactive, _, _) => Route::Ignore,
    }
}

/// Classifies an envelope's payload.
pub fn classify(kind: EnvelopeKind, payload: &EnvelopePayload) -> Classified<'_> {
    let events_api = match payload {
        EnvelopePayload::EventsApi(event) => Some(event),
        EnvelopePayload::Other(_) => None,
    };

    let callback = match events_api {
        Some(EventsApiEvent::Callback(callback)) => Some(callback),
        _ => None,
    };

    let callback_type = events_api.map(EventsApiEvent::callback_type);
    let inner_type = callback.map(|c| c.inner_event.event_type());

    match route(kind, callback_type, inner_type) {
        Route::Ignore => Classified::Ignore,
        Route::Unsupported => Classified::Unsupported(match callback_type {
            Some(callback_type) => callback_type.as_str().to_string(),
            None => "undecodable events api payload".to_string(),
        }),
        Route::HandleMention => match callback.map(|c| &c.inner_event) {
            Some(InnerEvent::AppMention(mention)) => Classified::Mention(mention),
            _ => Classified::Ignore,
        },
    }
}
