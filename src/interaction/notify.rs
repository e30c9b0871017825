//! One-shot notifications, sent outside the event loop.

use chrono::{DateTime, Local};
use tracing::{info, instrument};

use crate::{
    base::{
        replies,
        types::{ColorCode, MessageRef, ReplyField, ReplyPayload, Res},
    },
    service::chat::ChatClient,
};

/// Builds a notification stamped with `at`.
pub fn compose_notification(text: &str, at: DateTime<Local>) -> ReplyPayload {
    ReplyPayload {
        pretext: replies::NOTIFICATION_PRETEXT.to_string(),
        body: text.to_string(),
        color: ColorCode::Notice,
        fields: vec![ReplyField::new(replies::NOTIFICATION_DATE_TITLE, at.to_rfc2822())],
    }
}

/// Posts a notification to a channel.
#[instrument(skip(chat, text))]
pub async fn send_notification(chat: &ChatClient, channel_id: &str, text: &str) -> Res<MessageRef> {
    let payload = compose_notification(text, Local::now());

    let message = chat.post_message(channel_id, &payload).await?;

    info!("Notification sent at {}.", message.ts);

    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn notification_carries_its_timestamp() {
        let at = Local.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();

        let payload = compose_notification("deploy finished", at);

        assert_eq!(payload.pretext, replies::NOTIFICATION_PRETEXT);
        assert_eq!(payload.body, "deploy finished");
        assert_eq!(payload.color, ColorCode::Notice);
        assert_eq!(payload.field(replies::NOTIFICATION_DATE_TITLE), Some(at.to_rfc2822().as_str()));
    }
}
