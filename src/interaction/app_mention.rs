//! Handles @-mentions of the bot.

use tracing::{info, instrument};

use crate::{
    base::{
        error::BotError,
        event::AppMentionEvent,
        types::MessageRef,
    },
    interaction::compose::{compose, select_template},
    service::chat::ChatClient,
};

/// Replies to a mention with exactly one message.
///
/// The author is resolved first; if that fails nothing is posted.
#[instrument(skip_all, fields(user_id = %event.user_id, channel_id = %event.channel_id))]
pub async fn handle_app_mention(event: &AppMentionEvent, chat: &ChatClient) -> Result<MessageRef, BotError> {
    // Resolve who mentioned the bot.

    let user = chat.resolve_user(&event.user_id).await.map_err(|e| BotError::UserLookup {
        user_id: event.user_id.clone(),
        source: e.into(),
    })?;

    // Pick a template and build the reply.

    let template = select_template(&event.text);
    let payload = compose(template, &user);

    info!("Replying with the {:?} template ...", template);

    // Post it to the channel the mention came from.

    let message = chat.post_message(&event.channel_id, &payload).await.map_err(|e| BotError::Post {
        channel_id: event.channel_id.clone(),
        source: e.into(),
    })?;

    Ok(message)
}
