//! Slack implementation of the chat REST boundary.
//!
//! This module resolves users through `users.info` and posts replies through
//! `chat.postMessage`, rendering each [`ReplyPayload`] as a single legacy attachment.
//!
//! slack-morphism's attachment model has no `pretext`, so replies are posted with a raw
//! request body built from the payload's own JSON.

use crate::{
    base::{
        config::Config,
        types::{MessageRef, ReplyPayload, Res, UserInfo},
    },
    service::slack::{FullClient, classify_slack_error, new_client},
};
use async_trait::async_trait;
use serde::Serialize;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// Body of a `chat.postMessage` call carrying raw attachments.
#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    attachments: Vec<serde_json::Value>,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    ///
    /// Verifies the bot token with `auth.test` before returning.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));
        let client = new_client()?;

        // Check the token, and get the bot's user ID for the logs.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await.map_err(classify_slack_error)?;

        info!("Slack bot user ID: {}", bot_user.user_id.0);

        Ok(Self { bot_token, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn resolve_user(&self, user_id: &str) -> Res<UserInfo> {
        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));
        let session = self.client.open_session(&self.bot_token);

        let response = session.users_info(&request).await.map_err(|e| anyhow::anyhow!("Failed to get user info: {}", e))?;
        let user = response.user;
        let profile = user.profile.as_ref();

        let display_name = display_name(
            user_id,
            &[
                user.name.as_deref(),
                profile.and_then(|p| p.display_name.as_deref()),
                profile.and_then(|p| p.real_name.as_deref()),
            ],
        );

        debug!("Resolved `{}` to `{}`.", user_id, display_name);

        Ok(UserInfo {
            id: user_id.to_string(),
            display_name,
        })
    }

    #[instrument(skip(self, payload))]
    async fn post_message(&self, channel_id: &str, payload: &ReplyPayload) -> Res<MessageRef> {
        let request = post_message_request(channel_id, payload)?;

        let session = self.client.open_session(&self.bot_token);

        let response: SlackApiChatPostMessageResponse = session
            .http_session_api
            .http_post("chat.postMessage", &request, None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(MessageRef {
            channel_id: response.channel.0,
            ts: response.ts.0,
        })
    }
}

// Helpers.

/// Picks the first non-blank candidate, falling back to the raw user ID.
fn display_name(user_id: &str, candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .map(|name| name.trim())
        .find(|name| !name.is_empty())
        .unwrap_or(user_id)
        .to_string()
}

/// Renders a reply as a legacy Slack attachment.
fn attachment(payload: &ReplyPayload) -> Res<serde_json::Value> {
    let mut value = serde_json::to_value(payload)?;
    value["fallback"] = serde_json::Value::String(format!("{} {}", payload.pretext, payload.body.trim_end()));

    Ok(value)
}

fn post_message_request<'a>(channel_id: &'a str, payload: &ReplyPayload) -> Res<PostMessageRequest<'a>> {
    Ok(PostMessageRequest {
        channel: channel_id,
        attachments: vec![attachment(payload)?],
    })
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        base::{
            replies,
            types::{ColorCode, ReplyField, Template},
        },
        interaction::compose::compose,
    };

    fn asha() -> UserInfo {
        UserInfo {
            id: "U1".to_string(),
            display_name: "Asha".to_string(),
        }
    }

    #[test]
    fn display_name_prefers_the_first_non_blank_candidate() {
        assert_eq!(display_name("U1", &[Some("asha"), Some("Asha R")]), "asha");
        assert_eq!(display_name("U1", &[None, Some("  "), Some("Asha R")]), "Asha R");
        assert_eq!(display_name("U1", &[None, None, None]), "U1");
    }

    #[test]
    fn payload_serializes_as_an_attachment() {
        let payload = ReplyPayload {
            pretext: "Heading".to_string(),
            body: "Body\n".to_string(),
            color: ColorCode::Neutral,
            fields: vec![ReplyField::new("Applicant", "Asha")],
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "pretext": "Heading",
                "text": "Body\n",
                "color": "#3d3d3d",
                "fields": [{ "title": "Applicant", "value": "Asha", "short": false }],
            })
        );
    }

    #[test]
    fn leave_reply_keeps_its_heading_when_rendered() {
        let rendered = attachment(&compose(Template::LeaveRequest, &asha())).unwrap();

        assert_eq!(rendered["pretext"], replies::LEAVE_PRETEXT);
        assert_eq!(rendered["text"], replies::LEAVE_BODY);
        assert_eq!(rendered["color"], "#4af030");
        assert_eq!(rendered["fallback"], format!("{} {}", replies::LEAVE_PRETEXT, replies::LEAVE_BODY.trim_end()));
        assert_eq!(rendered["fields"][0]["title"], replies::LEAVE_FORMAT_TITLE);
        assert_eq!(rendered["fields"][1], serde_json::json!({ "title": "Applicant", "value": "Asha", "short": false }));
    }

    #[test]
    fn greeting_reply_keeps_its_heading_when_rendered() {
        let rendered = attachment(&compose(Template::Greeting, &asha())).unwrap();

        assert_eq!(rendered["pretext"], replies::GREETING_PRETEXT);
        assert_eq!(rendered["text"], "How can I help you Asha?\n");
        assert_eq!(rendered["color"], "#3d3d3d");
        assert_eq!(rendered["fields"], serde_json::json!([]));
    }

    #[test]
    fn post_message_body_carries_the_channel_and_one_attachment() {
        let payload = compose(Template::LeaveRequest, &asha());
        let request = post_message_request("C1", &payload).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["channel"], "C1");
        assert_eq!(body["attachments"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["attachments"][0]["pretext"], replies::LEAVE_PRETEXT);
    }
}
