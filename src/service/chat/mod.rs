pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{MessageRef, ReplyPayload, Res, UserInfo};

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the REST side of a chat platform like Slack: the calls the bot
/// makes while handling an event. Implementing this trait allows different chat
/// services to be used with the ops-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Resolve a user ID into a user with a display name.
    async fn resolve_user(&self, user_id: &str) -> Res<UserInfo>;

    /// Post a styled reply to a channel.
    ///
    /// Returns a reference to the posted message.
    async fn post_message(&self, channel_id: &str, payload: &ReplyPayload) -> Res<MessageRef>;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
