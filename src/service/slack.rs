//! Shared plumbing for the Slack implementations.

use std::sync::Arc;

use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};

use crate::base::{error::BotError, types::Res};

// Type aliases.

pub(crate) type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

/// Slack API error codes that mean a token is unusable.
const AUTH_ERROR_CODES: &[&str] = &["invalid_auth", "not_authed", "token_revoked", "token_expired", "account_inactive", "not_allowed_token_type"];

/// Creates an HTTPS Slack client.
pub(crate) fn new_client() -> Res<Arc<FullClient>> {
    let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
    let connector = SlackClientHyperConnector::with_connector(https_connector);

    Ok(Arc::new(slack_morphism::SlackClient::new(connector)))
}

/// Maps a Slack client error onto the transport-level taxonomy.
pub(crate) fn classify_slack_error(err: SlackClientError) -> BotError {
    if let SlackClientError::ApiError(ae) = &err
        && AUTH_ERROR_CODES.contains(&ae.code.as_str())
    {
        return BotError::Auth(ae.code.clone());
    }

    BotError::Connection(err.to_string())
}
