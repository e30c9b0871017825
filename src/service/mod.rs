//! Service integrations for external APIs and clients.
//!
//! This module contains the two collaborators the bot talks to:
//! - The socket-mode transport that delivers envelopes and takes acknowledgments.
//! - The chat REST API used to resolve users and post replies.
//!
//! Each service module defines both a generic trait and a concrete Slack
//! implementation, allowing for extensibility and easy testing.

pub mod chat;
pub mod socket;

mod slack;
