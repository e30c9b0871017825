//! Event handling and user interactions for ops-bot.
//!
//! This module turns inbound envelopes into replies:
//! - Classifying envelopes by kind, callback type, and inner event
//! - Dispatching them in order with per-envelope error isolation
//! - Handling @-mentions and composing the reply
//! - Sending one-shot notifications outside the event loop

pub mod app_mention;
pub mod classify;
pub mod compose;
pub mod dispatch;
pub mod notify;
