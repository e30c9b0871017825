//! Core components, types, and utilities for the ops-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The error taxonomy shared by the transport, dispatcher, and handlers.
//! - The closed event unions decoded from the socket-mode transport.
//! - Fixed reply wording and common types.

pub mod config;
pub mod error;
pub mod event;
pub mod replies;
pub mod types;
