//! Event listeners for lunch-bot.
//!
//! This module binds incoming events to their callbacks:
//! - Registering the app mention subscription at startup
//! - Acknowledging mentions within the platform deadline
//! - Deferred handlers that do the slower work

pub mod events;
pub mod handlers;
