//! Library root for `lunch-bot`.
//!
//! Lunch-bot answers Slack app mentions with the lunch menu. Every mention is
//! acknowledged immediately, within the platform's three-second deadline, and
//! the slower reply is produced by deferred (lazy) handlers afterwards.
//!
//! The bot integrates with Slack over socket mode. The architecture is built around
//! small traits (`GenericApp`, `GenericChatClient`, `LazyHandler`) so each seam can be
//! replaced or mocked.

pub mod app;
pub mod base;
pub mod listeners;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the lunch-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context and registers listeners
/// - Starts the socket mode event loop
pub async fn start(config: Config) -> Void {
    info!("Starting lunch-bot ...");

    // Start the crypto provider.
    crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install the default crypto provider."))?;

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
