//! Runtime services and shared state for the lunch-bot.

use tracing::{info, instrument};

use crate::{
    app::App,
    base::{
        config::Config,
        types::{Res, Void},
    },
    listeners::{events, handlers::menu},
    service::chat::ChatClient,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the application, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The application routing events to their listeners.
    pub app: App,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance backed by Slack.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        let app = App::new();

        // Initialize the slack client (this also initializes the app).
        let chat = ChatClient::slack(&config, app.clone()).await?;

        Self::with_chat(config, app, chat)
    }

    /// Assemble a runtime around an already initialized app and chat client, registering listeners.
    pub fn with_chat(config: Config, app: App, chat: ChatClient) -> Res<Self> {
        let menu = menu::handler(chat.clone(), &config);
        events::listener(&app, vec![menu])?;

        info!("Registered app mention listener.");

        Ok(Self { config, app, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
