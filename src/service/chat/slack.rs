//! Slack socket-mode transport.
//!
//! Authenticates the bot, initializes the application with the bot identity, and converts
//! push events into [`Event`]s for [`App::dispatch`].

use crate::{
    app::{App, event::Event},
    base::{
        config::Config,
        types::{Res, Void},
    },
};
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tracing::{debug, info, instrument, warn};

use std::{ops::Deref, sync::Arc};

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client, initializing `app` with the bot identity.
    pub async fn slack(config: &Config, app: App) -> Res<Self> {
        let client = SlackChatClient::new(config, app).await?;
        Ok(Self::from(client))
    }
}

impl From<SlackChatClient> for ChatClient {
    fn from(client: SlackChatClient) -> Self {
        Self::new(Arc::new(client))
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    app: App,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
    pub app: App,
}

impl Deref for SlackChatClient {
    type Target = FullClient;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config, app: App) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        // Get the bot's user ID.

        let session = client.open_session(&bot_token);
        let bot_user = session.auth_test().await?;
        let bot_user_id = bot_user.user_id.0;

        info!("Slack bot user ID: {}", bot_user_id);

        // The app accepts subscriptions once it knows who it is.
        app.initialize(bot_user_id);

        Ok(Self {
            app_token,
            bot_token,
            client,
            app,
        })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self) -> Void {
        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { app: self.app.clone() }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&self.app_token).await?;

        // Start WS connections and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_thread_ts(SlackTs(thread_ts.to_string()))
            .with_link_names(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new().with_text("No app commands are currently supported.".into())))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack.
///
/// Returning `Ok` from this callback is what acknowledges the envelope to Slack.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    match event_callback.event {
        SlackEventCallbackBody::AppMention(slack_app_mention_event) => {
            info!("Received app mention event ...");
            deliver(&user_state.app, Event::from(slack_app_mention_event))?;
        }
        _ => debug!("Ignoring push event without a listener."),
    }

    Ok(())
}

/// Dispatch `event` and decide whether the envelope may be acknowledged.
///
/// Lazy handlers are spawned, never awaited. An error here withholds the envelope ack, so the
/// platform sees the event as timed out when the ack callback skipped its handle.
fn deliver(app: &App, event: Event) -> Void {
    match app.dispatch(event) {
        Some(dispatch) => dispatch.ensure_acknowledged(),
        None => Ok(()),
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use crate::app::{EventOptions, GenericApp, ack::Ack, event::EventKind};

    use super::*;

    fn mention() -> Event {
        Event {
            kind: EventKind::AppMention,
            channel_id: "C01".to_string(),
            user_id: Some("U01".to_string()),
            text: "<@UBOT> lunch?".to_string(),
            ts: "1.0".to_string(),
            thread_ts: None,
        }
    }

    fn app_with_ack<F>(ack: F) -> App
    where
        F: Fn(Ack) + Send + Sync + 'static,
    {
        let app = App::new();
        app.initialize("UBOT");
        app.event(EventKind::AppMention, EventOptions::new().with_ack(ack)).unwrap();
        app
    }

    #[tokio::test]
    async fn acknowledged_event_releases_the_envelope() {
        let app = app_with_ack(Ack::ack);

        assert!(deliver(&app, mention()).is_ok());
    }

    #[tokio::test]
    async fn skipped_ack_withholds_the_envelope() {
        let app = app_with_ack(|_ack| {});

        assert!(deliver(&app, mention()).is_err());
    }

    #[tokio::test]
    async fn unrouted_event_releases_the_envelope() {
        let app = App::new();
        app.initialize("UBOT");

        assert!(deliver(&app, mention()).is_ok());
    }
}
