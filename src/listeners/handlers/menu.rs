//! Lunch menu reply for app mentions.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::{
    app::{LazyHandler, event::Event},
    base::{config::Config, types::Void},
    service::chat::ChatClient,
};

/// Replies to a mention in its thread with the configured menu text.
pub struct MenuHandler {
    chat: ChatClient,
    reply: String,
}

impl MenuHandler {
    pub fn new(chat: ChatClient, reply: impl Into<String>) -> Self {
        Self { chat, reply: reply.into() }
    }
}

#[async_trait]
impl LazyHandler for MenuHandler {
    #[instrument(skip_all, fields(channel_id = %event.channel_id, ts = %event.ts))]
    async fn process(&self, event: &Event) -> Void {
        info!("Replying with the lunch menu ...");

        self.chat.send_message(&event.channel_id, event.reply_ts(), &self.reply).await
    }

    fn name(&self) -> &'static str {
        "menu"
    }
}

/// The menu handler, ready to be passed to the mention listener.
pub fn handler(chat: ChatClient, config: &Config) -> Arc<dyn LazyHandler> {
    Arc::new(MenuHandler::new(chat, config.menu_reply.clone()))
}
