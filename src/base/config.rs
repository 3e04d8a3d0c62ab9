//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default text posted by the menu handler in reply to a mention.
fn default_menu_reply() -> String {
    "Checking today's lunch menu ...".to_string()
}

/// Configuration for the lunch-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app-level token used for socket mode (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token used for Web API calls (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Text the menu handler posts in the mention's thread (`MENU_REPLY`).
    #[serde(default = "default_menu_reply")]
    pub menu_reply: String,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("LUNCH_BOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    fn validate(&self) -> Res<()> {
        if !self.slack_app_token.starts_with("xapp-") {
            return Err(anyhow::anyhow!("Slack app token must be an app-level token (`xapp-...`)."));
        }

        if !self.slack_bot_token.starts_with("xoxb-") {
            return Err(anyhow::anyhow!("Slack bot token must be a bot token (`xoxb-...`)."));
        }

        if self.menu_reply.trim().is_empty() {
            return Err(anyhow::anyhow!("Menu reply must not be empty."));
        }

        Ok(())
    }
}

// Tests.
