//! Events delivered by the chat platform to the application.

use std::fmt;

use serde::{Deserialize, Serialize};
use slack_morphism::prelude::*;

/// The kind of an incoming event, keyed by the platform's wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The bot account was referenced in a message.
    AppMention,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AppMention => "app_mention",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An incoming event, owned by the host.
///
/// Listeners never interpret its content; lazy handlers receive it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub channel_id: String,
    pub user_id: Option<String>,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
}

impl Event {
    /// The timestamp replies should be threaded under.
    pub fn reply_ts(&self) -> &str {
        self.thread_ts.as_deref().unwrap_or(&self.ts)
    }
}

impl From<SlackAppMentionEvent> for Event {
    fn from(event: SlackAppMentionEvent) -> Self {
        Self {
            kind: EventKind::AppMention,
            channel_id: event.channel.0,
            user_id: Some(event.user.0),
            text: event.content.text.unwrap_or_default(),
            ts: event.origin.ts.0,
            thread_ts: event.origin.thread_ts.map(|ts| ts.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(thread_ts: Option<&str>) -> Event {
        Event {
            kind: EventKind::AppMention,
            channel_id: "C01".to_string(),
            user_id: Some("U01".to_string()),
            text: "<@UBOT> lunch?".to_string(),
            ts: "100.000".to_string(),
            thread_ts: thread_ts.map(str::to_string),
        }
    }

    #[test]
    fn kind_uses_wire_names() {
        assert_eq!(EventKind::AppMention.to_string(), "app_mention");
        assert_eq!(serde_json::to_string(&EventKind::AppMention).unwrap(), "\"app_mention\"");
    }

    #[test]
    fn replies_go_under_the_thread_when_present() {
        assert_eq!(event(None).reply_ts(), "100.000");
        assert_eq!(event(Some("50.000")).reply_ts(), "50.000");
    }

    #[test]
    fn app_mention_converts_from_slack_payload() {
        let payload = serde_json::json!({
            "type": "app_mention",
            "user": "U01",
            "text": "<@UBOT> what's for lunch?",
            "ts": "1700000000.000100",
            "channel": "C01",
            "event_ts": "1700000000.000100"
        });

        let slack: SlackAppMentionEvent = serde_json::from_value(payload).unwrap();
        let event = Event::from(slack);

        assert_eq!(event.kind, EventKind::AppMention);
        assert_eq!(event.channel_id, "C01");
        assert_eq!(event.user_id.as_deref(), Some("U01"));
        assert_eq!(event.text, "<@UBOT> what's for lunch?");
        assert_eq!(event.thread_ts, None);
    }
}
