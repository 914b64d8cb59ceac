//! Inbound event model.
//!
//! Transports normalize raw platform updates into [`UpdateEnvelope`]s before
//! they reach the middleware pipeline and the command router. Everything the
//! handlers need is carried here; no platform payloads leak past this module.

use brainbot_core::domain::{Actor, UserId};
use uuid::Uuid;

/// One inbound update, tagged with the platform's monotonically increasing
/// update id so the transport can acknowledge it after handling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateEnvelope {
    pub update_id: i64,
    pub event: BotEvent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BotEvent {
    /// A slash command, e.g. `/quotes` or `/subscribe 09:30`.
    Command(CommandPayload),
    /// A press on an inline keyboard button.
    Callback(CallbackPayload),
    /// Plain chat text with no leading slash.
    Text(TextPayload),
    /// Update kinds the bot does not handle (stickers, edits, joins, ...).
    Unsupported { kind: String },
}

impl BotEvent {
    pub fn actor(&self) -> Option<&Actor> {
        match self {
            BotEvent::Command(payload) => Some(&payload.actor),
            BotEvent::Callback(payload) => Some(&payload.actor),
            BotEvent::Text(payload) => Some(&payload.actor),
            BotEvent::Unsupported { .. } => None,
        }
    }

    pub fn chat_id(&self) -> Option<UserId> {
        match self {
            BotEvent::Command(payload) => Some(payload.chat_id),
            BotEvent::Callback(payload) => Some(payload.chat_id),
            BotEvent::Text(payload) => Some(payload.chat_id),
            BotEvent::Unsupported { .. } => None,
        }
    }

    /// A short description of what the user asked for, used in error reports
    /// forwarded to administrators.
    pub fn request_text(&self) -> &str {
        match self {
            BotEvent::Command(payload) => &payload.text,
            BotEvent::Callback(payload) => &payload.data,
            BotEvent::Text(payload) => &payload.text,
            BotEvent::Unsupported { kind } => kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandPayload {
    pub actor: Actor,
    pub chat_id: UserId,
    /// Full message text including the leading slash.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackPayload {
    pub actor: Actor,
    pub chat_id: UserId,
    /// Message the pressed keyboard is attached to.
    pub message_id: i64,
    /// Platform callback query id, answered after handling.
    pub callback_id: String,
    /// Encoded callback token, see `brainbot_core::paging::CallbackToken`.
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextPayload {
    pub actor: Actor,
    pub chat_id: UserId,
    pub text: String,
}

/// Per-update context threaded through middleware and handlers, mainly so
/// log lines for one update can be correlated.
#[derive(Clone, Debug)]
pub struct EventContext {
    pub correlation_id: String,
}

impl EventContext {
    pub fn new() -> Self {
        Self { correlation_id: Uuid::new_v4().to_string() }
    }
}

impl Default for EventContext {
    fn default() -> Self {
        Self::new()
    }
}

/// What the service did with an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// A reply was sent to the originating chat.
    Responded,
    /// Handled without a user-visible reply (rejected by middleware,
    /// callback answered silently, ...).
    Processed,
    /// Not addressed to us; dropped without side effects.
    Ignored,
}

#[cfg(test)]
mod tests {
    use brainbot_core::domain::{Actor, UserId};

    use super::{BotEvent, CommandPayload, EventContext};

    #[test]
    fn command_event_exposes_actor_and_chat() {
        let event = BotEvent::Command(CommandPayload {
            actor: Actor::new(UserId(5), "Kim"),
            chat_id: UserId(-100),
            text: "/quotes".into(),
        });

        assert_eq!(event.actor().map(|a| a.id), Some(UserId(5)));
        assert_eq!(event.chat_id(), Some(UserId(-100)));
        assert_eq!(event.request_text(), "/quotes");
    }

    #[test]
    fn unsupported_event_has_no_actor() {
        let event = BotEvent::Unsupported { kind: "sticker".into() };
        assert!(event.actor().is_none());
        assert!(event.chat_id().is_none());
    }

    #[test]
    fn contexts_get_distinct_correlation_ids() {
        assert_ne!(EventContext::new().correlation_id, EventContext::new().correlation_id);
    }
}
