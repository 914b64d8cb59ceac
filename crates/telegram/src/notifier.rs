//! Outbound delivery seam.
//!
//! Handlers never talk to the platform API directly; they go through
//! [`Notifier`] so the whole service can be exercised in tests against
//! [`RecordingNotifier`] and run headless with [`NoopNotifier`].

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use brainbot_core::domain::UserId;
use brainbot_core::errors::ApplicationError;

use crate::keyboard::InlineKeyboard;

/// Platform-assigned id of a sent message, needed to edit it in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MessageId(pub i64);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("outbound send failed: {0}")]
    Send(String),
    #[error("outbound edit failed: {0}")]
    Edit(String),
}

impl From<NotifyError> for ApplicationError {
    fn from(value: NotifyError) -> Self {
        ApplicationError::Integration(value.to_string())
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(
        &self,
        chat: UserId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageId, NotifyError>;

    async fn edit_message(
        &self,
        chat: UserId,
        message: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError>;

    /// Clear the client-side spinner on an inline button press.
    async fn answer_callback(&self, callback_id: &str) -> Result<(), NotifyError>;
}

/// Discards everything. Used when running without a configured transport.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_message(
        &self,
        chat: UserId,
        text: &str,
        _keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageId, NotifyError> {
        debug!(%chat, text, "dropping outbound message");
        Ok(MessageId(0))
    }

    async fn edit_message(
        &self,
        chat: UserId,
        message: MessageId,
        text: &str,
        _keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        debug!(%chat, message = message.0, text, "dropping outbound edit");
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), NotifyError> {
        debug!(callback_id, "dropping callback answer");
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    Sent { chat: UserId, message: MessageId, text: String, keyboard: Option<InlineKeyboard> },
    Edited { chat: UserId, message: MessageId, text: String, keyboard: Option<InlineKeyboard> },
    CallbackAnswered { callback_id: String },
}

/// Captures outbound traffic in order, for assertions in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    outbound: Mutex<Vec<OutboundMessage>>,
    next_id: AtomicI64,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outbound(&self) -> Vec<OutboundMessage> {
        self.outbound.lock().expect("lock").clone()
    }

    /// Texts sent (not edited) to `chat`, in delivery order.
    pub fn sent_texts(&self, chat: UserId) -> Vec<String> {
        self.outbound
            .lock()
            .expect("lock")
            .iter()
            .filter_map(|entry| match entry {
                OutboundMessage::Sent { chat: c, text, .. } if *c == chat => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(
        &self,
        chat: UserId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageId, NotifyError> {
        let message = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.outbound.lock().expect("lock").push(OutboundMessage::Sent {
            chat,
            message,
            text: text.to_owned(),
            keyboard,
        });
        Ok(message)
    }

    async fn edit_message(
        &self,
        chat: UserId,
        message: MessageId,
        text: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<(), NotifyError> {
        self.outbound.lock().expect("lock").push(OutboundMessage::Edited {
            chat,
            message,
            text: text.to_owned(),
            keyboard,
        });
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), NotifyError> {
        self.outbound
            .lock()
            .expect("lock")
            .push(OutboundMessage::CallbackAnswered { callback_id: callback_id.to_owned() });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use brainbot_core::domain::UserId;

    use super::{Notifier, OutboundMessage, RecordingNotifier};

    #[tokio::test]
    async fn recording_notifier_assigns_increasing_message_ids() {
        let notifier = RecordingNotifier::new();
        let first = notifier.send_message(UserId(1), "a", None).await.expect("send");
        let second = notifier.send_message(UserId(1), "b", None).await.expect("send");
        assert!(second.0 > first.0);

        notifier.edit_message(UserId(1), first, "a2", None).await.expect("edit");
        let outbound = notifier.outbound();
        assert_eq!(outbound.len(), 3);
        assert!(matches!(outbound[2], OutboundMessage::Edited { .. }));
        assert_eq!(notifier.sent_texts(UserId(1)), vec!["a", "b"]);
    }
}
