//! Seam between the subscription commands and the timer runtime.
//!
//! The real scheduler lives in the server binary where it can spawn timer
//! tasks; the handlers only need arm/disarm semantics.

use async_trait::async_trait;

use brainbot_core::domain::UserId;
use brainbot_core::subscription::SubscriptionTime;

#[async_trait]
pub trait SubscriptionScheduling: Send + Sync {
    /// Schedule the daily quote-of-the-day delivery for `chat_id` at `time`,
    /// replacing any previously armed timer for the same chat.
    async fn arm(&self, chat_id: UserId, time: SubscriptionTime);

    /// Cancel the timer for `chat_id`, if any.
    async fn disarm(&self, chat_id: UserId);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopScheduling;

#[async_trait]
impl SubscriptionScheduling for NoopScheduling {
    async fn arm(&self, _chat_id: UserId, _time: SubscriptionTime) {}
    async fn disarm(&self, _chat_id: UserId) {}
}
