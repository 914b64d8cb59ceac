//! Daily quote-of-the-day timers.
//!
//! One detached task per subscribed chat. Each task sleeps until the next
//! `hh:mm` wall-clock occurrence, delivers the quote of the day, and goes
//! back to sleep for the next day. Timers are re-armed from the subscription
//! store at boot, so restarts do not lose deliveries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime, NaiveTime};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use brainbot_core::domain::UserId;
use brainbot_core::errors::StoreError;
use brainbot_core::format;
use brainbot_core::subscription::{SubscriptionStore, SubscriptionTime};
use brainbot_quotes::QuotesService;
use brainbot_telegram::scheduling::SubscriptionScheduling;
use brainbot_telegram::Notifier;

pub struct SubscriptionScheduler {
    notifier: Arc<dyn Notifier>,
    quotes: Arc<dyn QuotesService>,
    timers: Mutex<HashMap<UserId, JoinHandle<()>>>,
}

impl SubscriptionScheduler {
    pub fn new(notifier: Arc<dyn Notifier>, quotes: Arc<dyn QuotesService>) -> Self {
        Self { notifier, quotes, timers: Mutex::new(HashMap::new()) }
    }

    /// Spawn timers for every persisted subscription. Called once at boot.
    pub async fn rearm_all(&self, store: &dyn SubscriptionStore) -> Result<usize, StoreError> {
        let subscriptions = store.list().await?;
        let count = subscriptions.len();
        for subscription in subscriptions {
            self.spawn_timer(subscription.chat_id, subscription.time);
        }
        Ok(count)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.lock().expect("lock").len()
    }

    fn spawn_timer(&self, chat_id: UserId, time: SubscriptionTime) {
        let notifier = self.notifier.clone();
        let quotes = self.quotes.clone();
        let handle = tokio::spawn(async move {
            loop {
                let wait = duration_until_next(Local::now().naive_local(), time);
                tokio::time::sleep(wait).await;
                match quotes.quote_of_the_day().await {
                    Ok(quote) => {
                        let text = format::quote_of_the_day(&quote);
                        if let Err(err) = notifier.send_message(chat_id, &text, None).await {
                            warn!(chat = %chat_id, %err, "daily quote delivery failed");
                        } else {
                            info!(chat = %chat_id, "daily quote delivered");
                        }
                    }
                    Err(err) => {
                        warn!(chat = %chat_id, %err, "daily quote fetch failed; will retry tomorrow");
                    }
                }
            }
        });

        let mut timers = self.timers.lock().expect("lock");
        if let Some(previous) = timers.insert(chat_id, handle) {
            previous.abort();
        }
    }
}

#[async_trait]
impl SubscriptionScheduling for SubscriptionScheduler {
    async fn arm(&self, chat_id: UserId, time: SubscriptionTime) {
        self.spawn_timer(chat_id, time);
    }

    async fn disarm(&self, chat_id: UserId) {
        if let Some(handle) = self.timers.lock().expect("lock").remove(&chat_id) {
            handle.abort();
        }
    }
}

impl Drop for SubscriptionScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.timers.lock().expect("lock").drain() {
            handle.abort();
        }
    }
}

/// Time until the next wall-clock occurrence of `time`, strictly in the
/// future: asking at exactly `hh:mm` yields a full day.
fn duration_until_next(now: NaiveDateTime, time: SubscriptionTime) -> std::time::Duration {
    let at = NaiveTime::from_hms_opt(u32::from(time.hour()), u32::from(time.minute()), 0)
        .unwrap_or(NaiveTime::MIN);
    let mut target = now.date().and_time(at);
    if target <= now {
        target += chrono::Duration::days(1);
    }
    (target - now).to_std().unwrap_or_default()
}
