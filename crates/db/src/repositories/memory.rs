//! In-memory store implementations for tests and for running the bot
//! without a database file.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use brainbot_core::access::{AccessRole, AccessStore};
use brainbot_core::domain::{Actor, UserId};
use brainbot_core::errors::StoreError;
use brainbot_core::secrets::SecretPhrases;
use brainbot_core::subscription::{Subscription, SubscriptionStore, SubscriptionTime};

#[derive(Default)]
pub struct InMemoryAccessStore {
    records: Mutex<HashMap<(AccessRole, UserId), Actor>>,
}

impl InMemoryAccessStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_administrators(self, admins: Vec<Actor>) -> Self {
        {
            let mut records = self.records.lock().expect("lock");
            for admin in admins {
                records.insert((AccessRole::Administrator, admin.id), admin);
            }
        }
        self
    }
}

#[async_trait]
impl AccessStore for InMemoryAccessStore {
    async fn find(&self, role: AccessRole, id: UserId) -> Result<Option<Actor>, StoreError> {
        Ok(self.records.lock().expect("lock").get(&(role, id)).cloned())
    }

    async fn insert(&self, role: AccessRole, actor: Actor) -> Result<(), StoreError> {
        self.records.lock().expect("lock").insert((role, actor.id), actor);
        Ok(())
    }

    async fn remove(&self, role: AccessRole, id: UserId) -> Result<(), StoreError> {
        self.records.lock().expect("lock").remove(&(role, id));
        Ok(())
    }

    async fn list(&self, role: AccessRole) -> Result<Vec<Actor>, StoreError> {
        let mut actors: Vec<Actor> = self
            .records
            .lock()
            .expect("lock")
            .iter()
            .filter(|((r, _), _)| *r == role)
            .map(|(_, actor)| actor.clone())
            .collect();
        actors.sort_by_key(|actor| actor.id);
        Ok(actors)
    }
}

#[derive(Default)]
pub struct InMemorySubscriptionStore {
    records: Mutex<HashMap<UserId, SubscriptionTime>>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for InMemorySubscriptionStore {
    async fn find(&self, chat_id: UserId) -> Result<Option<SubscriptionTime>, StoreError> {
        Ok(self.records.lock().expect("lock").get(&chat_id).copied())
    }

    async fn upsert(&self, chat_id: UserId, time: SubscriptionTime) -> Result<(), StoreError> {
        self.records.lock().expect("lock").insert(chat_id, time);
        Ok(())
    }

    async fn remove(&self, chat_id: UserId) -> Result<(), StoreError> {
        self.records.lock().expect("lock").remove(&chat_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscription>, StoreError> {
        let mut subscriptions: Vec<Subscription> = self
            .records
            .lock()
            .expect("lock")
            .iter()
            .map(|(chat_id, time)| Subscription { chat_id: *chat_id, time: *time })
            .collect();
        subscriptions.sort_by_key(|subscription| subscription.chat_id);
        Ok(subscriptions)
    }
}

#[derive(Default)]
pub struct InMemorySecretPhrases {
    phrases: HashMap<String, String>,
}

impl InMemorySecretPhrases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phrase keys are expected pre-normalized, matching the table contract.
    pub fn with_phrase(mut self, phrase: impl Into<String>, response: impl Into<String>) -> Self {
        self.phrases.insert(phrase.into(), response.into());
        self
    }
}

#[async_trait]
impl SecretPhrases for InMemorySecretPhrases {
    async fn response_for(&self, phrase: &str) -> Result<Option<String>, StoreError> {
        Ok(self.phrases.get(phrase).cloned())
    }
}
