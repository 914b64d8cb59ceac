//! Update pump: pulls inbound updates from an [`UpdateTransport`] and feeds
//! them through [`BotService`], reconnecting with exponential backoff when the
//! transport drops.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::events::{EventContext, UpdateEnvelope};
use crate::handlers::BotService;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("transport failed to connect: {0}")]
    Connect(String),
    #[error("transport read failed: {0}")]
    Receive(String),
    #[error("transport ack failed: {0}")]
    Acknowledge(String),
    #[error("transport disconnect failed: {0}")]
    Disconnect(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self { max_retries: 5, base_delay_ms: 250, max_delay_ms: 5_000 }
    }
}

impl ReconnectPolicy {
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        let multiplier = 1_u64 << exponent;
        let delay_ms = self.base_delay_ms.saturating_mul(multiplier).min(self.max_delay_ms);
        Duration::from_millis(delay_ms)
    }
}

/// Source of normalized inbound updates. `next_update` returning `Ok(None)`
/// means the stream closed cleanly.
#[async_trait]
pub trait UpdateTransport: Send + Sync {
    async fn connect(&self) -> Result<(), TransportError>;
    async fn next_update(&self) -> Result<Option<UpdateEnvelope>, TransportError>;
    async fn acknowledge(&self, update_id: i64) -> Result<(), TransportError>;
    async fn disconnect(&self) -> Result<(), TransportError>;
}

#[derive(Default)]
pub struct NoopUpdateTransport;

#[async_trait]
impl UpdateTransport for NoopUpdateTransport {
    async fn connect(&self) -> Result<(), TransportError> {
        Ok(())
    }

    async fn next_update(&self) -> Result<Option<UpdateEnvelope>, TransportError> {
        Ok(None)
    }

    async fn acknowledge(&self, _update_id: i64) -> Result<(), TransportError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

pub struct UpdatePump {
    transport: Arc<dyn UpdateTransport>,
    service: Arc<BotService>,
    reconnect_policy: ReconnectPolicy,
}

impl UpdatePump {
    pub fn new(
        transport: Arc<dyn UpdateTransport>,
        service: Arc<BotService>,
        reconnect_policy: ReconnectPolicy,
    ) -> Self {
        Self { transport, service, reconnect_policy }
    }

    pub async fn start(&self) -> Result<()> {
        for attempt in 0..=self.reconnect_policy.max_retries {
            match self.connect_and_pump(attempt).await {
                Ok(()) => return Ok(()),
                Err(transport_error) => {
                    warn!(
                        attempt,
                        max_retries = self.reconnect_policy.max_retries,
                        error = %transport_error,
                        "update transport failed"
                    );

                    if attempt >= self.reconnect_policy.max_retries {
                        warn!(
                            max_retries = self.reconnect_policy.max_retries,
                            "update transport retries exhausted; giving up the pump"
                        );
                        return Ok(());
                    }

                    let delay = self.reconnect_policy.backoff(attempt);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Ok(())
    }

    async fn connect_and_pump(&self, attempt: u32) -> Result<(), TransportError> {
        info!(attempt, "opening update transport connection");
        self.transport.connect().await?;
        info!(attempt, "update transport connected");

        loop {
            let Some(envelope) = self.transport.next_update().await? else {
                info!(attempt, "update stream closed");
                self.transport.disconnect().await?;
                return Ok(());
            };

            let context = EventContext::new();
            debug!(
                update_id = envelope.update_id,
                correlation_id = %context.correlation_id,
                "received update"
            );

            // Handler failures were already reported to the chat; the pump
            // only logs and keeps pulling.
            if let Err(error) = self.service.handle(&envelope, &context).await {
                warn!(
                    update_id = envelope.update_id,
                    correlation_id = %context.correlation_id,
                    error = %error,
                    "update handling failed; continuing pump"
                );
            }

            if let Err(error) = self.transport.acknowledge(envelope.update_id).await {
                warn!(
                    update_id = envelope.update_id,
                    correlation_id = %context.correlation_id,
                    error = %error,
                    "failed to acknowledge update"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex;

    use brainbot_core::access::AuthorizationGate;
    use brainbot_core::domain::{Actor, UserId};
    use brainbot_db::repositories::{
        InMemoryAccessStore, InMemorySecretPhrases, InMemorySubscriptionStore,
    };
    use brainbot_quotes::FixtureQuotesService;

    use super::{ReconnectPolicy, TransportError, UpdatePump, UpdateTransport};
    use crate::events::{BotEvent, CommandPayload, UpdateEnvelope};
    use crate::handlers::BotService;
    use crate::notifier::RecordingNotifier;
    use crate::scheduling::NoopScheduling;

    #[derive(Default)]
    struct ScriptedState {
        connect_results: VecDeque<Result<(), TransportError>>,
        updates: VecDeque<Result<Option<UpdateEnvelope>, TransportError>>,
        connect_attempts: usize,
        acknowledgements: Vec<i64>,
    }

    #[derive(Default)]
    struct ScriptedTransport {
        state: Mutex<ScriptedState>,
    }

    impl ScriptedTransport {
        fn with_script(
            connect_results: Vec<Result<(), TransportError>>,
            updates: Vec<Result<Option<UpdateEnvelope>, TransportError>>,
        ) -> Self {
            Self {
                state: Mutex::new(ScriptedState {
                    connect_results: connect_results.into(),
                    updates: updates.into(),
                    connect_attempts: 0,
                    acknowledgements: Vec::new(),
                }),
            }
        }

        async fn connect_attempts(&self) -> usize {
            self.state.lock().await.connect_attempts
        }

        async fn acknowledgements(&self) -> Vec<i64> {
            self.state.lock().await.acknowledgements.clone()
        }
    }

    #[async_trait]
    impl UpdateTransport for ScriptedTransport {
        async fn connect(&self) -> Result<(), TransportError> {
            let mut state = self.state.lock().await;
            state.connect_attempts += 1;
            state.connect_results.pop_front().unwrap_or(Ok(()))
        }

        async fn next_update(&self) -> Result<Option<UpdateEnvelope>, TransportError> {
            let mut state = self.state.lock().await;
            state.updates.pop_front().unwrap_or(Ok(None))
        }

        async fn acknowledge(&self, update_id: i64) -> Result<(), TransportError> {
            let mut state = self.state.lock().await;
            state.acknowledgements.push(update_id);
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    fn service(notifier: Arc<RecordingNotifier>) -> Arc<BotService> {
        let admin = Actor::new(UserId(1), "admin");
        let gate = AuthorizationGate::new(Arc::new(
            InMemoryAccessStore::new().with_administrators(vec![admin]),
        ));
        Arc::new(BotService::new(
            gate,
            notifier,
            Arc::new(FixtureQuotesService::new()),
            Arc::new(InMemorySubscriptionStore::new()),
            Arc::new(NoopScheduling),
            Arc::new(InMemorySecretPhrases::new()),
            5,
        ))
    }

    fn help_update(update_id: i64) -> UpdateEnvelope {
        UpdateEnvelope {
            update_id,
            event: BotEvent::Command(CommandPayload {
                actor: Actor::new(UserId(1), "admin"),
                chat_id: UserId(1),
                text: "/help".to_owned(),
            }),
        }
    }

    #[tokio::test]
    async fn pumps_updates_and_acknowledges_them_in_order() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![Ok(())],
            vec![Ok(Some(help_update(10))), Ok(Some(help_update(11))), Ok(None)],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let pump = UpdatePump::new(
            transport.clone(),
            service(notifier.clone()),
            ReconnectPolicy { max_retries: 0, base_delay_ms: 0, max_delay_ms: 0 },
        );

        pump.start().await.expect("pump");

        assert_eq!(transport.acknowledgements().await, vec![10, 11]);
        assert_eq!(notifier.sent_texts(UserId(1)).len(), 2);
    }

    #[tokio::test]
    async fn reconnects_after_initial_connect_failure() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![Err(TransportError::Connect("network down".to_owned())), Ok(())],
            vec![Ok(Some(help_update(7))), Ok(None)],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let pump = UpdatePump::new(
            transport.clone(),
            service(notifier),
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );

        pump.start().await.expect("pump");

        assert_eq!(transport.connect_attempts().await, 2);
        assert_eq!(transport.acknowledgements().await, vec![7]);
    }

    #[tokio::test]
    async fn exhausts_retries_without_crashing() {
        let transport = Arc::new(ScriptedTransport::with_script(
            vec![
                Err(TransportError::Connect("fail-1".to_owned())),
                Err(TransportError::Connect("fail-2".to_owned())),
                Err(TransportError::Connect("fail-3".to_owned())),
            ],
            vec![],
        ));
        let notifier = Arc::new(RecordingNotifier::new());
        let pump = UpdatePump::new(
            transport.clone(),
            service(notifier),
            ReconnectPolicy { max_retries: 2, base_delay_ms: 0, max_delay_ms: 0 },
        );

        pump.start().await.expect("pump degrades gracefully");
        assert_eq!(transport.connect_attempts().await, 3);
    }
}
