//! Gatekeeping stages that run before command dispatch.
//!
//! Each stage either lets the event proceed or rejects it after sending its
//! own user-facing notice. The stack short-circuits on the first rejection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use brainbot_core::access::{AuthorizationGate, CheckOutcome};
use brainbot_core::errors::ApplicationError;
use brainbot_core::format;
use brainbot_core::paging::CallbackToken;

use crate::commands::parse_command;
use crate::events::{BotEvent, EventContext};
use crate::keyboard;
use crate::notifier::Notifier;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gatekeeping {
    Proceed,
    Rejected,
}

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn check(
        &self,
        event: &BotEvent,
        ctx: &EventContext,
    ) -> Result<Gatekeeping, ApplicationError>;
}

#[derive(Clone, Default)]
pub struct MiddlewareStack {
    stages: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stage(mut self, stage: Arc<dyn Middleware>) -> Self {
        self.stages.push(stage);
        self
    }

    pub async fn run(
        &self,
        event: &BotEvent,
        ctx: &EventContext,
    ) -> Result<Gatekeeping, ApplicationError> {
        for stage in &self.stages {
            if stage.check(event, ctx).await? == Gatekeeping::Rejected {
                return Ok(Gatekeeping::Rejected);
            }
        }
        Ok(Gatekeeping::Proceed)
    }
}

/// Enforces the whitelist. Unknown actors are put into the pending queue and
/// every administrator gets an approval request with Accept/Deny controls;
/// repeat contact while pending only reminds the actor.
pub struct AuthorizationMiddleware {
    gate: AuthorizationGate,
    notifier: Arc<dyn Notifier>,
}

impl AuthorizationMiddleware {
    pub fn new(gate: AuthorizationGate, notifier: Arc<dyn Notifier>) -> Self {
        Self { gate, notifier }
    }
}

#[async_trait]
impl Middleware for AuthorizationMiddleware {
    async fn check(
        &self,
        event: &BotEvent,
        ctx: &EventContext,
    ) -> Result<Gatekeeping, ApplicationError> {
        let Some(actor) = event.actor() else {
            return Ok(Gatekeeping::Proceed);
        };
        let chat = event.chat_id().unwrap_or(actor.id);

        match self.gate.check(actor).await? {
            CheckOutcome::Allowed => Ok(Gatekeeping::Proceed),
            CheckOutcome::Blacklisted => {
                self.notifier.send_message(chat, format::ACCESS_DENIED, None).await?;
                Ok(Gatekeeping::Rejected)
            }
            CheckOutcome::AwaitingApproval => {
                self.notifier.send_message(chat, format::AWAITING_APPROVAL, None).await?;
                Ok(Gatekeeping::Rejected)
            }
            CheckOutcome::RequestSubmitted { admins } => {
                info!(
                    correlation_id = %ctx.correlation_id,
                    user = %actor.id,
                    admins = admins.len(),
                    "access request submitted"
                );
                self.notifier.send_message(chat, format::REQUEST_SUBMITTED, None).await?;
                let request = format::approval_request(actor);
                for admin in &admins {
                    self.notifier
                        .send_message(admin.id, &request, Some(keyboard::approval(actor.id)))
                        .await?;
                }
                Ok(Gatekeeping::Rejected)
            }
        }
    }
}

/// Restricts moderation surfaces (`/whitelist`, `/blacklist`, `/stop` and the
/// Accept/Deny callbacks) to administrator chats. A refused attempt notifies
/// the actor and reports the violation to every administrator.
pub struct ModerationGuard {
    gate: AuthorizationGate,
    notifier: Arc<dyn Notifier>,
}

impl ModerationGuard {
    pub fn new(gate: AuthorizationGate, notifier: Arc<dyn Notifier>) -> Self {
        Self { gate, notifier }
    }

    fn guarded_surface(event: &BotEvent) -> Option<String> {
        match event {
            BotEvent::Command(payload) => parse_command(&payload.text)
                .filter(|command| command.is_moderation())
                .map(|command| command.keyword()),
            BotEvent::Callback(payload) => match CallbackToken::decode(&payload.data) {
                Ok(CallbackToken::Approve(_)) => Some("Accept".to_owned()),
                Ok(CallbackToken::Deny(_)) => Some("Deny".to_owned()),
                _ => None,
            },
            _ => None,
        }
    }
}

#[async_trait]
impl Middleware for ModerationGuard {
    async fn check(
        &self,
        event: &BotEvent,
        ctx: &EventContext,
    ) -> Result<Gatekeeping, ApplicationError> {
        let Some(surface) = Self::guarded_surface(event) else {
            return Ok(Gatekeeping::Proceed);
        };
        let Some(actor) = event.actor() else {
            return Ok(Gatekeeping::Proceed);
        };
        let chat = event.chat_id().unwrap_or(actor.id);

        if self.gate.is_administrator(chat).await? {
            return Ok(Gatekeeping::Proceed);
        }

        info!(
            correlation_id = %ctx.correlation_id,
            user = %actor.id,
            surface,
            "moderation surface refused"
        );
        self.notifier.send_message(chat, format::NO_PERMISSION, None).await?;
        let report = format::permission_violation(actor, &surface);
        for admin in &self.gate.administrators().await? {
            self.notifier.send_message(admin.id, &report, None).await?;
        }
        Ok(Gatekeeping::Rejected)
    }
}
