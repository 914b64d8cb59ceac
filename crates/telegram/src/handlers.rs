//! Command and callback dispatch.
//!
//! [`BotService`] is the application core of the bot: every update that
//! survives the middleware pipeline lands here, gets routed to a flow, and
//! produces outbound sends through the [`Notifier`] seam. A top-level guard
//! converts any flow failure into the uniform error report.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::Notify;
use tracing::{error, warn};

use brainbot_core::access::{ApprovalOutcome, AuthorizationGate, DenialOutcome};
use brainbot_core::domain::{Quote, UserId};
use brainbot_core::errors::{ApplicationError, DomainError};
use brainbot_core::format;
use brainbot_core::paging::{self, CallbackToken, PageCursor};
use brainbot_core::secrets::{normalize_phrase, SecretPhrases};
use brainbot_core::subscription::{SubscriptionStore, SubscriptionTime, TimeParseError};
use brainbot_quotes::{ApiError, QuotesService};

use crate::commands::{parse_command, Command};
use crate::events::{
    BotEvent, CallbackPayload, CommandPayload, EventContext, HandlerResult, TextPayload,
    UpdateEnvelope,
};
use crate::keyboard;
use crate::middleware::{Gatekeeping, MiddlewareStack};
use crate::notifier::{MessageId, Notifier};
use crate::scheduling::SubscriptionScheduling;

fn integration(err: ApiError) -> ApplicationError {
    ApplicationError::Integration(err.to_string())
}

/// Four-digit correlation code linking a user-facing error report to the
/// matching log line.
fn error_code() -> String {
    rand::thread_rng().gen_range(1000..10000).to_string()
}

pub struct BotService {
    gate: AuthorizationGate,
    notifier: Arc<dyn Notifier>,
    quotes: Arc<dyn QuotesService>,
    subscriptions: Arc<dyn SubscriptionStore>,
    scheduler: Arc<dyn SubscriptionScheduling>,
    secrets: Arc<dyn SecretPhrases>,
    middleware: MiddlewareStack,
    quote_page_size: u64,
    shutdown: Arc<Notify>,
}

impl BotService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gate: AuthorizationGate,
        notifier: Arc<dyn Notifier>,
        quotes: Arc<dyn QuotesService>,
        subscriptions: Arc<dyn SubscriptionStore>,
        scheduler: Arc<dyn SubscriptionScheduling>,
        secrets: Arc<dyn SecretPhrases>,
        quote_page_size: u64,
    ) -> Self {
        Self {
            gate,
            notifier,
            quotes,
            subscriptions,
            scheduler,
            secrets,
            middleware: MiddlewareStack::new(),
            quote_page_size,
            shutdown: Arc::new(Notify::new()),
        }
    }

    pub fn with_middleware(mut self, middleware: MiddlewareStack) -> Self {
        self.middleware = middleware;
        self
    }

    /// Notified once when `/stop` is accepted; the server selects on this.
    pub fn shutdown_signal(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    /// Entry point for the update pump. Middleware rejections count as
    /// handled; flow failures are reported through [`Self::report_failure`]
    /// and still surfaced to the caller for logging.
    pub async fn handle(
        &self,
        envelope: &UpdateEnvelope,
        ctx: &EventContext,
    ) -> Result<HandlerResult, ApplicationError> {
        match self.middleware.run(&envelope.event, ctx).await {
            Ok(Gatekeeping::Proceed) => {}
            Ok(Gatekeeping::Rejected) => return Ok(HandlerResult::Processed),
            Err(err) => {
                self.report_failure(&envelope.event, &err, ctx).await;
                return Err(err);
            }
        }

        match self.dispatch(&envelope.event).await {
            Ok(result) => Ok(result),
            Err(err) => {
                self.report_failure(&envelope.event, &err, ctx).await;
                Err(err)
            }
        }
    }

    async fn dispatch(&self, event: &BotEvent) -> Result<HandlerResult, ApplicationError> {
        match event {
            BotEvent::Command(payload) => match parse_command(&payload.text) {
                Some(command) => self.run_command(command, payload).await,
                None => Ok(HandlerResult::Ignored),
            },
            BotEvent::Callback(payload) => self.run_callback(payload).await,
            BotEvent::Text(payload) => self.run_text(payload).await,
            BotEvent::Unsupported { .. } => Ok(HandlerResult::Ignored),
        }
    }

    async fn run_command(
        &self,
        command: Command,
        payload: &CommandPayload,
    ) -> Result<HandlerResult, ApplicationError> {
        let chat = payload.chat_id;
        match command {
            Command::Quotes => self.cmd_quotes(chat).await,
            Command::Persons => self.cmd_persons(chat).await,
            Command::QuoteOfTheDay => {
                let quote = self.quotes.quote_of_the_day().await.map_err(integration)?;
                self.send(chat, &format::quote_of_the_day(&quote)).await?;
                Ok(HandlerResult::Responded)
            }
            Command::Random => {
                let quote = self.quotes.random().await.map_err(integration)?;
                self.send(chat, &format::quote(&quote)).await?;
                Ok(HandlerResult::Responded)
            }
            Command::Subscribe { raw_time } => self.cmd_subscribe(chat, raw_time).await,
            Command::Unsubscribe => self.cmd_unsubscribe(chat).await,
            Command::Whitelist { target } => self.cmd_whitelist(chat, target).await,
            Command::Blacklist { target } => self.cmd_blacklist(chat, target).await,
            Command::Stop => {
                self.send(chat, format::SHUTTING_DOWN).await?;
                self.shutdown.notify_one();
                Ok(HandlerResult::Responded)
            }
            Command::Help => {
                self.send(chat, format::HELP).await?;
                Ok(HandlerResult::Responded)
            }
            Command::Unknown { .. } => {
                self.send(chat, format::UNKNOWN_COMMAND).await?;
                Ok(HandlerResult::Responded)
            }
        }
    }

    /// Count first, then a placeholder message that is edited into page 1
    /// once it arrives, so the chat shows immediate feedback.
    async fn cmd_quotes(&self, chat: UserId) -> Result<HandlerResult, ApplicationError> {
        let count = self.quotes.count().await.map_err(integration)?;
        self.send(chat, &format::quotes_found(count)).await?;
        if count == 0 {
            return Ok(HandlerResult::Responded);
        }

        let placeholder = self.notifier.send_message(chat, format::LOADING_QUOTES, None).await?;
        let total = paging::total_pages(count, self.quote_page_size);
        let cursor = PageCursor::first(total).map_err(DomainError::from)?;
        let quotes = self.quotes.quotes(1, self.quote_page_size).await.map_err(integration)?;
        self.notifier
            .edit_message(chat, placeholder, &format::quote_list(&quotes), keyboard::pagination(cursor))
            .await?;
        Ok(HandlerResult::Responded)
    }

    async fn cmd_persons(&self, chat: UserId) -> Result<HandlerResult, ApplicationError> {
        let persons = self.quotes.persons().await.map_err(integration)?;
        self.send(chat, &format::persons_found(persons.len() as u64)).await?;
        if persons.is_empty() {
            return Ok(HandlerResult::Responded);
        }
        self.notifier
            .send_message(
                chat,
                &format::person_list(&persons),
                Some(keyboard::person_selection(&persons)),
            )
            .await?;
        Ok(HandlerResult::Responded)
    }

    /// Validation order is fixed: missing argument, then shape, then hour,
    /// then minute, and only then the already-subscribed check.
    async fn cmd_subscribe(
        &self,
        chat: UserId,
        raw_time: Option<String>,
    ) -> Result<HandlerResult, ApplicationError> {
        let Some(raw) = raw_time else {
            self.send(chat, format::NO_TIME_ARGUMENT).await?;
            return Ok(HandlerResult::Responded);
        };
        let time = match SubscriptionTime::parse(&raw) {
            Ok(time) => time,
            Err(err) => {
                let notice = match err {
                    TimeParseError::BadFormat => format::INCORRECT_TIME_FORMAT,
                    TimeParseError::InvalidHour => format::INVALID_HOUR,
                    TimeParseError::InvalidMinute => format::INVALID_MINUTE,
                };
                self.send(chat, notice).await?;
                return Ok(HandlerResult::Responded);
            }
        };

        if let Some(existing) = self.subscriptions.find(chat).await? {
            if existing == time {
                self.send(chat, &format::already_subscribed(time)).await?;
                return Ok(HandlerResult::Responded);
            }
            self.scheduler.disarm(chat).await;
            self.send(chat, &format::subscription_removed(existing)).await?;
        }

        self.subscriptions.upsert(chat, time).await?;
        self.scheduler.arm(chat, time).await;
        self.send(chat, &format::subscription_successful(time)).await?;
        Ok(HandlerResult::Responded)
    }

    async fn cmd_unsubscribe(&self, chat: UserId) -> Result<HandlerResult, ApplicationError> {
        match self.subscriptions.find(chat).await? {
            None => self.send(chat, format::NOT_SUBSCRIBED).await?,
            Some(existing) => {
                self.scheduler.disarm(chat).await;
                self.subscriptions.remove(chat).await?;
                self.send(chat, &format::subscription_removed(existing)).await?;
            }
        }
        Ok(HandlerResult::Responded)
    }

    async fn cmd_whitelist(
        &self,
        chat: UserId,
        target: Option<UserId>,
    ) -> Result<HandlerResult, ApplicationError> {
        match target {
            None => {
                let members = self.gate.whitelisted().await?;
                self.send(chat, &format::whitelist_overview(&members)).await?;
            }
            Some(subject) => self.approve(chat, subject).await?,
        }
        Ok(HandlerResult::Responded)
    }

    async fn cmd_blacklist(
        &self,
        chat: UserId,
        target: Option<UserId>,
    ) -> Result<HandlerResult, ApplicationError> {
        match target {
            None => {
                let members = self.gate.blacklisted().await?;
                self.send(chat, &format::blacklist_overview(&members)).await?;
            }
            Some(subject) => self.deny(chat, subject).await?,
        }
        Ok(HandlerResult::Responded)
    }

    async fn run_callback(
        &self,
        payload: &CallbackPayload,
    ) -> Result<HandlerResult, ApplicationError> {
        let chat = payload.chat_id;
        let token = match CallbackToken::decode(&payload.data) {
            Ok(token) => token,
            Err(err) => {
                // Stale or foreign button press: clear the spinner and move on.
                warn!(data = %payload.data, %err, "ignoring undecodable callback");
                self.notifier.answer_callback(&payload.callback_id).await?;
                return Ok(HandlerResult::Ignored);
            }
        };

        match token {
            CallbackToken::QuotePage(cursor) => {
                let quotes = self
                    .quotes
                    .quotes(cursor.page(), self.quote_page_size)
                    .await
                    .map_err(integration)?;
                self.notifier
                    .edit_message(
                        chat,
                        MessageId(payload.message_id),
                        &format::quote_list(&quotes),
                        keyboard::pagination(cursor),
                    )
                    .await?;
            }
            CallbackToken::PersonSelect(person_id) => {
                self.person_quotes(chat, person_id).await?;
            }
            CallbackToken::Approve(subject) => self.approve(chat, subject).await?,
            CallbackToken::Deny(subject) => self.deny(chat, subject).await?,
        }

        self.notifier.answer_callback(&payload.callback_id).await?;
        Ok(HandlerResult::Responded)
    }

    /// The backend has no per-person filter, so fetch everything in one page
    /// and filter on the quoted person's full name.
    async fn person_quotes(&self, chat: UserId, person_id: i64) -> Result<(), ApplicationError> {
        let persons = self.quotes.persons().await.map_err(integration)?;
        let Some(person) = persons.into_iter().find(|p| p.id == person_id) else {
            warn!(person_id, "person selection for unknown id");
            return Ok(());
        };

        let count = self.quotes.count().await.map_err(integration)?;
        let all = if count == 0 {
            Vec::new()
        } else {
            self.quotes.quotes(1, count).await.map_err(integration)?
        };
        let name = person.full_name();
        let matching: Vec<Quote> = all
            .into_iter()
            .filter(|quote| quote.quoted_persons.iter().any(|p| p.full_name() == name))
            .collect();

        self.send(chat, &format::quotes_found(matching.len() as u64)).await?;
        if !matching.is_empty() {
            self.send(chat, &format::quote_list(&matching)).await?;
        }
        Ok(())
    }

    async fn approve(&self, chat: UserId, subject: UserId) -> Result<(), ApplicationError> {
        match self.gate.approve(subject).await? {
            ApprovalOutcome::Approved { actor } => {
                self.send(subject, format::ACCESS_APPROVED).await?;
                self.send(chat, &format::approved_notice(&actor)).await?;
            }
            ApprovalOutcome::AlreadyWhitelisted => {
                self.send(chat, &format::already_whitelisted(subject)).await?;
            }
            ApprovalOutcome::AlreadyBlacklisted => {
                self.send(chat, &format::already_blacklisted(subject)).await?;
            }
        }
        Ok(())
    }

    async fn deny(&self, chat: UserId, subject: UserId) -> Result<(), ApplicationError> {
        match self.gate.deny(subject).await? {
            DenialOutcome::Denied { actor } => {
                self.send(subject, format::ACCESS_REJECTED).await?;
                self.send(chat, &format::denied_notice(&actor)).await?;
            }
            DenialOutcome::AlreadyWhitelisted => {
                self.send(chat, &format::already_whitelisted(subject)).await?;
            }
            DenialOutcome::AlreadyBlacklisted => {
                self.send(chat, &format::already_blacklisted(subject)).await?;
            }
            DenialOutcome::ProtectedAdministrator => {
                self.send(chat, format::ADMIN_PROTECTED).await?;
            }
        }
        Ok(())
    }

    /// Keyword responder: plain text is normalized and looked up against the
    /// secret-phrase table; misses stay silent.
    async fn run_text(&self, payload: &TextPayload) -> Result<HandlerResult, ApplicationError> {
        let normalized = normalize_phrase(&payload.text);
        if normalized.is_empty() {
            return Ok(HandlerResult::Ignored);
        }
        match self.secrets.response_for(&normalized).await? {
            Some(response) => {
                self.send(payload.chat_id, &response).await?;
                Ok(HandlerResult::Responded)
            }
            None => Ok(HandlerResult::Ignored),
        }
    }

    /// Uniform failure path: tell the requester something went wrong, log
    /// with a correlation code, and forward the coded report to every
    /// administrator unless the requester is one themselves.
    async fn report_failure(&self, event: &BotEvent, err: &ApplicationError, ctx: &EventContext) {
        let code = error_code();
        let interface = err.clone().into_interface(code.clone());
        error!(
            correlation_id = %ctx.correlation_id,
            code,
            detail = interface.detail(),
            "event handling failed"
        );

        let Some(actor) = event.actor() else {
            return;
        };
        let chat = event.chat_id().unwrap_or(actor.id);
        if let Err(send_err) = self.notifier.send_message(chat, format::ERROR_OCCURRED, None).await
        {
            error!(%send_err, "failed to deliver error notice");
        }

        if self.gate.is_administrator(actor.id).await.unwrap_or(false) {
            return;
        }
        let Ok(admins) = self.gate.administrators().await else {
            return;
        };
        let report = format::error_report(event.request_text(), actor, &code);
        for admin in admins {
            if let Err(send_err) = self.notifier.send_message(admin.id, &report, None).await {
                error!(%send_err, admin = %admin.id, "failed to forward error report");
            }
        }
    }

    async fn send(&self, chat: UserId, text: &str) -> Result<(), ApplicationError> {
        self.notifier.send_message(chat, text, None).await?;
        Ok(())
    }
}
