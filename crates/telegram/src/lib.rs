//! Telegram interface for brainbot.
//!
//! This crate owns everything between an inbound platform update and the
//! outbound sends: the event model (`events`), command parsing and dispatch
//! (`commands`, `handlers`), the authorization middleware pipeline
//! (`middleware`), inline-keyboard builders (`keyboard`), the outbound
//! notifier seam (`notifier`), and the update pump (`transport`).
//!
//! Transport wire mechanics (long polling, webhooks) are out of scope; the
//! pump is fed through the `UpdateTransport` trait and the default
//! implementation is a no-op.

pub mod commands;
pub mod events;
pub mod handlers;
pub mod keyboard;
pub mod middleware;
pub mod notifier;
pub mod scheduling;
pub mod transport;

pub use events::{BotEvent, EventContext, HandlerResult, UpdateEnvelope};
pub use handlers::BotService;
pub use notifier::{MessageId, Notifier, NotifyError};
pub use transport::{NoopUpdateTransport, UpdatePump, UpdateTransport};
