pub mod access;
pub mod config;
pub mod domain;
pub mod errors;
pub mod format;
pub mod paging;
pub mod secrets;
pub mod subscription;

pub use access::{
    AccessRole, AccessStore, ApprovalOutcome, AuthorizationGate, CheckOutcome, DenialOutcome,
};
pub use domain::{Actor, Person, PersonRef, Quote, UserId};
pub use errors::{ApplicationError, DomainError, InterfaceError, StoreError};
pub use paging::{Affordance, CallbackToken, PageCursor, PageNav, TokenError};
pub use secrets::SecretPhrases;
pub use subscription::{Subscription, SubscriptionStore, SubscriptionTime, TimeParseError};
