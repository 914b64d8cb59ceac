use brainbot_core::errors::StoreError;

pub mod access;
pub mod memory;
pub mod secrets;
pub mod subscription;

pub use access::SqlAccessStore;
pub use memory::{InMemoryAccessStore, InMemorySecretPhrases, InMemorySubscriptionStore};
pub use secrets::SqlSecretPhrases;
pub use subscription::SqlSubscriptionStore;

pub(crate) fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

pub(crate) fn corrupt(detail: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("corrupt row: {detail}"))
}
