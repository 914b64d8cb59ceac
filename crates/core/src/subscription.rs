//! Daily quote-of-the-day subscriptions: strict `hh:mm` parsing and the
//! persistence seam the scheduler re-arms from at boot.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;
use crate::errors::StoreError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("time must match hh:mm")]
    BadFormat,
    #[error("hour must be between 00 and 23")]
    InvalidHour,
    #[error("minute must be between 00 and 59")]
    InvalidMinute,
}

/// Wall-clock time of day a subscription fires at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubscriptionTime {
    hour: u8,
    minute: u8,
}

impl SubscriptionTime {
    pub fn new(hour: u8, minute: u8) -> Result<Self, TimeParseError> {
        if hour > 23 {
            return Err(TimeParseError::InvalidHour);
        }
        if minute > 59 {
            return Err(TimeParseError::InvalidMinute);
        }
        Ok(Self { hour, minute })
    }

    /// Strict `hh:mm` parse. Shape is checked before ranges so a bad format
    /// and a bad hour produce distinct rejections in that order.
    pub fn parse(raw: &str) -> Result<Self, TimeParseError> {
        let bytes = raw.as_bytes();
        let shape_ok = bytes.len() == 5
            && bytes[0].is_ascii_digit()
            && bytes[1].is_ascii_digit()
            && bytes[2] == b':'
            && bytes[3].is_ascii_digit()
            && bytes[4].is_ascii_digit();
        if !shape_ok {
            return Err(TimeParseError::BadFormat);
        }

        let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
        Self::new(hour, minute)
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }
}

impl std::fmt::Display for SubscriptionTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::str::FromStr for SubscriptionTime {
    type Err = TimeParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub chat_id: UserId,
    pub time: SubscriptionTime,
}

/// Durable chat → time registry; written after every mutation so timers can
/// be re-armed across restarts.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn find(&self, chat_id: UserId) -> Result<Option<SubscriptionTime>, StoreError>;
    async fn upsert(&self, chat_id: UserId, time: SubscriptionTime) -> Result<(), StoreError>;
    async fn remove(&self, chat_id: UserId) -> Result<(), StoreError>;
    async fn list(&self) -> Result<Vec<Subscription>, StoreError>;
}
