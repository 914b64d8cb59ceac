//! Client for the upstream quotes REST service.
//!
//! The service is a black-box data source with a fixed contract:
//! `GET /count`, `GET /quotes?_page=P&_limit=L`, `GET /random`,
//! `GET /quoteoftheday`, `GET /persons`, `POST /quotes`. Any non-2xx
//! response is a hard failure surfaced to the caller.

pub mod client;
pub mod fixture;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use brainbot_core::domain::{Person, Quote};

pub use client::QuoteServiceClient;
pub use fixture::FixtureQuotesService;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("quote service returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("quote service request failed: {0}")]
    Transport(String),
    #[error("quote service response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Seam between the handlers and the REST backend.
#[async_trait]
pub trait QuotesService: Send + Sync {
    async fn count(&self) -> Result<u64, ApiError>;
    async fn quotes(&self, page: u64, limit: u64) -> Result<Vec<Quote>, ApiError>;
    async fn random(&self) -> Result<Quote, ApiError>;
    async fn quote_of_the_day(&self) -> Result<Quote, ApiError>;
    async fn persons(&self) -> Result<Vec<Person>, ApiError>;
    async fn submit(&self, quote: &Quote) -> Result<(), ApiError>;
}
