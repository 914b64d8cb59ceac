use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use brainbot_core::domain::{Person, Quote};

use crate::{ApiError, CountResponse, QuotesService};

const COUNT_PATH: &str = "/count";
const QUOTES_PATH: &str = "/quotes";
const RANDOM_PATH: &str = "/random";
const QUOTE_OF_THE_DAY_PATH: &str = "/quoteoftheday";
const PERSONS_PATH: &str = "/persons";

/// HTTP client for the quotes REST service.
pub struct QuoteServiceClient {
    http: Client,
    base_url: String,
}

impl QuoteServiceClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        Ok(Self { http, base_url: base_url.into() })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ApiError> {
        debug!(url = %url, "quote service request");
        let response = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url });
        }

        response.json::<T>().await.map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait]
impl QuotesService for QuoteServiceClient {
    async fn count(&self) -> Result<u64, ApiError> {
        let response: CountResponse = self.get_json(self.url(COUNT_PATH)).await?;
        Ok(response.count)
    }

    async fn quotes(&self, page: u64, limit: u64) -> Result<Vec<Quote>, ApiError> {
        let url = format!("{}?_page={page}&_limit={limit}", self.url(QUOTES_PATH));
        self.get_json(url).await
    }

    async fn random(&self) -> Result<Quote, ApiError> {
        self.get_json(self.url(RANDOM_PATH)).await
    }

    async fn quote_of_the_day(&self) -> Result<Quote, ApiError> {
        self.get_json(self.url(QUOTE_OF_THE_DAY_PATH)).await
    }

    async fn persons(&self) -> Result<Vec<Person>, ApiError> {
        self.get_json(self.url(PERSONS_PATH)).await
    }

    async fn submit(&self, quote: &Quote) -> Result<(), ApiError> {
        let url = self.url(QUOTES_PATH);
        let response = self
            .http
            .post(&url)
            .json(quote)
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), url });
        }
        Ok(())
    }
}
