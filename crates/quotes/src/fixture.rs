use async_trait::async_trait;

use brainbot_core::domain::{Person, Quote};

use crate::{ApiError, QuotesService};

/// Deterministic in-memory stand-in for the REST service, used by handler
/// and scheduler tests. Paging mirrors the `_page`/`_limit` semantics of the
/// real backend.
#[derive(Default)]
pub struct FixtureQuotesService {
    quotes: Vec<Quote>,
    persons: Vec<Person>,
}

impl FixtureQuotesService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quotes(mut self, quotes: Vec<Quote>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_persons(mut self, persons: Vec<Person>) -> Self {
        self.persons = persons;
        self
    }

    fn first_quote(&self) -> Result<Quote, ApiError> {
        self.quotes
            .first()
            .cloned()
            .ok_or_else(|| ApiError::Status { status: 404, url: "/random".to_owned() })
    }
}

#[async_trait]
impl QuotesService for FixtureQuotesService {
    async fn count(&self) -> Result<u64, ApiError> {
        Ok(self.quotes.len() as u64)
    }

    async fn quotes(&self, page: u64, limit: u64) -> Result<Vec<Quote>, ApiError> {
        let start = ((page.max(1) - 1) * limit) as usize;
        Ok(self.quotes.iter().skip(start).take(limit as usize).cloned().collect())
    }

    async fn random(&self) -> Result<Quote, ApiError> {
        self.first_quote()
    }

    async fn quote_of_the_day(&self) -> Result<Quote, ApiError> {
        self.first_quote()
    }

    async fn persons(&self) -> Result<Vec<Person>, ApiError> {
        Ok(self.persons.clone())
    }

    async fn submit(&self, _quote: &Quote) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use brainbot_core::domain::{PersonRef, Quote};

    use super::FixtureQuotesService;
    use crate::QuotesService;

    fn quote(text: &str) -> Quote {
        Quote {
            quote: text.to_owned(),
            quoted_persons: vec![PersonRef::new("Ada", "Lovelace")],
            brain: 1,
            quoter: PersonRef::new("Alan", "Turing"),
            date: "2024-03-01".to_owned(),
        }
    }

    #[tokio::test]
    async fn paging_mirrors_page_and_limit_semantics() {
        let service = FixtureQuotesService::new().with_quotes(
            (1..=12).map(|i| quote(&format!("q{i}"))).collect(),
        );

        assert_eq!(service.count().await.expect("count"), 12);

        let page_one = service.quotes(1, 5).await.expect("page 1");
        assert_eq!(page_one.len(), 5);
        assert_eq!(page_one[0].quote, "q1");

        let last_page = service.quotes(3, 5).await.expect("page 3");
        assert_eq!(last_page.len(), 2);
        assert_eq!(last_page[0].quote, "q11");
    }

    #[tokio::test]
    async fn empty_fixture_surfaces_a_hard_failure_for_single_quotes() {
        let service = FixtureQuotesService::new();
        assert!(service.random().await.is_err());
        assert!(service.quote_of_the_day().await.is_err());
    }
}
