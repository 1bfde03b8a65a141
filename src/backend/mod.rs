//! Backend adapter: the I/O boundary behind every tool.
//!
//! Tool handlers only talk to the [`Backend`] trait. [`HttpBackend`] is the
//! production implementation against the trademark API; tests swap in
//! doubles. Write operations are not idempotent.

mod error;
mod http;
pub mod pricing;
mod types;


pub use error::BackendError;
pub use http::HttpBackend;
pub use types::{
    CountryPrice, FilingConfirmation, FilingRecord, FilingRequest, PriceValue, SearchRecord,
    SearchRequest, SearchSubmission,
};

#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Short identifier used in logs.
    fn id(&self) -> &str;

    /// Submit a trademark availability search. Creates a record and triggers
    /// the results email.
    async fn submit_search(&self, request: &SearchRequest)
        -> Result<SearchSubmission, BackendError>;

    /// Searches previously submitted for `email`, optionally narrowed to one id.
    async fn list_searches(
        &self,
        email: &str,
        search_id: Option<&str>,
    ) -> Result<Vec<SearchRecord>, BackendError>;

    /// Create a filing order.
    async fn create_filing(&self, request: &FilingRequest)
        -> Result<FilingConfirmation, BackendError>;

    /// Filings for `email`, optionally narrowed to one id.
    async fn get_filings(
        &self,
        email: &str,
        filing_id: Option<&str>,
    ) -> Result<Vec<FilingRecord>, BackendError>;

    /// Price the given countries. Defaults to the static table.
    async fn pricing(&self, countries: &[String]) -> Result<Vec<CountryPrice>, BackendError> {
        Ok(pricing::quote(countries))
    }
}
