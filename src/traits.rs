//! Trait definitions for the registry operations the lookup flow depends on.
//!
//! The `Edgar` client implements both traits against SEC.gov. The lookup
//! service in [`crate::report`] is generic over them, so tests and alternative
//! backends can substitute their own registry without any network access.

use super::company::CompanyTicker;
use super::error::Result;
use super::filings::Submission;
use async_trait::async_trait;

/// Operations for retrieving a filer's submission history and its documents.
#[async_trait]
pub trait FilingOperations: Send + Sync {
    /// Retrieves the full submissions record for a filer. `cik` may be padded or bare.
    async fn submissions(&self, cik: &str) -> Result<Submission>;
    /// Builds the archive URL for one document of one filing.
    fn filing_url(&self, cik: &str, accession_number: &str, document: &str) -> Result<String>;
    /// Downloads the raw bytes of one document of one filing.
    async fn filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        document: &str,
    ) -> Result<Vec<u8>>;
}

/// Operations for discovering companies known to the registry.
#[async_trait]
pub trait CompanyOperations: Send + Sync {
    /// Retrieves the registry's ticker-to-CIK file, in the registry's rank order.
    async fn company_tickers(&self) -> Result<Vec<CompanyTicker>>;
}
