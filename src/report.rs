//! The 10-K lookup: resolve a company, fetch its submissions, extract the
//! latest annual report and describe where its document lives.

use super::cik;
use super::company::{CompanyDirectory, CompanyRecord, CompanyResolver};
use super::error::{EdgarError, Result};
use super::filings::{FORM_10K, FilingRecord, Submission, extract_latest_filing};
use super::traits::FilingOperations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metric names reserved in [`Filing10KResult::financial_data`].
pub const FINANCIAL_METRICS: [&str; 5] = [
    "revenue",
    "netIncome",
    "totalAssets",
    "totalLiabilities",
    "stockholdersEquity",
];

/// One reported value of an XBRL fact. Reserved for structured-data
/// extraction; lookups currently leave every series empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactUnit {
    pub end: String,
    pub val: serde_json::Value,
    pub accn: String,
    pub fy: Option<i32>,
    pub fp: Option<String>,
    pub form: String,
    pub filed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

/// Result of a 10-K lookup for one company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing10KResult {
    #[serde(rename = "companyInfo")]
    pub company: CompanyRecord,
    #[serde(rename = "latestFiling")]
    pub latest_filing: Option<FilingRecord>,
    #[serde(rename = "financialData")]
    pub financial_data: BTreeMap<String, Vec<FactUnit>>,
}

impl Filing10KResult {
    /// Archive URL of the latest filing's primary document, if there is one.
    pub fn document_url<F: FilingOperations + ?Sized>(&self, filings: &F) -> Option<String> {
        let filing = self.latest_filing.as_ref()?;
        filings
            .filing_url(
                &self.company.registry_id,
                &filing.accession_number,
                &filing.primary_document,
            )
            .ok()
    }
}

fn empty_financial_data() -> BTreeMap<String, Vec<FactUnit>> {
    FINANCIAL_METRICS
        .iter()
        .map(|metric| (metric.to_string(), Vec::new()))
        .collect()
}

/// Combines the directory entry (if any) with what the registry reports.
/// Directory values win; the registry fills the gaps.
fn merge_company(
    canonical_id: String,
    directory: Option<&CompanyRecord>,
    submission: &Submission,
) -> CompanyRecord {
    let registry_name = Some(submission.name.trim()).filter(|n| !n.is_empty());
    let display_name = directory
        .map(|r| r.display_name.clone())
        .or_else(|| registry_name.map(str::to_string))
        .unwrap_or_else(|| "Unknown".to_string());
    let ticker_symbol = directory
        .and_then(|r| r.ticker_symbol.clone())
        .or_else(|| submission.primary_ticker().map(str::to_string));

    CompanyRecord {
        registry_id: canonical_id,
        ticker_symbol,
        display_name,
    }
}

/// Runs 10-K lookups against a registry `F` and a company directory `D`.
pub struct TenKLookup<F, D> {
    filings: F,
    resolver: CompanyResolver<D>,
}

impl<F: FilingOperations, D: CompanyDirectory> TenKLookup<F, D> {
    pub fn new(filings: F, directory: D) -> Self {
        Self {
            filings,
            resolver: CompanyResolver::new(directory),
        }
    }

    pub fn filings(&self) -> &F {
        &self.filings
    }

    pub fn resolver(&self) -> &CompanyResolver<D> {
        &self.resolver
    }

    /// Companies matching `query`, in directory order.
    ///
    /// # Errors
    ///
    /// `EdgarError::Validation` if the query is blank.
    pub fn search(&self, query: &str) -> Result<Vec<CompanyRecord>> {
        if query.trim().is_empty() {
            return Err(EdgarError::Validation("search query is required".to_string()));
        }
        Ok(self.resolver.resolve(query).cloned().collect())
    }

    /// Looks up the most recent 10-K for a ticker, company name or CIK.
    ///
    /// All-digit identifiers are used as a CIK directly; anything else goes
    /// through the resolver and the first match is used. One submissions
    /// request is made.
    ///
    /// # Errors
    ///
    /// * `EdgarError::Validation` - blank identifier.
    /// * `EdgarError::NotFound` - no company matches, or it has no 10-K.
    /// * `EdgarError::Upstream` / `EdgarError::Transport` - the fetch failed.
    /// * `EdgarError::MalformedData` - the submissions record lacks filing data.
    pub async fn most_recent_10k(&self, identifier: &str) -> Result<Filing10KResult> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(EdgarError::Validation("company identifier is required".to_string()));
        }

        let (canonical_id, directory_record) = if cik::is_numeric_id(identifier) {
            (cik::normalize(identifier), self.resolver.by_cik(identifier))
        } else {
            let record = self.resolver.resolve_first(identifier).ok_or_else(|| {
                EdgarError::NotFound(format!("No company found for: {}", identifier))
            })?;
            (record.registry_id.clone(), Some(record))
        };

        tracing::info!(
            "Found company: {} (CIK: {})",
            directory_record.map_or("Unknown", |r| r.display_name.as_str()),
            canonical_id
        );

        let submission = self.filings.submissions(&canonical_id).await?;
        let latest_filing = extract_latest_filing(&submission, FORM_10K)?;

        Ok(Filing10KResult {
            company: merge_company(canonical_id, directory_record, &submission),
            latest_filing: Some(latest_filing),
            financial_data: empty_financial_data(),
        })
    }

    /// Archive URL of a filing document. No network access.
    pub fn download_url(
        &self,
        cik: &str,
        accession_number: &str,
        document: &str,
    ) -> Result<String> {
        self.filings.filing_url(cik, accession_number, document)
    }

    /// Raw bytes of a filing document.
    pub async fn download_document(
        &self,
        cik: &str,
        accession_number: &str,
        document: &str,
    ) -> Result<Vec<u8>> {
        self.filings
            .filing_document(cik, accession_number, document)
            .await
    }
}
