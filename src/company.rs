//! Company identity: directory records, directory providers and the resolver.
//!
//! A [`CompanyDirectory`] supplies the known companies in a fixed order. The
//! [`CompanyResolver`] matches free-text queries against it. Two providers ship
//! with the crate:
//! - [`StaticDirectory`], a small built-in table of large US issuers.
//! - [`TickerDirectory`], built from SEC's `company_tickers.json`, covering every
//!   listed filer.

use super::Edgar;
use super::cik;
use super::error::Result;
use super::traits::CompanyOperations;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A company known to a directory, keyed by its canonical CIK.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Ten digit, zero-padded CIK.
    #[serde(rename = "cik")]
    pub registry_id: String,
    #[serde(rename = "ticker", default, skip_serializing_if = "Option::is_none")]
    pub ticker_symbol: Option<String>,
    #[serde(rename = "name")]
    pub display_name: String,
}

impl CompanyRecord {
    /// Builds a record, normalizing `cik` to canonical form.
    pub fn new(cik: &str, ticker: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            registry_id: cik::normalize(cik),
            ticker_symbol: ticker.map(str::to_string),
            display_name: name.into(),
        }
    }

    fn matches(&self, needle: &str, canonical: &str) -> bool {
        self.registry_id == canonical
            || self
                .ticker_symbol
                .as_deref()
                .is_some_and(|t| t.to_lowercase().contains(needle))
            || self.display_name.to_lowercase().contains(needle)
    }
}

/// Mapping between stock ticker symbols and company CIKs, as published by
/// the SEC in `company_tickers.json`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CompanyTicker {
    #[serde(rename = "cik_str")]
    pub cik: u64,
    pub ticker: String,
    pub title: String,
}

/// Source of known companies. Order matters: it is the order results are
/// reported in and the first entry wins when a lookup needs one company.
pub trait CompanyDirectory: Send + Sync {
    fn records(&self) -> &[CompanyRecord];
}

impl<T: CompanyDirectory + ?Sized> CompanyDirectory for Box<T> {
    fn records(&self) -> &[CompanyRecord] {
        (**self).records()
    }
}

/// Built-in table of well-known issuers.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    records: Vec<CompanyRecord>,
}

const COMMON_COMPANIES: &[(&str, &str, &str)] = &[
    ("0000320193", "AAPL", "Apple Inc."),
    ("0000789019", "MSFT", "Microsoft Corporation"),
    ("0001018724", "AMZN", "Amazon.com Inc"),
    ("0001652044", "GOOGL", "Alphabet Inc."),
    ("0001326801", "META", "Meta Platforms Inc"),
    ("0000051143", "IBM", "International Business Machines Corporation"),
    ("0000886982", "CRM", "Salesforce Inc"),
    ("0001045810", "NVDA", "NVIDIA Corporation"),
    ("0000200406", "JNJ", "Johnson & Johnson"),
    ("0000019617", "JPM", "JPMorgan Chase & Co."),
];

impl Default for StaticDirectory {
    fn default() -> Self {
        Self {
            records: COMMON_COMPANIES
                .iter()
                .map(|(cik, ticker, name)| CompanyRecord::new(cik, Some(ticker), *name))
                .collect(),
        }
    }
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory over caller-supplied records, kept in the given order.
    pub fn from_records(records: Vec<CompanyRecord>) -> Self {
        Self { records }
    }
}

impl CompanyDirectory for StaticDirectory {
    fn records(&self) -> &[CompanyRecord] {
        &self.records
    }
}

/// Directory built from the registry's full ticker file.
#[derive(Debug, Clone)]
pub struct TickerDirectory {
    records: Vec<CompanyRecord>,
}

impl TickerDirectory {
    pub fn from_tickers(tickers: Vec<CompanyTicker>) -> Self {
        Self {
            records: tickers
                .into_iter()
                .map(|t| CompanyRecord::new(&t.cik.to_string(), Some(&t.ticker), t.title))
                .collect(),
        }
    }

    /// Downloads the ticker file and builds a directory from it.
    pub async fn fetch<C: CompanyOperations + ?Sized>(client: &C) -> Result<Self> {
        let tickers = client.company_tickers().await?;
        tracing::info!("Loaded {} companies from the registry ticker file", tickers.len());
        Ok(Self::from_tickers(tickers))
    }
}

impl CompanyDirectory for TickerDirectory {
    fn records(&self) -> &[CompanyRecord] {
        &self.records
    }
}

/// Matches free-text queries against a [`CompanyDirectory`].
#[derive(Debug, Clone)]
pub struct CompanyResolver<D> {
    directory: D,
}

impl<D: CompanyDirectory> CompanyResolver<D> {
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Lazily yields every record whose ticker or name contains `query`
    /// (case-insensitive), or whose CIK equals the normalized query.
    ///
    /// Results come back in directory order. No match is an empty iterator,
    /// not an error.
    pub fn resolve<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CompanyRecord> + 'a {
        let canonical = cik::normalize(query);
        let needle = query.trim().to_lowercase();
        self.directory
            .records()
            .iter()
            .filter(move |record| record.matches(&needle, &canonical))
    }

    /// First record matching `query`, if any.
    pub fn resolve_first(&self, query: &str) -> Option<&CompanyRecord> {
        self.resolve(query).next()
    }

    /// Record whose CIK equals the normalized `cik`, if the directory has one.
    pub fn by_cik(&self, cik: &str) -> Option<&CompanyRecord> {
        let canonical = cik::normalize(cik);
        self.directory
            .records()
            .iter()
            .find(|record| record.registry_id == canonical)
    }
}

/// Orders the entries of `company_tickers.json` by their rank key ("0", "1", ...).
fn parse_company_tickers(content: &str) -> Result<Vec<CompanyTicker>> {
    let map: HashMap<String, CompanyTicker> = serde_json::from_str(content)?;
    let mut unranked = Vec::new();
    let mut ranked = BTreeMap::new();
    for (key, ticker) in map {
        match key.parse::<u64>() {
            Ok(rank) => {
                ranked.insert(rank, ticker);
            }
            Err(_) => unranked.push(ticker),
        }
    }
    unranked.sort_by_key(|t| t.cik);
    Ok(ranked.into_values().chain(unranked).collect())
}

#[async_trait]
impl CompanyOperations for Edgar {
    /// Retrieves the SEC's `company_tickers.json` file.
    ///
    /// # Errors
    ///
    /// * `EdgarError::Upstream` - the file could not be retrieved.
    /// * `EdgarError::MalformedData` - the response couldn't be parsed as expected.
    async fn company_tickers(&self) -> Result<Vec<CompanyTicker>> {
        let url = format!("{}/company_tickers.json", self.edgar_files_url);
        let response = self.get(&url).await?;
        parse_company_tickers(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EdgarError;

    fn resolver() -> CompanyResolver<StaticDirectory> {
        CompanyResolver::new(StaticDirectory::new())
    }

    fn names<'a>(records: impl Iterator<Item = &'a CompanyRecord>) -> Vec<&'a str> {
        records.map(|r| r.display_name.as_str()).collect()
    }

    #[test]
    fn test_resolve_name_case_insensitive() {
        let resolver = resolver();
        let hits: Vec<_> = resolver.resolve("apple").collect();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].registry_id, "0000320193");
        assert_eq!(hits[0].ticker_symbol.as_deref(), Some("AAPL"));
    }

    #[test]
    fn test_resolve_ticker_substring() {
        let resolver = resolver();
        assert_eq!(names(resolver.resolve("msf")), vec!["Microsoft Corporation"]);
        assert_eq!(names(resolver.resolve("NVDA")), vec!["NVIDIA Corporation"]);
    }

    #[test]
    fn test_resolve_no_match_is_empty() {
        assert_eq!(resolver().resolve("zzzz").count(), 0);
    }

    #[test]
    fn test_resolve_by_cik_padded_or_bare() {
        let resolver = resolver();
        assert_eq!(names(resolver.resolve("789019")), vec!["Microsoft Corporation"]);
        assert_eq!(names(resolver.resolve("0000789019")), vec!["Microsoft Corporation"]);
    }

    #[test]
    fn test_resolve_keeps_directory_order() {
        // "corporation" appears in Microsoft, IBM and NVIDIA, in that table order.
        let resolver = resolver();
        assert_eq!(
            names(resolver.resolve("corporation")),
            vec![
                "Microsoft Corporation",
                "International Business Machines Corporation",
                "NVIDIA Corporation"
            ]
        );
    }

    #[test]
    fn test_resolve_first_and_by_cik() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve_first("inc").map(|r| r.display_name.as_str()),
            Some("Apple Inc.")
        );
        assert_eq!(
            resolver.by_cik("19617").map(|r| r.ticker_symbol.as_deref()),
            Some(Some("JPM"))
        );
        assert!(resolver.by_cik("1").is_none());
    }

    #[test]
    fn test_boxed_directory() {
        let boxed: Box<dyn CompanyDirectory> = Box::new(StaticDirectory::new());
        let resolver = CompanyResolver::new(boxed);
        assert_eq!(resolver.resolve("meta").count(), 1);
    }

    #[test]
    fn test_record_serializes_with_wire_names() {
        let record = CompanyRecord::new("320193", Some("AAPL"), "Apple Inc.");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "cik": "0000320193", "ticker": "AAPL", "name": "Apple Inc." })
        );

        let no_ticker = CompanyRecord::new("1", None, "Someone");
        let json = serde_json::to_value(&no_ticker).unwrap();
        assert!(json.get("ticker").is_none());
    }

    #[test]
    fn test_parse_company_tickers_keeps_rank_order() {
        let content = r#"{
            "1": {"cik_str": 789019, "ticker": "MSFT", "title": "MICROSOFT CORP"},
            "0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."},
            "10": {"cik_str": 1045810, "ticker": "NVDA", "title": "NVIDIA CORP"},
            "2": {"cik_str": 1018724, "ticker": "AMZN", "title": "AMAZON COM INC"}
        }"#;
        let tickers = parse_company_tickers(content).unwrap();
        let order: Vec<_> = tickers.iter().map(|t| t.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "MSFT", "AMZN", "NVDA"]);

        let directory = TickerDirectory::from_tickers(tickers);
        assert_eq!(directory.records()[0].registry_id, "0000320193");
        assert_eq!(directory.records()[3].registry_id, "0001045810");
    }

    #[test]
    fn test_resolver_over_custom_directory() {
        let directory = StaticDirectory::from_records(vec![
            CompanyRecord::new("42", Some("ACMW"), "Acme Widgets"),
            CompanyRecord::new("0000000007", None, "Acme Holdings"),
            CompanyRecord::new("99", Some("GLBX"), "Globex Corporation"),
        ]);
        let resolver = CompanyResolver::new(directory);

        assert_eq!(resolver.directory().records().len(), 3);
        assert_eq!(
            names(resolver.resolve("acme")),
            vec!["Acme Widgets", "Acme Holdings"]
        );
        assert_eq!(
            resolver.resolve_first("ACME").map(|r| r.registry_id.as_str()),
            Some("0000000042")
        );
        assert_eq!(names(resolver.resolve("7")), vec!["Acme Holdings"]);
        assert_eq!(
            resolver.by_cik("0000000099").map(|r| r.display_name.as_str()),
            Some("Globex Corporation")
        );
        assert!(resolver.by_cik("320193").is_none());
    }

    #[test]
    fn test_parse_company_tickers_invalid_json() {
        let result = parse_company_tickers("[1, 2, 3]");
        assert!(matches!(result, Err(EdgarError::MalformedData(_))));
    }
}
