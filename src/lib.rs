//! # edgar10k - latest annual reports from SEC EDGAR
//!
//! Looks up a public company by ticker, name or CIK, fetches its submission
//! history from the SEC's EDGAR system and reports its most recent 10-K
//! filing together with the archive URL of the filing document.
//!
//! ## Pieces
//!
//! - [`cik`] - CIK normalization (zero padding and its inverse)
//! - [`CompanyResolver`] - matches queries against a [`CompanyDirectory`]
//! - [`Edgar`] - rate-limited HTTP client for the submissions API and archive
//! - [`extract_latest_filing`] - picks the newest filing of a form from a submissions record
//! - [`locate_document`] - builds archive URLs for filing documents
//! - [`TenKLookup`] - ties the above together
//!
//! With the `server` feature, [`server::router`] exposes the lookup over HTTP.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use edgar10k::{Edgar, StaticDirectory, TenKLookup};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // SEC.gov requires a user agent that identifies you
//!     let edgar = Edgar::new("YourAppName contact@example.com")?;
//!     let lookup = TenKLookup::new(edgar, StaticDirectory::new());
//!
//!     let report = lookup.most_recent_10k("AAPL").await?;
//!     if let Some(filing) = &report.latest_filing {
//!         let name = &report.company.display_name;
//!         println!("{} filed {} on {}", name, filing.form_type, filing.filing_date);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cik;
mod company;
mod config;
mod core;
mod error;
mod filings;
mod report;
mod traits;

#[cfg(feature = "logging")]
pub mod logging;
#[cfg(feature = "server")]
pub mod server;

pub use company::{
    CompanyDirectory, CompanyRecord, CompanyResolver, CompanyTicker, StaticDirectory,
    TickerDirectory,
};
pub use config::{EdgarConfig, EdgarUrls};
pub use self::core::Edgar;
pub use error::{EdgarError, Result};
pub use filings::{
    FORM_10K, FilingRecord, FilingsData, RecentFilings, Submission, extract_latest_filing,
    locate_document,
};
pub use report::{FINANCIAL_METRICS, FactUnit, Filing10KResult, TenKLookup};
pub use traits::{CompanyOperations, FilingOperations};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
