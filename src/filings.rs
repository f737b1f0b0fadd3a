use super::Edgar;
use super::cik;
use super::error::{EdgarError, Result};
use super::traits::FilingOperations;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Form type of an annual report.
pub const FORM_10K: &str = "10-K";

/// A filer's record from the submissions API (`/submissions/CIK##########.json`).
///
/// Only the fields the lookup needs are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub cik: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub filings: Option<FilingsData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilingsData {
    #[serde(default)]
    pub recent: Option<RecentFilings>,
}

/// The registry's filing history: parallel columns, one entry per filing,
/// aligned by index. The registry lists newest first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentFilings {
    #[serde(rename = "accessionNumber", default)]
    pub accession_number: Option<Vec<String>>,
    #[serde(rename = "filingDate", default)]
    pub filing_date: Option<Vec<String>>,
    #[serde(rename = "reportDate", default)]
    pub report_date: Option<Vec<String>>,
    #[serde(default)]
    pub form: Option<Vec<String>>,
    #[serde(rename = "primaryDocument", default)]
    pub primary_document: Option<Vec<String>>,
    #[serde(default)]
    pub size: Option<Vec<u64>>,
}

/// One filing, taken from a single index of [`RecentFilings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    #[serde(rename = "accessionNumber")]
    pub accession_number: String,
    #[serde(rename = "filingDate")]
    pub filing_date: String,
    #[serde(rename = "reportDate", default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
    #[serde(rename = "form")]
    pub form_type: String,
    #[serde(rename = "primaryDocument")]
    pub primary_document: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

impl Submission {
    /// The filing history, or `MalformedData` if the payload has none.
    pub fn recent_filings(&self) -> Result<&RecentFilings> {
        self.filings
            .as_ref()
            .and_then(|f| f.recent.as_ref())
            .ok_or_else(|| EdgarError::MalformedData("No filings data found".to_string()))
    }

    /// First ticker the registry reports for this filer.
    pub fn primary_ticker(&self) -> Option<&str> {
        self.tickers.first().map(String::as_str).filter(|t| !t.is_empty())
    }
}

fn required<'a, T>(column: &'a Option<Vec<T>>, name: &str) -> Result<&'a [T]> {
    column
        .as_deref()
        .ok_or_else(|| EdgarError::MalformedData(format!("Missing '{}' column", name)))
}

impl RecentFilings {
    /// Checks that every required column is present and as long as `form`.
    fn validate(&self) -> Result<usize> {
        let forms = required(&self.form, "form")?;
        let len = forms.len();
        let lengths = [
            ("accessionNumber", required(&self.accession_number, "accessionNumber")?.len()),
            ("filingDate", required(&self.filing_date, "filingDate")?.len()),
            ("primaryDocument", required(&self.primary_document, "primaryDocument")?.len()),
            ("size", required(&self.size, "size")?.len()),
        ];
        for (name, column_len) in lengths {
            if column_len != len {
                return Err(EdgarError::MalformedData(format!(
                    "Column '{}' has {} entries, expected {}",
                    name, column_len, len
                )));
            }
        }
        Ok(len)
    }

    /// Number of filings in the history.
    pub fn len(&self) -> usize {
        self.form.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the record at `idx`. Columns must already be validated.
    fn record_at(&self, idx: usize) -> Result<FilingRecord> {
        let at = |column: &Option<Vec<String>>, name: &str| -> Result<String> {
            required(column, name)?.get(idx).cloned().ok_or_else(|| {
                EdgarError::MalformedData(format!("Column '{}' has no entry {}", name, idx))
            })
        };

        let report_date = self
            .report_date
            .as_ref()
            .and_then(|dates| dates.get(idx))
            .filter(|d| !d.trim().is_empty())
            .cloned();

        Ok(FilingRecord {
            accession_number: at(&self.accession_number, "accessionNumber")?,
            filing_date: at(&self.filing_date, "filingDate")?,
            report_date,
            form_type: at(&self.form, "form")?,
            primary_document: at(&self.primary_document, "primaryDocument")?,
            size_bytes: required(&self.size, "size")?
                .get(idx)
                .copied()
                .ok_or_else(|| {
                    EdgarError::MalformedData(format!("Column 'size' has no entry {}", idx))
                })?,
        })
    }

    /// Returns the most recent filing whose form equals `form_type`.
    ///
    /// Candidates are ordered by filing date, newest first, rather than
    /// trusting the registry's ordering. The sort is stable, so filings on the
    /// same date keep registry order and the first listed wins. Dates that
    /// don't parse as `YYYY-MM-DD` rank after every dated filing.
    ///
    /// # Errors
    ///
    /// * `EdgarError::MalformedData` - a required column is missing or misaligned.
    /// * `EdgarError::NotFound` - no filing of `form_type` exists.
    pub fn latest_of_form(&self, form_type: &str) -> Result<FilingRecord> {
        self.validate()?;
        let forms = required(&self.form, "form")?;
        let dates = required(&self.filing_date, "filingDate")?;

        let mut candidates: Vec<(usize, Option<NaiveDate>)> = forms
            .iter()
            .enumerate()
            .filter(|(_, form)| form.as_str() == form_type)
            .map(|(idx, _)| {
                let date = NaiveDate::parse_from_str(dates[idx].trim(), "%Y-%m-%d").ok();
                if date.is_none() {
                    tracing::warn!("Unparseable filing date '{}' at index {}", dates[idx], idx);
                }
                (idx, date)
            })
            .collect();

        candidates.sort_by_key(|(_, date)| Reverse(*date));

        let (idx, _) = candidates
            .first()
            .copied()
            .ok_or_else(|| EdgarError::NotFound(format!("No {} filings found", form_type)))?;

        if idx != candidates.iter().map(|(i, _)| *i).min().unwrap_or(idx) {
            tracing::warn!(
                "Registry order disagrees with filing dates; using {} filing at index {}",
                form_type,
                idx
            );
        }

        self.record_at(idx)
    }
}

/// Finds the most recent filing of `form_type` in a submissions record.
pub fn extract_latest_filing(submission: &Submission, form_type: &str) -> Result<FilingRecord> {
    submission.recent_filings()?.latest_of_form(form_type)
}

/// Builds the archive URL of a filing document:
/// `{archive_data_root}/{bare cik}/{accession without dashes}/{document}`.
///
/// `archive_data_root` is the `.../Archives/edgar/data` directory.
///
/// # Errors
///
/// `EdgarError::Validation` if any component is blank.
pub fn locate_document(
    archive_data_root: &str,
    canonical_id: &str,
    accession_number: &str,
    document_name: &str,
) -> Result<String> {
    for (value, what) in [
        (canonical_id, "CIK"),
        (accession_number, "accession number"),
        (document_name, "primary document"),
    ] {
        if value.trim().is_empty() {
            return Err(EdgarError::Validation(format!("{} is required", what)));
        }
    }

    Ok(format!(
        "{}/{}/{}/{}",
        archive_data_root.trim_end_matches('/'),
        cik::to_url_form(canonical_id),
        accession_number.trim().replace('-', ""),
        document_name.trim()
    ))
}

#[derive(Debug)]
enum UrlType {
    Submission,
    FilingContent,
}

impl Edgar {
    fn build_url(&self, url_type: UrlType, params: &[&str]) -> Result<String> {
        match url_type {
            UrlType::Submission => {
                let cik = cik::normalize(params[0]);
                if !cik::is_numeric_id(&cik) {
                    return Err(EdgarError::Validation(format!(
                        "CIK must be numeric, got '{}'",
                        params[0]
                    )));
                }
                Ok(format!("{}/submissions/CIK{}.json", self.edgar_data_url, cik))
            }
            UrlType::FilingContent => {
                let (cik, acc_no, filename) = (params[0], params[1], params[2]);
                locate_document(
                    &format!("{}/data", self.edgar_archives_url),
                    &cik::normalize(cik),
                    acc_no,
                    filename,
                )
            }
        }
    }
}

#[async_trait]
impl FilingOperations for Edgar {
    /// Retrieves the submissions record for `cik` in a single request.
    ///
    /// # Errors
    ///
    /// * `EdgarError::Validation` - `cik` is not numeric.
    /// * `EdgarError::Upstream` - the registry answered with a non-success status.
    /// * `EdgarError::Transport` - no response (connectivity, timeout).
    /// * `EdgarError::MalformedData` - the body is not a submissions record.
    async fn submissions(&self, cik: &str) -> Result<Submission> {
        let url = self.build_url(UrlType::Submission, &[cik])?;
        let response = self.get(&url).await?;
        Ok(serde_json::from_str::<Submission>(&response)?)
    }

    fn filing_url(&self, cik: &str, accession_number: &str, document: &str) -> Result<String> {
        self.build_url(UrlType::FilingContent, &[cik, accession_number, document])
    }

    async fn filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        document: &str,
    ) -> Result<Vec<u8>> {
        let url = self.filing_url(cik, accession_number, document)?;
        self.get_bytes(&url).await
    }
}
