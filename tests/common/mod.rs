use async_trait::async_trait;
use edgar10k::{EdgarError, FilingOperations, Result, Submission, cik, locate_document};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

#[allow(dead_code)]
pub const ARCHIVE_DATA_ROOT: &str = "https://www.sec.gov/Archives/edgar/data";

pub fn fixture_path(relative: impl AsRef<Path>) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(relative)
}

pub fn read_fixture(relative: impl AsRef<Path>) -> String {
    fs::read_to_string(fixture_path(relative)).expect("fixture file should be readable")
}

#[allow(dead_code)]
pub fn edgar() -> edgar10k::Edgar {
    edgar10k::Edgar::new("test_agent example@example.com").unwrap()
}

#[allow(dead_code)]
enum StubResponse {
    Json(String),
    Status(u16),
}

/// In-memory registry keyed by canonical CIK. Unknown CIKs answer 404, like
/// the real submissions API.
#[allow(dead_code)]
#[derive(Default)]
pub struct StubRegistry {
    submissions: HashMap<String, StubResponse>,
    documents: HashMap<String, Vec<u8>>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apple, a filer without 10-Ks, an unlisted 10-K filer and one record lacking filing data.
    pub fn with_fixtures() -> Self {
        Self::new()
            .with_submission("320193", "submissions/submission.json")
            .with_submission("1234567", "submissions/no_10k.json")
            .with_submission("1234568", "submissions/unlisted_10k.json")
            .with_submission("7654321", "submissions/no_filings.json")
            .with_document(
                "320193",
                "0000320193-23-000106",
                "aapl-20230930.htm",
                b"<html><body>Apple 10-K</body></html>",
            )
    }

    pub fn with_submission(mut self, cik: &str, fixture: &str) -> Self {
        self.submissions
            .insert(cik::normalize(cik), StubResponse::Json(read_fixture(fixture)));
        self
    }

    pub fn with_status(mut self, cik: &str, status: u16) -> Self {
        self.submissions
            .insert(cik::normalize(cik), StubResponse::Status(status));
        self
    }

    pub fn with_document(
        mut self,
        cik: &str,
        accession: &str,
        document: &str,
        body: &[u8],
    ) -> Self {
        let url = locate_document(ARCHIVE_DATA_ROOT, &cik::normalize(cik), accession, document)
            .expect("valid document location");
        self.documents.insert(url, body.to_vec());
        self
    }

    /// Canonical CIKs passed to `submissions`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FilingOperations for StubRegistry {
    async fn submissions(&self, cik: &str) -> Result<Submission> {
        let canonical = cik::normalize(cik);
        self.calls.lock().unwrap().push(canonical.clone());
        let url = format!("https://data.sec.gov/submissions/CIK{canonical}.json");
        match self.submissions.get(&canonical) {
            Some(StubResponse::Json(body)) => Ok(serde_json::from_str(body)?),
            Some(StubResponse::Status(status)) => Err(EdgarError::Upstream {
                status: *status,
                url,
            }),
            None => Err(EdgarError::Upstream { status: 404, url }),
        }
    }

    fn filing_url(&self, cik: &str, accession_number: &str, document: &str) -> Result<String> {
        locate_document(
            ARCHIVE_DATA_ROOT,
            &cik::normalize(cik),
            accession_number,
            document,
        )
    }

    async fn filing_document(
        &self,
        cik: &str,
        accession_number: &str,
        document: &str,
    ) -> Result<Vec<u8>> {
        let url = self.filing_url(cik, accession_number, document)?;
        self.documents
            .get(&url)
            .cloned()
            .ok_or(EdgarError::Upstream { status: 404, url })
    }
}

/// Serves `app` on an ephemeral local port and returns its base URL.
#[cfg(feature = "server")]
#[allow(dead_code)]
pub async fn spawn(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
