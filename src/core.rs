use governor::{
    Quota, RateLimiter, clock::DefaultClock, middleware::NoOpMiddleware, state::InMemoryState,
    state::NotKeyed,
};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use super::config::{EdgarConfig, EdgarUrls};
use super::error::{EdgarError, Result};

const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

type Governor = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

#[derive(Debug, Clone)]
pub struct Edgar {
    /// HTTP client for making requests
    pub(crate) client: reqwest::Client,

    /// Token bucket rate limiter for SEC compliance
    pub(crate) rate_limiter: Arc<Governor>,

    /// Additional attempts after a transient failure
    pub(crate) max_retries: u32,

    /// Per-request timeout; also caps a server-requested `Retry-After` wait
    pub(crate) timeout: Duration,

    /// Base URL for EDGAR archives
    pub(crate) edgar_archives_url: String,

    /// Base URL for EDGAR data API
    pub(crate) edgar_data_url: String,

    /// Base URL for EDGAR files
    pub(crate) edgar_files_url: String,
}

/// HTTP client for the SEC EDGAR endpoints this crate needs: the submissions
/// API, the document archive and the public ticker file.
///
/// Every request carries the configured user agent (SEC.gov refuses anonymous
/// clients), waits on a token bucket so the process stays under the fair
/// access limit, and is bounded by the configured timeout. A request that
/// times out or cannot connect surfaces as [`EdgarError::Transport`].
///
/// # Retries
///
/// By default a failed attempt is returned immediately. With
/// `max_retries > 0` transport failures, HTTP 429 and HTTP 5xx responses are
/// retried with exponential backoff and jitter. A numeric `Retry-After` is
/// honored but never waited on for longer than the request timeout. Any other non-success status
/// is returned at once as [`EdgarError::Upstream`].
///
/// # Examples
///
/// ```rust
/// # use edgar10k::Edgar;
/// let edgar = Edgar::new("my_app/1.0 (my@email.com)")?;
/// # Ok::<(), edgar10k::EdgarError>(())
/// ```
impl Edgar {
    /// Creates a client with the default rate limit, timeout and SEC.gov URLs.
    pub fn new(user_agent: &str) -> Result<Self> {
        let config = EdgarConfig {
            user_agent: user_agent.to_string(),
            ..EdgarConfig::default()
        };
        Self::with_config(config)
    }

    /// Creates an Edgar client with custom configuration settings.
    ///
    /// # Errors
    ///
    /// Returns `EdgarError::ConfigError` if the user agent is malformed, the rate limit
    /// or timeout is zero, or the HTTP client cannot be built with the provided configuration.
    pub fn with_config(config: EdgarConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| EdgarError::ConfigError(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/html, */*"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| EdgarError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        if config.timeout.is_zero() {
            return Err(EdgarError::ConfigError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(
            NonZeroU32::new(config.rate_limit).ok_or_else(|| {
                EdgarError::ConfigError("Rate limit must be greater than zero".to_string())
            })?,
        )));

        let EdgarUrls {
            archives,
            data,
            files,
        } = config.base_urls;

        Ok(Edgar {
            client,
            rate_limiter,
            max_retries: config.max_retries,
            timeout: config.timeout,
            edgar_archives_url: archives,
            edgar_data_url: data,
            edgar_files_url: files,
        })
    }

    /// Wait before retry number `retry` (0-indexed): `2^retry × 1s`, ±20 % jitter.
    fn calculate_backoff(retry: u32) -> Duration {
        let backoff_ms = INITIAL_BACKOFF_MS * (2_u64.pow(retry));
        let jitter = (backoff_ms as f64 * 0.2 * (fastrand::f64() - 0.5)) as i64;
        Duration::from_millis((backoff_ms as i64 + jitter) as u64)
    }

    /// A `Retry-After` of `secs`, never longer than `limit`.
    fn capped_retry_after(secs: u64, limit: Duration) -> Duration {
        Duration::from_secs(secs).min(limit)
    }

    fn is_retryable(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    /// Sends a GET request and returns the first successful response.
    ///
    /// # Errors
    ///
    /// * `EdgarError::Transport` - no response (connectivity, timeout) after all attempts
    /// * `EdgarError::RateLimitExceeded` - HTTP 429 persisted after all attempts
    /// * `EdgarError::Upstream` - any other non-success status
    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let mut retries = 0;

        loop {
            self.rate_limiter.until_ready().await;
            tracing::debug!("GET {}", url);

            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    if !Self::is_retryable(status) || retries >= self.max_retries {
                        tracing::warn!("Request to {} failed with status {}", url, status);
                        if status == StatusCode::TOO_MANY_REQUESTS && self.max_retries > 0 {
                            return Err(EdgarError::RateLimitExceeded);
                        }
                        return Err(EdgarError::Upstream {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let wait = response
                        .headers()
                        .get("retry-after")
                        .and_then(|h| h.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .map(|secs| Self::capped_retry_after(secs, self.timeout))
                        .unwrap_or_else(|| Self::calculate_backoff(retries));

                    tracing::warn!(
                        "Status {} for {}. Attempt {}/{}. Waiting {:?} before retry.",
                        status,
                        url,
                        retries + 1,
                        self.max_retries + 1,
                        wait
                    );
                    sleep(wait).await;
                    retries += 1;
                }
                Err(e) => {
                    if retries >= self.max_retries {
                        return Err(EdgarError::Transport(e));
                    }
                    let wait = Self::calculate_backoff(retries);
                    tracing::warn!(
                        "Request failed for {}: {}. Attempt {}/{}. Retrying in {:?}.",
                        url,
                        e,
                        retries + 1,
                        self.max_retries + 1,
                        wait
                    );
                    sleep(wait).await;
                    retries += 1;
                }
            }
        }
    }

    /// Fetches raw bytes from a URL, e.g. a filing document.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.send(url).await?;
        let bytes = response.bytes().await.map_err(EdgarError::Transport)?;
        Ok(bytes.to_vec())
    }

    /// Fetches text content from a URL.
    ///
    /// For `.json` URLs an HTML body is rejected as `MalformedData`: the SEC
    /// serves HTML error pages with a 200 status when it blocks a client. It
    /// also sometimes labels real JSON as `text/html`, so the body is sniffed
    /// rather than trusting the header.
    pub async fn get(&self, url: &str) -> Result<String> {
        let response = self.send(url).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .map(str::to_lowercase);
        let body = response.text().await.map_err(EdgarError::Transport)?;

        if url.ends_with(".json") && content_type.is_some_and(|ct| ct.contains("text/html")) {
            let trimmed = body.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                tracing::warn!("JSON body labelled text/html from {}", url);
            } else {
                let preview = body.chars().take(200).collect::<String>();
                return Err(EdgarError::MalformedData(format!(
                    "expected JSON from {url}, got HTML: {preview}"
                )));
            }
        }

        Ok(body)
    }

    /// Returns the base URL for EDGAR archives.
    pub fn archives_url(&self) -> &str {
        &self.edgar_archives_url
    }

    /// Returns the base URL for EDGAR data.
    pub fn data_url(&self) -> &str {
        &self.edgar_data_url
    }

    /// Returns the base URL for EDGAR files.
    pub fn files_url(&self) -> &str {
        &self.edgar_files_url
    }
}
