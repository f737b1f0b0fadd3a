use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::error::{EdgarError, Result};

/// Configuration for the Edgar client
#[derive(Debug, Clone)]
pub struct EdgarConfig {
    /// User agent string for HTTP requests. SEC.gov rejects anonymous clients.
    pub user_agent: String,
    /// Rate limit in requests per second
    pub rate_limit: u32,
    /// Upper bound on a single HTTP request, connect through body
    pub timeout: Duration,
    /// Additional attempts after a transient failure (0 = single attempt)
    pub max_retries: u32,
    /// Base URLs for different EDGAR services
    pub base_urls: EdgarUrls,
}

/// Base URLs for different EDGAR services
#[derive(Debug, Clone)]
pub struct EdgarUrls {
    /// Base URL for EDGAR archives
    pub archives: String,
    /// Base URL for EDGAR data
    pub data: String,
    /// Base URL for EDGAR files
    pub files: String,
}

impl Default for EdgarConfig {
    fn default() -> Self {
        Self {
            user_agent: format!(
                "edgar10k/{} (contact@example.com)",
                env!("CARGO_PKG_VERSION")
            ),
            rate_limit: 10,
            timeout: Duration::from_secs(30),
            max_retries: 0,
            base_urls: EdgarUrls::default(),
        }
    }
}

impl EdgarConfig {
    /// Creates a new EdgarConfig with custom settings
    ///
    /// # Basic usage
    ///
    /// ```rust
    /// use edgar10k::{Edgar, EdgarConfig};
    /// use std::time::Duration;
    /// let config = EdgarConfig::new(
    ///     "YourAppName contact@example.com",
    ///     10, // requests per second
    ///     Duration::from_secs(30),
    ///     None,
    /// );
    /// let edgar = Edgar::with_config(config)?;
    /// # Ok::<(), edgar10k::EdgarError>(())
    /// ```
    pub fn new(
        user_agent: impl Into<String>,
        rate_limit: u32,
        timeout: Duration,
        base_urls: Option<EdgarUrls>,
    ) -> Self {
        Self {
            user_agent: user_agent.into(),
            rate_limit,
            timeout,
            max_retries: 0,
            base_urls: base_urls.unwrap_or_default(),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Builds a configuration from `EDGAR_*` environment variables, falling
    /// back to defaults for anything unset.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `EDGAR_USER_AGENT` | `user_agent` |
    /// | `EDGAR_RATE_LIMIT` | `rate_limit` |
    /// | `EDGAR_TIMEOUT_SECS` | `timeout` |
    /// | `EDGAR_MAX_RETRIES` | `max_retries` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(user_agent) = lookup("EDGAR_USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.user_agent = user_agent;
        }
        if let Some(rate_limit) = parse_var(&lookup, "EDGAR_RATE_LIMIT")? {
            config.rate_limit = rate_limit;
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "EDGAR_TIMEOUT_SECS")? {
            if secs == 0 {
                return Err(EdgarError::ConfigError(
                    "EDGAR_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(max_retries) = parse_var(&lookup, "EDGAR_MAX_RETRIES")? {
            config.max_retries = max_retries;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            EdgarError::ConfigError(format!("{key} must be a non-negative integer, got '{raw}'"))
        }),
    }
}

impl Default for EdgarUrls {
    fn default() -> Self {
        Self {
            archives: "https://www.sec.gov/Archives/edgar".to_string(),
            data: "https://data.sec.gov".to_string(),
            files: "https://www.sec.gov/files".to_string(),
        }
    }
}

impl EdgarUrls {
    /// Points every service at one base URL. Handy for local test servers.
    pub fn single_host(base: impl Into<String>) -> Self {
        let base = base.into();
        let base = base.trim_end_matches('/');
        Self {
            archives: format!("{base}/Archives/edgar"),
            data: base.to_string(),
            files: format!("{base}/files"),
        }
    }
}
