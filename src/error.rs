use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdgarError {
    /// Caller supplied missing or unusable input.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// No matching company, or no filing of the requested form.
    #[error("{0}")]
    NotFound(String),

    /// The registry answered with a non-success status.
    #[error("Upstream request to {url} failed with status {status}")]
    Upstream { status: u16, url: String },

    /// The request never produced a response (connectivity, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The registry response is missing structure we rely on.
    #[error("Malformed registry data: {0}")]
    MalformedData(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for EdgarError {
    fn from(error: serde_json::Error) -> Self {
        EdgarError::MalformedData(error.to_string())
    }
}

impl EdgarError {
    /// Returns the upstream HTTP status code, if the registry produced one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            EdgarError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EdgarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_become_malformed_data() {
        let err: EdgarError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, EdgarError::MalformedData(_)));
    }

    #[test]
    fn upstream_status_is_exposed() {
        let err = EdgarError::Upstream {
            status: 503,
            url: "https://data.sec.gov/submissions/CIK0000320193.json".to_string(),
        };
        assert_eq!(err.upstream_status(), Some(503));
        assert_eq!(EdgarError::RateLimitExceeded.upstream_status(), None);
    }
}
