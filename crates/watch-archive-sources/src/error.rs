use thiserror::Error;

/// Why a single HTTP attempt did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
}

/// All attempts for one URL were used up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("GET {url} failed after {attempts} attempt(s): {last_error}")]
pub struct FetchFailure {
    /// Redacted URL (API keys masked)
    pub url: String,
    pub attempts: u32,
    pub last_error: AttemptError,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("invalid JSON from {provider}: {source}")]
    Json {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feed XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl SourceError {
    pub fn json(provider: &'static str, source: serde_json::Error) -> Self {
        Self::Json { provider, source }
    }
}
