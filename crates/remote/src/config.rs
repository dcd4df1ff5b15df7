use std::env;
use std::time::Duration;

use url::Url;

use crate::error::RpcError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Where the backend lives and how long a single HTTP request may take.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteConfig {
    pub base_url: String,
    pub request_timeout: Duration,
}

impl RemoteConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// An explicit, non-blank URL wins; otherwise `http://{host}:{port}`.
    #[must_use]
    pub fn resolve(override_url: Option<&str>, host: &str, port: u16) -> Self {
        match override_url.map(str::trim).filter(|url| !url.is_empty()) {
            Some(url) => Self::new(url),
            None => Self::new(format!("http://{host}:{port}")),
        }
    }

    /// Resolve from `WORD_GRADIO_URL`, `WORD_GRADIO_HOST` and `WORD_GRADIO_PORT`.
    #[must_use]
    pub fn from_env() -> Self {
        let override_url = env::var("WORD_GRADIO_URL").ok();
        let host = env::var("WORD_GRADIO_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        let port = env::var("WORD_GRADIO_PORT")
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);
        Self::resolve(override_url.as_deref(), &host, port)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Parse the base URL, accepting only `http` and `https`.
    ///
    /// # Errors
    ///
    /// Returns `RpcError::InvalidBaseUrl` for unparsable or non-HTTP URLs.
    pub fn parsed_base_url(&self) -> Result<Url, RpcError> {
        let invalid = |reason: String| RpcError::InvalidBaseUrl {
            raw: self.base_url.clone(),
            reason,
        };
        let url = Url::parse(&self.base_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self::resolve(None, DEFAULT_HOST, DEFAULT_PORT)
    }
}
