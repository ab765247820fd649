//! HTTP access behind a narrow trait.

use std::fmt;
use std::time::Duration;

use crate::error::{InstallError, Result};

/// Bound on every request so validation can never hang indefinitely.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("lvminstall/", env!("CARGO_PKG_VERSION"));

/// The two HTTP operations the installer needs.
pub trait HttpClient: fmt::Debug + Send + Sync {
    /// Issue a HEAD request and return the final status code.
    ///
    /// Transport failures are errors, never a silent pass.
    fn head_status(&self, url: &str) -> Result<u16>;

    /// Download the body of a URL that must answer 200.
    fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`HttpClient`] backed by `reqwest`, driven by a private tokio runtime.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    timeout: Duration,
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn client(&self, url: &str) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| transport(url, e))
    }

    fn runtime(url: &str) -> Result<tokio::runtime::Runtime> {
        tokio::runtime::Runtime::new().map_err(|e| InstallError::HttpTransport {
            url: url.to_string(),
            reason: format!("Failed to create tokio runtime: {e}"),
        })
    }
}

impl HttpClient for ReqwestClient {
    fn head_status(&self, url: &str) -> Result<u16> {
        let client = self.client(url)?;
        Self::runtime(url)?.block_on(async {
            let response = client.head(url).send().await.map_err(|e| transport(url, e))?;
            Ok::<_, InstallError>(response.status().as_u16())
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        let client = self.client(url)?;
        Self::runtime(url)?.block_on(async {
            let response = client.get(url).send().await.map_err(|e| InstallError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

            if !response.status().is_success() {
                return Err(InstallError::Fetch {
                    url: url.to_string(),
                    reason: format!("HTTP {}", response.status()),
                });
            }

            let bytes = response.bytes().await.map_err(|e| InstallError::Fetch {
                url: url.to_string(),
                reason: format!("Failed to read response body: {e}"),
            })?;
            Ok(bytes.to_vec())
        })
    }
}

fn transport(url: &str, err: reqwest::Error) -> InstallError {
    InstallError::HttpTransport {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
