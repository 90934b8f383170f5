pub mod error;

pub use error::CheckError;

use std::collections::HashMap;
use std::time::Duration;

/// HTTP client for the API under test.
///
/// Wraps a shared `reqwest::Client` with the run's base URL and default
/// timeout so checks only deal in paths.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_timeout_ms: u64,
}

impl ApiClient {
    pub fn new(base_url: &str, default_timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(default_timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point the client at a different host (suite-level override).
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = base_url.trim_end_matches('/').to_string();
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send one request. All transport-level failures map to
    /// `CheckError::Network`; status/body interpretation is the caller's job.
    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
        headers: Option<&HashMap<String, String>>,
        bearer: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<reqwest::Response, CheckError> {
        let url = self.url(path);
        let mut req = self.http.request(method.clone(), &url);

        let timeout = timeout_ms.unwrap_or(self.default_timeout_ms);
        req = req.timeout(Duration::from_millis(timeout));

        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }

        if let Some(map) = headers {
            for (k, v) in map {
                req = req.header(k, v);
            }
        }

        if let Some(json) = body {
            req = req.json(json);
        }

        log::debug!("{} {}", method, url);
        let res = req.send().await?;
        log::debug!("{} {} -> {}", method, url, res.status());

        Ok(res)
    }
}
