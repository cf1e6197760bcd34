//! HTTP client for the upstream location-detail RPC.
//!
//! Wraps `reqwest` with the RPC's authentication headers, request body
//! layout and status handling. The bounded wait is applied by
//! [`crate::LookupProxy`] around [`UpstreamClient::call`].

use std::time::Duration;

use geoexplorer_core::UpstreamSettings;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::error::{ClientError, LookupError};

/// Client for the PostgREST-style RPC endpoint.
///
/// Holds one `reqwest::Client`; every lookup through the owning proxy shares
/// its connection pool.
pub struct UpstreamClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    code_key: String,
    timeout: Duration,
}

impl UpstreamClient {
    /// Creates a client from validated upstream settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClientError::InvalidUrl`] if the base URL
    /// and RPC path do not form a valid URL.
    pub fn new(settings: &UpstreamSettings) -> Result<Self, ClientError> {
        let client = Client::builder()
            .connect_timeout(settings.timeout)
            .user_agent("geoexplorer/0.1 (location-lookup)")
            .build()?;

        let endpoint = Self::build_endpoint(&settings.base_url, &settings.rpc_path)?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            code_key: settings.code_key.clone(),
            timeout: settings.timeout,
        })
    }

    /// Bounded wait configured for this upstream.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Joins the base URL and RPC path with exactly one slash between them.
    fn build_endpoint(base_url: &str, rpc_path: &str) -> Result<Url, ClientError> {
        let joined = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            rpc_path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| ClientError::InvalidUrl {
            url: joined.clone(),
            reason: e.to_string(),
        })
    }

    /// JSON body carrying `code` under the RPC's expected key.
    fn request_body(&self, code: &str) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.code_key.clone(), Value::String(code.to_owned()));
        Value::Object(body)
    }

    /// Posts one lookup and returns the parsed JSON body.
    ///
    /// A 204 or an empty body comes back as `Value::Null`.
    ///
    /// # Errors
    ///
    /// - [`LookupError::Upstream`] on a non-2xx status.
    /// - [`LookupError::Timeout`] if the HTTP client gives up connecting.
    /// - [`LookupError::Internal`] on other network failures or a body that
    ///   is not JSON.
    pub async fn call(&self, code: &str) -> Result<Value, LookupError> {
        let body = self.request_body(code);
        tracing::debug!(code, body = %body, endpoint = %self.endpoint, "upstream request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            let status_text = status.canonical_reason().unwrap_or_default().to_string();
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                code,
                status = status.as_u16(),
                status_text = %status_text,
                response = %detail,
                "upstream returned error status"
            );
            return Err(LookupError::Upstream {
                status: status.as_u16(),
                status_text,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        let text = response.text().await.map_err(|e| self.classify(&e))?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            LookupError::Internal(format!("upstream body is not valid JSON: {e}"))
        })
    }

    fn classify(&self, err: &reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                timeout_ms: duration_ms(self.timeout),
            }
        } else {
            LookupError::Internal(format!("upstream request failed: {err}"))
        }
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
