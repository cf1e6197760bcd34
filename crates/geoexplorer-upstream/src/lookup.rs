//! The location lookup proxy.
//!
//! One call per lookup: validate the code, check that an upstream is
//! configured, call it under a bounded wait, then normalize. Every exit path
//! ends in a [`LookupResult`]; nothing is retried.

use std::time::Duration;

use geoexplorer_core::code::is_numeric;
use geoexplorer_core::{AppConfig, UpstreamSettings};

use crate::client::{duration_ms, UpstreamClient};
use crate::error::{ClientError, LookupError};
use crate::normalize;
use crate::types::LookupResult;

pub const MISSING_CODE_MESSAGE: &str = "ID is required";
pub const INVALID_CODE_MESSAGE: &str = "Invalid ID format. Only numbers are allowed";

/// Checks a raw code and returns the code to send upstream.
///
/// Strict mode matches the raw input against `^[0-9]+$`, so surrounding
/// whitespace is rejected. Lenient mode forwards the trimmed code.
///
/// # Errors
///
/// Returns [`LookupError::InvalidInput`] when the code is blank, or when
/// `strict` is set and the code contains anything but ASCII digits.
pub fn validate_code(raw: &str, strict: bool) -> Result<&str, LookupError> {
    if raw.trim().is_empty() {
        return Err(LookupError::InvalidInput(MISSING_CODE_MESSAGE.to_string()));
    }
    if strict {
        if !is_numeric(raw) {
            return Err(LookupError::InvalidInput(INVALID_CODE_MESSAGE.to_string()));
        }
        return Ok(raw);
    }
    Ok(raw.trim())
}

/// Read-through proxy to the upstream location-detail RPC.
///
/// Stateless between calls; share it behind an `Arc` and call
/// [`LookupProxy::lookup`] concurrently. Dropping a pending lookup future
/// cancels its request without affecting other lookups.
pub struct LookupProxy {
    client: Option<UpstreamClient>,
    strict_codes: bool,
}

impl LookupProxy {
    /// Creates a proxy. `upstream` is `None` when the deployment has no
    /// upstream URL or key; lookups then fail with
    /// [`LookupError::Configuration`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if settings are present but the HTTP client
    /// cannot be built from them.
    pub fn new(upstream: Option<&UpstreamSettings>, strict_codes: bool) -> Result<Self, ClientError> {
        let client = upstream.map(UpstreamClient::new).transpose()?;
        if client.is_none() {
            tracing::warn!("upstream URL or API key not configured; lookups will fail");
        }
        Ok(Self {
            client,
            strict_codes,
        })
    }

    /// Creates a proxy from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`LookupProxy::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(config.upstream.as_ref(), config.strict_codes)
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Bounded wait per lookup, when an upstream is configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.client.as_ref().map(UpstreamClient::timeout)
    }

    /// Looks up the detail record for `code`.
    ///
    /// # Errors
    ///
    /// Every failure is returned as a [`LookupError`]:
    /// - `InvalidInput` and `Configuration` before any network call;
    /// - `Timeout` when the upstream does not answer within the bound;
    /// - `Upstream` for a non-2xx status;
    /// - `NotFound`, `IncompleteData` or `Internal` from the response body.
    pub async fn lookup(&self, code: &str) -> LookupResult {
        let code = validate_code(code, self.strict_codes).inspect_err(|e| {
            tracing::warn!(code, error = %e, "rejected lookup code");
        })?;

        let Some(client) = &self.client else {
            tracing::error!(code, "upstream configuration missing");
            return Err(LookupError::Configuration);
        };

        let timeout = client.timeout();
        let body = match tokio::time::timeout(timeout, client.call(code)).await {
            Ok(result) => result?,
            Err(_elapsed) => {
                tracing::error!(
                    code,
                    timeout_ms = duration_ms(timeout),
                    "upstream request timed out"
                );
                return Err(LookupError::Timeout {
                    timeout_ms: duration_ms(timeout),
                });
            }
        };

        tracing::debug!(code, response = %body, "upstream raw response");

        match normalize::normalize_response(body) {
            Ok(detail) => Ok(detail),
            Err(err) => {
                match &err {
                    LookupError::NotFound(message) => {
                        tracing::warn!(code, message = %message, "upstream returned no record");
                    }
                    LookupError::IncompleteData { missing } => {
                        tracing::error!(code, ?missing, "upstream record missing required fields");
                    }
                    other => tracing::error!(code, error = %other, "failed to process upstream response"),
                }
                Err(err)
            }
        }
    }
}
