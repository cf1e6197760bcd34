use serde::Serialize;
use thiserror::Error;

/// Public message for a timed-out lookup.
pub const TIMEOUT_MESSAGE: &str = "Request timeout";
pub const CONFIGURATION_MESSAGE: &str = "Server configuration error.";
pub const INCOMPLETE_MESSAGE: &str = "Incomplete data received from server";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Tag naming why a lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    InvalidInput,
    ConfigurationError,
    Timeout,
    UpstreamError,
    NotFound,
    IncompleteUpstreamData,
    InternalError,
}

/// Every way a lookup can fail.
///
/// Each variant maps to exactly one [`FailureReason`] and one HTTP status.
/// Variants carry only owned plain data so results can be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The code was empty or not numeric. Carries the public message.
    #[error("{0}")]
    InvalidInput(String),

    /// Base URL or API key was not configured.
    #[error("upstream URL or API key is not configured")]
    Configuration,

    #[error("upstream did not respond within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status} {status_text}")]
    Upstream { status: u16, status_text: String },

    /// Upstream was reached but had no record for the code.
    #[error("{0}")]
    NotFound(String),

    /// A record came back without one or more required fields.
    #[error("upstream record is missing required fields: {}", missing.join(", "))]
    IncompleteData { missing: Vec<&'static str> },

    #[error("internal error: {0}")]
    Internal(String),
}

impl LookupError {
    #[must_use]
    pub fn reason(&self) -> FailureReason {
        match self {
            LookupError::InvalidInput(_) => FailureReason::InvalidInput,
            LookupError::Configuration => FailureReason::ConfigurationError,
            LookupError::Timeout { .. } => FailureReason::Timeout,
            LookupError::Upstream { .. } => FailureReason::UpstreamError,
            LookupError::NotFound(_) => FailureReason::NotFound,
            LookupError::IncompleteData { .. } => FailureReason::IncompleteUpstreamData,
            LookupError::Internal(_) => FailureReason::InternalError,
        }
    }

    /// HTTP status the failure is reported with.
    ///
    /// Upstream errors keep the upstream status when it is a 4xx or 5xx code
    /// and fall back to 502 otherwise.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            LookupError::InvalidInput(_) => 400,
            LookupError::Configuration | LookupError::Internal(_) => 500,
            LookupError::Timeout { .. } => 504,
            LookupError::Upstream { status, .. } if (400..=599).contains(status) => *status,
            LookupError::Upstream { .. } | LookupError::IncompleteData { .. } => 502,
            LookupError::NotFound(_) => 404,
        }
    }

    /// Message safe to show to the caller. Internal details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            LookupError::InvalidInput(msg) | LookupError::NotFound(msg) => msg.clone(),
            LookupError::Configuration => CONFIGURATION_MESSAGE.to_string(),
            LookupError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            LookupError::Upstream { status_text, .. } => {
                format!("Error from upstream: {status_text}")
            }
            LookupError::IncompleteData { .. } => INCOMPLETE_MESSAGE.to_string(),
            LookupError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

/// Errors building the upstream HTTP client at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The underlying `reqwest::Client` could not be constructed.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid upstream URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
