use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for the upstream location-detail RPC.
///
/// Only constructed when both the base URL and the API key are present, so a
/// value of this type is always usable for an outbound call.
#[derive(Clone, PartialEq, Eq)]
pub struct UpstreamSettings {
    pub base_url: String,
    pub api_key: String,
    /// Path of the RPC endpoint appended to `base_url`.
    pub rpc_path: String,
    /// JSON key the RPC expects the location code under (`id_dane` or `p_id_dane`).
    pub code_key: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for UpstreamSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &"[redacted]")
            .field("rpc_path", &self.rpc_path)
            .field("code_key", &self.code_key)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub locations_path: PathBuf,
    /// `None` when the upstream URL or key is not configured. Lookups then
    /// fail per request instead of at startup.
    pub upstream: Option<UpstreamSettings>,
    /// When set, location codes must be digits only.
    pub strict_codes: bool,
}
