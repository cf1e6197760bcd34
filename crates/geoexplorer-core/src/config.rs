use crate::app_config::{AppConfig, Environment, UpstreamSettings};
use crate::ConfigError;

const DEFAULT_RPC_PATH: &str = "/rest/v1/rpc/of_emssanar";
const DEFAULT_CODE_KEY: &str = "id_dane";
const DEFAULT_UPSTREAM_TIMEOUT_MS: &str = "5000";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Blank values count as unset, matching how deployments clear a variable.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let env = parse_environment(&or_default("GEOEXPLORER_ENV", "development"))?;

    let bind_addr = or_default("GEOEXPLORER_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("GEOEXPLORER_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("GEOEXPLORER_LOG_LEVEL", "info");
    let locations_path = PathBuf::from(or_default(
        "GEOEXPLORER_LOCATIONS_PATH",
        "./data/locations.json",
    ));

    let timeout_ms = or_default("GEOEXPLORER_UPSTREAM_TIMEOUT_MS", DEFAULT_UPSTREAM_TIMEOUT_MS)
        .parse::<u64>()
        .map_err(|e| invalid("GEOEXPLORER_UPSTREAM_TIMEOUT_MS", e.to_string()))?;
    if timeout_ms == 0 {
        return Err(invalid(
            "GEOEXPLORER_UPSTREAM_TIMEOUT_MS",
            "must be greater than zero".to_string(),
        ));
    }
    let upstream_timeout = Duration::from_millis(timeout_ms);

    let strict_codes = parse_bool(
        "GEOEXPLORER_STRICT_CODES",
        &or_default("GEOEXPLORER_STRICT_CODES", "true"),
    )?;

    let rpc_path = or_default("GEOEXPLORER_UPSTREAM_RPC_PATH", DEFAULT_RPC_PATH);
    let code_key = or_default("GEOEXPLORER_UPSTREAM_CODE_KEY", DEFAULT_CODE_KEY);
    if code_key.trim().is_empty() {
        return Err(invalid(
            "GEOEXPLORER_UPSTREAM_CODE_KEY",
            "must not be empty".to_string(),
        ));
    }

    let upstream = match (optional("SUPABASE_URL"), optional("SUPABASE_API_KEY")) {
        (Some(base_url), Some(api_key)) => Some(UpstreamSettings {
            base_url,
            api_key,
            rpc_path,
            code_key,
            timeout: upstream_timeout,
        }),
        _ => None,
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        locations_path,
        upstream,
        strict_codes,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "GEOEXPLORER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
