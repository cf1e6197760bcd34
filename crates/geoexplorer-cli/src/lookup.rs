//! `lookup` command: concurrent lookups printed as JSON lines.

use std::io::Write;

use futures::stream::{self, StreamExt};
use geoexplorer_core::AppConfig;
use geoexplorer_upstream::{LocationDetail, LookupProxy, LookupResult};
use serde::Serialize;

const MAX_CONCURRENT_LOOKUPS: usize = 8;

/// One output line per requested code.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct LookupLine<'a> {
    pub code: &'a str,
    pub success: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<LocationDetail>,
}

impl<'a> LookupLine<'a> {
    pub(crate) fn new(code: &'a str, result: LookupResult) -> Self {
        match result {
            Ok(detail) => Self {
                code,
                success: true,
                status: 200,
                message: None,
                data: Some(detail),
            },
            Err(error) => Self {
                code,
                success: false,
                status: error.status_code(),
                message: Some(error.public_message()),
                data: None,
            },
        }
    }
}

/// Runs the lookups concurrently, at most [`MAX_CONCURRENT_LOOKUPS`] at a
/// time, and prints results in input order.
///
/// # Errors
///
/// Returns an error if the upstream settings are invalid, output cannot be
/// written, or any lookup failed.
pub(crate) async fn run_lookup(config: &AppConfig, codes: &[String]) -> anyhow::Result<()> {
    let proxy = LookupProxy::from_config(config)?;
    let proxy = &proxy;

    let lines: Vec<LookupLine<'_>> = stream::iter(codes)
        .map(|code| async move { LookupLine::new(code, proxy.lookup(code).await) })
        .buffered(MAX_CONCURRENT_LOOKUPS)
        .collect()
        .await;
    let failed = lines.iter().filter(|line| !line.success).count();

    let mut stdout = std::io::stdout().lock();
    for line in &lines {
        writeln!(stdout, "{}", serde_json::to_string(line)?)?;
    }

    tracing::info!(total = lines.len(), failed, "lookups finished");
    if failed > 0 {
        anyhow::bail!("{failed} of {} lookups failed", lines.len());
    }
    Ok(())
}
