//! Dataset browsing commands.

use std::io::Write;

use anyhow::Context;
use geoexplorer_core::{selection, AppConfig, LocationDataset, LocationPoint};

fn load_dataset(config: &AppConfig) -> anyhow::Result<LocationDataset> {
    LocationDataset::load(&config.locations_path).with_context(|| {
        format!(
            "failed to load locations from {}",
            config.locations_path.display()
        )
    })
}

pub(crate) fn run_departments(config: &AppConfig) -> anyhow::Result<()> {
    let dataset = load_dataset(config)?;
    let mut stdout = std::io::stdout().lock();
    for name in selection::departments(&dataset) {
        writeln!(stdout, "{name}")?;
    }
    Ok(())
}

pub(crate) fn run_municipalities(config: &AppConfig, department: &str) -> anyhow::Result<()> {
    let dataset = load_dataset(config)?;
    let points = selection::municipalities(&dataset, department);
    if points.is_empty() {
        anyhow::bail!("no municipalities found for department '{department}'");
    }

    let mut stdout = std::io::stdout().lock();
    for point in points {
        writeln!(stdout, "{}", format_point(point))?;
    }
    Ok(())
}

/// `code name lat lon`, tab separated.
pub(crate) fn format_point(point: &LocationPoint) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        point.code, point.name, point.latitude, point.longitude
    )
}
