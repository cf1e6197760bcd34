//! Cascading department → municipality selection.
//!
//! Pure functions from the dataset and the current selection to the points the
//! map should show and the viewport it should center on. Recomputed on every
//! selection change; nothing here holds state.

use serde::{Deserialize, Serialize};

use crate::code::DaneLevel;
use crate::dataset::{LocationDataset, LocationPoint};

/// Center of Colombia, used when nothing narrower is selected.
pub const DEFAULT_CENTER: [f64; 2] = [4.7110, -74.0721];
pub const DEFAULT_ZOOM: u8 = 5;
pub const DEPARTMENT_ZOOM: u8 = 8;
pub const MUNICIPALITY_ZOOM: u8 = 12;

/// Current dropdown state. `None` means "all".
///
/// `department` holds a department name or a department code; `municipality`
/// holds a municipality code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub municipality: Option<String>,
}

impl Selection {
    fn department(&self) -> Option<&str> {
        non_blank(self.department.as_deref())
    }

    fn municipality(&self) -> Option<&str> {
        non_blank(self.municipality.as_deref())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// `[latitude, longitude]`
    pub center: [f64; 2],
    pub zoom: u8,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Points to draw plus where to center the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionView<'a> {
    pub points: Vec<&'a LocationPoint>,
    pub viewport: Viewport,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// True when `point` belongs to `department` (a name or a department code).
fn in_department(point: &LocationPoint, department: &str) -> bool {
    point.department.as_deref() == Some(department)
        || point.parent_department() == Some(department)
        || (point.level() == DaneLevel::Department && point.code == department)
}

/// Sorted, deduplicated department names present in the dataset.
#[must_use]
pub fn departments(dataset: &LocationDataset) -> Vec<&str> {
    let mut names: Vec<&str> = dataset
        .points()
        .iter()
        .filter_map(|p| p.department.as_deref())
        .collect();
    names.sort_by_key(|n| n.to_lowercase());
    names.dedup();
    names
}

/// Municipalities of `department`, sorted by name.
///
/// Department-level rows are excluded; they are not selectable in the
/// municipality dropdown.
#[must_use]
pub fn municipalities<'a>(dataset: &'a LocationDataset, department: &str) -> Vec<&'a LocationPoint> {
    let department = department.trim();
    let mut munis: Vec<&LocationPoint> = dataset
        .points()
        .iter()
        .filter(|p| p.level() != DaneLevel::Department && in_department(p, department))
        .collect();
    munis.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.code.cmp(&b.code))
    });
    munis
}

/// Points visible for `selection`.
///
/// A selected municipality wins over the department; an unknown municipality
/// code yields no points.
#[must_use]
pub fn filter_points<'a>(dataset: &'a LocationDataset, selection: &Selection) -> Vec<&'a LocationPoint> {
    if let Some(code) = selection.municipality() {
        return dataset.points().iter().filter(|p| p.code == code).collect();
    }
    if let Some(department) = selection.department() {
        return dataset
            .points()
            .iter()
            .filter(|p| in_department(p, department))
            .collect();
    }
    dataset.points().iter().collect()
}

/// Map viewport for `selection` given the already filtered points.
///
/// - municipality found: its coordinates at [`MUNICIPALITY_ZOOM`]
/// - department with points: mean position at [`DEPARTMENT_ZOOM`]
/// - otherwise [`Viewport::default`]
#[must_use]
pub fn viewport(dataset: &LocationDataset, selection: &Selection, filtered: &[&LocationPoint]) -> Viewport {
    if let Some(active) = selection.municipality().and_then(|code| dataset.find(code)) {
        return Viewport {
            center: [active.latitude, active.longitude],
            zoom: MUNICIPALITY_ZOOM,
        };
    }

    if selection.department().is_some() && !filtered.is_empty() {
        #[allow(clippy::cast_precision_loss)]
        let n = filtered.len() as f64;
        let lat = filtered.iter().map(|p| p.latitude).sum::<f64>() / n;
        let lon = filtered.iter().map(|p| p.longitude).sum::<f64>() / n;
        return Viewport {
            center: [lat, lon],
            zoom: DEPARTMENT_ZOOM,
        };
    }

    Viewport::default()
}

/// Filters the dataset and derives the viewport in one step.
#[must_use]
pub fn select<'a>(dataset: &'a LocationDataset, selection: &Selection) -> SelectionView<'a> {
    let points = filter_points(dataset, selection);
    let viewport = viewport(dataset, selection, &points);
    SelectionView { points, viewport }
}
