//! Static location dataset.
//!
//! The dataset is a JSON file in one of two layouts:
//!
//! - nested by department name:
//!   `{ "Nariño": [ { "nombre_municipio", "id_dane", "latitud", "longitud" } ] }`
//! - flat with hierarchical codes:
//!   `[ { "id_dane", "nombre", "latitud", "longitud", "departamento"? } ]`
//!
//! Both are loaded once into immutable [`LocationPoint`]s.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::code::{self, DaneLevel};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("dataset root must be an object keyed by department or an array of points")]
    UnsupportedLayout,

    #[error("invalid location point '{code}': {reason}")]
    InvalidPoint { code: String, reason: String },
}

/// A geographic unit from the static dataset.
///
/// Serialized with the dataset's own field names so the browser consumes the
/// same shape it would read from the raw file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPoint {
    #[serde(rename = "id_dane")]
    pub code: String,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "latitud")]
    pub latitude: f64,
    #[serde(rename = "longitud")]
    pub longitude: f64,
    #[serde(rename = "departamento", skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl LocationPoint {
    #[must_use]
    pub fn level(&self) -> DaneLevel {
        code::level(&self.code)
    }

    #[must_use]
    pub fn parent_department(&self) -> Option<&str> {
        code::parent_department(&self.code)
    }
}

/// `id_dane` appears both as a string and as a bare integer in real files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCode {
    Text(String),
    Number(u64),
}

impl RawCode {
    fn to_code(&self) -> String {
        match self {
            RawCode::Text(s) => s.trim().to_string(),
            RawCode::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawNestedPoint {
    nombre_municipio: String,
    id_dane: RawCode,
    latitud: f64,
    longitud: f64,
}

#[derive(Debug, Deserialize)]
struct RawFlatPoint {
    id_dane: RawCode,
    #[serde(alias = "nombre_municipio")]
    nombre: String,
    latitud: f64,
    longitud: f64,
    #[serde(default)]
    departamento: Option<String>,
}

/// The full, immutable set of location points.
#[derive(Debug, Clone, Default)]
pub struct LocationDataset {
    points: Vec<LocationPoint>,
}

impl LocationDataset {
    /// Reads and parses the dataset file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be read, otherwise the
    /// errors of [`LocationDataset::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_json_str(&raw)?;
        tracing::info!(
            path = %path.display(),
            points = dataset.len(),
            "location dataset loaded"
        );
        Ok(dataset)
    }

    /// Parses a dataset from JSON text, detecting the nested or flat layout.
    ///
    /// # Errors
    ///
    /// - [`DatasetError::Parse`] if the text is not JSON or an entry has the
    ///   wrong shape.
    /// - [`DatasetError::UnsupportedLayout`] if the root is neither an object
    ///   nor an array.
    /// - [`DatasetError::InvalidPoint`] for an empty code or coordinates that
    ///   are not on the map.
    pub fn from_json_str(raw: &str) -> Result<Self, DatasetError> {
        let root: Value = serde_json::from_str(raw)?;
        let points = match root {
            Value::Object(departments) => parse_nested(departments)?,
            Value::Array(entries) => parse_flat(entries)?,
            _ => return Err(DatasetError::UnsupportedLayout),
        };
        Self::from_points(points)
    }

    /// Builds a dataset from already-constructed points, validating each one.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::InvalidPoint`] for the first invalid point.
    pub fn from_points(points: Vec<LocationPoint>) -> Result<Self, DatasetError> {
        for point in &points {
            validate_point(point)?;
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[LocationPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finds a point by exact code.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&LocationPoint> {
        let code = code.trim();
        self.points.iter().find(|p| p.code == code)
    }
}

fn parse_nested(
    departments: serde_json::Map<String, Value>,
) -> Result<Vec<LocationPoint>, DatasetError> {
    let mut points = Vec::new();
    for (department, entries) in departments {
        let entries: Vec<RawNestedPoint> = serde_json::from_value(entries)?;
        points.extend(entries.into_iter().map(|raw| LocationPoint {
            code: raw.id_dane.to_code(),
            name: raw.nombre_municipio,
            latitude: raw.latitud,
            longitude: raw.longitud,
            department: Some(department.clone()),
        }));
    }
    Ok(points)
}

fn parse_flat(entries: Vec<Value>) -> Result<Vec<LocationPoint>, DatasetError> {
    let raw: Vec<RawFlatPoint> = serde_json::from_value(Value::Array(entries))?;

    // Department-level rows name the department for their municipalities.
    let department_names: HashMap<String, String> = raw
        .iter()
        .filter_map(|p| {
            let code = p.id_dane.to_code();
            (code::level(&code) == DaneLevel::Department).then(|| (code, p.nombre.clone()))
        })
        .collect();

    Ok(raw
        .into_iter()
        .map(|p| {
            let code = p.id_dane.to_code();
            let department = p
                .departamento
                .filter(|d| !d.trim().is_empty())
                .or_else(|| match code::level(&code) {
                    DaneLevel::Department => Some(p.nombre.clone()),
                    _ => code::parent_department(&code)
                        .and_then(|parent| department_names.get(parent).cloned()),
                });
            LocationPoint {
                code,
                name: p.nombre,
                latitude: p.latitud,
                longitude: p.longitud,
                department,
            }
        })
        .collect())
}

fn validate_point(point: &LocationPoint) -> Result<(), DatasetError> {
    let invalid = |reason: &str| DatasetError::InvalidPoint {
        code: point.code.clone(),
        reason: reason.to_string(),
    };

    if point.code.trim().is_empty() {
        return Err(invalid("code is empty"));
    }
    if !point.latitude.is_finite() || !(-90.0..=90.0).contains(&point.latitude) {
        return Err(invalid("latitude out of range"));
    }
    if !point.longitude.is_finite() || !(-180.0..=180.0).contains(&point.longitude) {
        return Err(invalid("longitude out of range"));
    }
    Ok(())
}
