//! Canonical location-detail record.
//!
//! Serialized with the field names the browser already consumes, regardless
//! of which upstream schema the record was normalized from.

use serde::{Deserialize, Serialize};

/// Descriptive attributes for one location, as returned to callers.
///
/// `municipality`, `department` and `address` are never empty on a value
/// produced by normalization. The remaining fields default to `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetail {
    #[serde(rename = "municipio")]
    pub municipality: String,
    #[serde(rename = "departamento")]
    pub department: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "horario_atencion", default)]
    pub hours: String,
    /// Newline-delimited list.
    #[serde(rename = "servicios_sub", default)]
    pub subsidized_services: String,
    /// Newline-delimited list.
    #[serde(rename = "servicios_cont", default)]
    pub contributory_services: String,
}

/// Outcome of one lookup.
pub type LookupResult = Result<LocationDetail, crate::error::LookupError>;
