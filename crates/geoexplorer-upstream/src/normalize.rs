//! Normalization of upstream responses into [`LocationDetail`].
//!
//! Two independent adapters run in sequence:
//!
//! 1. **Shape**: the RPC answers with an envelope
//!    (`{ "success", "data"?, "message"? }`), a bare array of zero or one
//!    records, or a bare record. [`extract_record`] reduces all of them to a
//!    single JSON object or a [`LookupError::NotFound`].
//! 2. **Schema**: records use either the canonical field names
//!    (`municipio`, `horario_atencion`, ...) or the named variant
//!    (`nombre_municipio`, `horario`, ...). [`normalize_record`] detects the
//!    schema, reads that schema's keys first and the other schema's keys as a
//!    fallback, then validates the required fields.

use serde_json::{Map, Value};

use crate::error::LookupError;
use crate::types::LocationDetail;

pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "No data found in upstream response.";

/// Response shape detected on the parsed body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    Envelope,
    BareArray,
    BareRecord,
}

/// Field naming scheme detected on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSchema {
    /// `municipio`, `departamento`, `horario_atencion`
    Canonical,
    /// `nombre_municipio`, `nombre_departamento`, `horario`
    Named,
}

/// One output field and the upstream keys it may come from under each schema.
struct FieldRule {
    name: &'static str,
    canonical: &'static [&'static str],
    named: &'static [&'static str],
}

impl FieldRule {
    /// Keys in priority order: the detected schema's keys, then the other's.
    fn candidates(&self, schema: RecordSchema) -> impl Iterator<Item = &'static str> {
        let (first, second) = match schema {
            RecordSchema::Canonical => (self.canonical, self.named),
            RecordSchema::Named => (self.named, self.canonical),
        };
        first.iter().chain(second).copied()
    }
}

const MUNICIPALITY: FieldRule = FieldRule {
    name: "municipio",
    canonical: &["municipio"],
    named: &["nombre_municipio"],
};
const DEPARTMENT: FieldRule = FieldRule {
    name: "departamento",
    canonical: &["departamento"],
    named: &["nombre_departamento"],
};
const ADDRESS: FieldRule = FieldRule {
    name: "direccion",
    canonical: &["direccion"],
    named: &[],
};
const HOURS: FieldRule = FieldRule {
    name: "horario_atencion",
    canonical: &["horario_atencion"],
    named: &["horario"],
};
const SUBSIDIZED: FieldRule = FieldRule {
    name: "servicios_sub",
    canonical: &["servicios_sub"],
    named: &[],
};
const CONTRIBUTORY: FieldRule = FieldRule {
    name: "servicios_cont",
    canonical: &["servicios_cont"],
    named: &[],
};

/// Classifies the top-level body. `None` for bodies no adapter accepts.
#[must_use]
pub fn detect_shape(body: &Value) -> Option<ResponseShape> {
    match body {
        Value::Object(map) if map.contains_key("success") => Some(ResponseShape::Envelope),
        Value::Object(_) => Some(ResponseShape::BareRecord),
        Value::Array(_) => Some(ResponseShape::BareArray),
        _ => None,
    }
}

/// Classifies a record's field names.
#[must_use]
pub fn detect_schema(record: &Map<String, Value>) -> RecordSchema {
    if record.contains_key("nombre_municipio") || record.contains_key("nombre_departamento") {
        RecordSchema::Named
    } else {
        RecordSchema::Canonical
    }
}

/// Reduces any supported body to the single record it carries.
///
/// # Errors
///
/// - [`LookupError::NotFound`] for `null`, an empty array, or an envelope
///   whose `success` is not `true` or whose `data` is missing.
/// - [`LookupError::Internal`] for scalar bodies or a record that is not an
///   object.
pub fn extract_record(body: Value) -> Result<(ResponseShape, Map<String, Value>), LookupError> {
    if body.is_null() {
        return Err(LookupError::NotFound(DEFAULT_NOT_FOUND_MESSAGE.to_string()));
    }

    let shape = detect_shape(&body).ok_or_else(|| {
        LookupError::Internal(format!("unsupported upstream response: {body}"))
    })?;

    let record = match (shape, body) {
        (ResponseShape::Envelope, Value::Object(mut envelope)) => {
            let success = envelope.get("success").and_then(Value::as_bool) == Some(true);
            let data = envelope.remove("data").filter(|d| !d.is_null());
            match data {
                Some(data) if success => first_record(data)?,
                _ => {
                    let message = envelope
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .unwrap_or(DEFAULT_NOT_FOUND_MESSAGE);
                    return Err(LookupError::NotFound(message.to_string()));
                }
            }
        }
        (_, other) => first_record(other)?,
    };

    Ok((shape, record))
}

/// Takes element 0 of an array, or the value itself when it is an object.
fn first_record(value: Value) -> Result<Map<String, Value>, LookupError> {
    match value {
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(record)) => Ok(record),
            Some(other) => Err(LookupError::Internal(format!(
                "upstream array element is not an object: {other}"
            ))),
            None => Err(LookupError::NotFound(DEFAULT_NOT_FOUND_MESSAGE.to_string())),
        },
        Value::Object(record) => Ok(record),
        other => Err(LookupError::Internal(format!(
            "upstream record is not an object: {other}"
        ))),
    }
}

/// Reads the first non-blank candidate of `rule` as text.
///
/// Strings are trimmed, numbers rendered; anything else counts as absent.
fn text_field(record: &Map<String, Value>, rule: &FieldRule, schema: RecordSchema) -> String {
    rule.candidates(schema)
        .filter_map(|key| match record.get(key) {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

/// Maps a record of either schema onto [`LocationDetail`] and validates it.
///
/// # Errors
///
/// Returns [`LookupError::IncompleteData`] naming every required field
/// (`municipio`, `departamento`, `direccion`) that is missing or blank.
pub fn normalize_record(record: &Map<String, Value>) -> Result<LocationDetail, LookupError> {
    let schema = detect_schema(record);
    tracing::debug!(?schema, "normalizing upstream record");
    let detail = LocationDetail {
        municipality: text_field(record, &MUNICIPALITY, schema),
        department: text_field(record, &DEPARTMENT, schema),
        address: text_field(record, &ADDRESS, schema),
        hours: text_field(record, &HOURS, schema),
        subsidized_services: text_field(record, &SUBSIDIZED, schema),
        contributory_services: text_field(record, &CONTRIBUTORY, schema),
    };

    let missing: Vec<&'static str> = [
        (&MUNICIPALITY, &detail.municipality),
        (&DEPARTMENT, &detail.department),
        (&ADDRESS, &detail.address),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(rule, _)| rule.name)
    .collect();

    if missing.is_empty() {
        Ok(detail)
    } else {
        Err(LookupError::IncompleteData { missing })
    }
}

/// Full normalization of a parsed upstream body.
///
/// # Errors
///
/// See [`extract_record`] and [`normalize_record`].
pub fn normalize_response(body: Value) -> Result<LocationDetail, LookupError> {
    let (shape, record) = extract_record(body)?;
    tracing::debug!(?shape, "extracted upstream record");
    normalize_record(&record)
}
