//! Record normalization
//!
//! Maps one raw API record, plus its resolved tags and the run's download
//! timestamp, into the canonical [`ProjectSnapshot`] row. This stage is pure:
//! no I/O, fully deterministic given its inputs.

use crate::model::{ProjectSnapshot, RawProject};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from decoding or normalizing a single record
///
/// These are absorbed at the crawl level: the offending record is logged and
/// dropped, the run continues.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Type mismatch for {field}: {detail}")]
    TypeMismatch { field: String, detail: String },
}

/// Decodes one element of a page's `data` array into a [`RawProject`]
pub fn decode_record(value: &Value) -> Result<RawProject, NormalizationError> {
    serde_json::from_value(value.clone()).map_err(classify_decode_error)
}

fn classify_decode_error(err: serde_json::Error) -> NormalizationError {
    let message = err.to_string();
    if let Some(rest) = message.strip_prefix("missing field `") {
        let field = rest.split('`').next().unwrap_or("?");
        NormalizationError::MissingField(field.to_string())
    } else {
        NormalizationError::TypeMismatch {
            field: "record".to_string(),
            detail: message,
        }
    }
}

/// Normalizes one raw record into a snapshot row
///
/// Copies raw fields through, flattens `carrier_id`/`carrier_name`/
/// `carrier_city` and `contact_name` from their nested parents, and stamps
/// `tags` and `downloaded_at`. An absent or null parent object yields null
/// flattened fields and is never an error; a present but malformed parent is.
pub fn normalize(
    raw: RawProject,
    tags: Vec<String>,
    downloaded_at: DateTime<Utc>,
) -> Result<ProjectSnapshot, NormalizationError> {
    let (carrier_id, carrier_name, carrier_city) = flatten_carrier(&raw.carrier)?;
    let contact_name = match object_fields(&raw.contact, "contact")? {
        Some(fields) => optional_string(fields, "contact", "name")?,
        None => None,
    };

    let links = serde_json::to_value(&raw.links).map_err(|e| NormalizationError::TypeMismatch {
        field: "links".to_string(),
        detail: e.to_string(),
    })?;

    Ok(ProjectSnapshot {
        id: raw.id,
        downloaded_at,

        created_at: raw.created_at,
        updated_at: raw.updated_at,
        content_updated_at: raw.content_updated_at,
        activated_at: raw.activated_at,
        completed_at: raw.completed_at,
        closed_at: raw.closed_at,

        donated_amount_in_cents: raw.donated_amount_in_cents,
        open_amount_in_cents: raw.open_amount_in_cents,
        progress_percentage: raw.progress_percentage,

        donations_count: raw.donations_count,
        donor_count: raw.donor_count,
        positive_opinions_count: raw.positive_opinions_count,
        negative_opinions_count: raw.negative_opinions_count,
        comments_count: raw.comments_count,
        incomplete_need_count: raw.incomplete_need_count,
        completed_need_count: raw.completed_need_count,

        latitude: raw.latitude,
        longitude: raw.longitude,
        city: raw.city,
        country: raw.country,
        zip: raw.zip,
        title: raw.title,
        description: raw.description,
        summary: raw.summary,

        tax_deductible: raw.tax_deductible,
        donations_prohibited: raw.donations_prohibited,

        carrier_id,
        carrier_name,
        carrier_city,
        contact_name,

        carrier: non_null(raw.carrier),
        contact: non_null(raw.contact),
        profile_picture: non_null(raw.profile_picture),
        active_matching_fund: non_null(raw.active_matching_fund),
        closed_notice: non_null(raw.closed_notice),
        links: Some(links),

        tags,
    })
}

/// Flattens the nested carrier object into its three convenience fields
fn flatten_carrier(
    carrier: &Option<Value>,
) -> Result<(Option<i64>, Option<String>, Option<String>), NormalizationError> {
    let fields = match object_fields(carrier, "carrier")? {
        Some(fields) => fields,
        None => return Ok((None, None, None)),
    };

    let id = optional_i64(fields, "carrier", "id")?;
    let name = optional_string(fields, "carrier", "name")?;
    let city = optional_string(fields, "carrier", "city")?;
    Ok((id, name, city))
}

/// Unwraps an optional nested object, rejecting non-object values
fn object_fields<'a>(
    parent: &'a Option<Value>,
    parent_name: &str,
) -> Result<Option<&'a Map<String, Value>>, NormalizationError> {
    match parent {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(fields)) => Ok(Some(fields)),
        Some(other) => Err(NormalizationError::TypeMismatch {
            field: parent_name.to_string(),
            detail: format!("expected object, got {other}"),
        }),
    }
}

/// Reads `parent.key` as an integer; the key must exist, but may be null
fn optional_i64(
    fields: &Map<String, Value>,
    parent_name: &str,
    key: &str,
) -> Result<Option<i64>, NormalizationError> {
    match fields.get(key) {
        None => Err(NormalizationError::MissingField(format!(
            "{parent_name}.{key}"
        ))),
        Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            NormalizationError::TypeMismatch {
                field: format!("{parent_name}.{key}"),
                detail: format!("expected integer, got {n}"),
            }
        }),
        Some(other) => Err(NormalizationError::TypeMismatch {
            field: format!("{parent_name}.{key}"),
            detail: format!("expected integer, got {other}"),
        }),
    }
}

/// Reads `parent.key` as a string; the key must exist, but may be null
fn optional_string(
    fields: &Map<String, Value>,
    parent_name: &str,
    key: &str,
) -> Result<Option<String>, NormalizationError> {
    match fields.get(key) {
        None => Err(NormalizationError::MissingField(format!(
            "{parent_name}.{key}"
        ))),
        Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(NormalizationError::TypeMismatch {
            field: format!("{parent_name}.{key}"),
            detail: format!("expected string, got {other}"),
        }),
    }
}

/// Collapses an explicit JSON null into SQL-level absence
fn non_null(value: Option<Value>) -> Option<Value> {
    match value {
        Some(Value::Null) | None => None,
        present => present,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_from(value: Value) -> RawProject {
        decode_record(&value).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2021-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_null_carrier_yields_null_flattened_fields() {
        let raw = raw_from(json!({ "id": 1, "carrier": null }));
        let snapshot = normalize(raw, vec![], now()).unwrap();

        assert_eq!(snapshot.carrier_id, None);
        assert_eq!(snapshot.carrier_name, None);
        assert_eq!(snapshot.carrier_city, None);
        assert_eq!(snapshot.carrier, None);
    }

    #[test]
    fn test_carrier_fields_flattened() {
        let raw = raw_from(json!({
            "id": 1,
            "carrier": { "id": 77, "name": "Hilfswerk e.V.", "city": "Berlin", "picture": {} }
        }));
        let snapshot = normalize(raw, vec![], now()).unwrap();

        assert_eq!(snapshot.carrier_id, Some(77));
        assert_eq!(snapshot.carrier_name.as_deref(), Some("Hilfswerk e.V."));
        assert_eq!(snapshot.carrier_city.as_deref(), Some("Berlin"));
        // The full carrier object is preserved alongside the flattened fields
        assert!(snapshot.carrier.is_some());
    }

    #[test]
    fn test_carrier_must_be_object() {
        let raw = raw_from(json!({ "id": 1, "carrier": "not an object" }));
        let err = normalize(raw, vec![], now()).unwrap_err();
        assert!(matches!(err, NormalizationError::TypeMismatch { .. }));
    }

    #[test]
    fn test_carrier_missing_name_is_error() {
        let raw = raw_from(json!({ "id": 1, "carrier": { "id": 77, "city": "Berlin" } }));
        let err = normalize(raw, vec![], now()).unwrap_err();
        match err {
            NormalizationError::MissingField(field) => assert_eq!(field, "carrier.name"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_contact_name_flattened() {
        let raw = raw_from(json!({ "id": 1, "contact": { "name": "Maria" } }));
        let snapshot = normalize(raw, vec![], now()).unwrap();
        assert_eq!(snapshot.contact_name.as_deref(), Some("Maria"));
    }

    #[test]
    fn test_tags_and_download_time_stamped() {
        let raw = raw_from(json!({ "id": 9 }));
        let tags = vec!["education".to_string(), "health".to_string()];
        let snapshot = normalize(raw, tags.clone(), now()).unwrap();

        assert_eq!(snapshot.tags, tags);
        assert_eq!(snapshot.downloaded_at, now());
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let value = json!({
            "id": 5,
            "updated_at": "2021-05-01T00:00:00Z",
            "carrier": { "id": 2, "name": "x", "city": null },
            "links": [{ "rel": "self", "href": "https://x/p/5" }]
        });
        let tags = vec!["animals".to_string()];

        let first = normalize(raw_from(value.clone()), tags.clone(), now()).unwrap();
        let second = normalize(raw_from(value), tags, now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decode_record_missing_id() {
        let err = decode_record(&json!({ "title": "no id here" })).unwrap_err();
        match err {
            NormalizationError::MissingField(field) => assert_eq!(field, "id"),
            other => panic!("expected MissingField, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_record_wrong_type() {
        let err = decode_record(&json!({ "id": "forty-two" })).unwrap_err();
        assert!(matches!(err, NormalizationError::TypeMismatch { .. }));
    }
}
