//! Converters - per-field functions between document values and model values.
//!
//! Every converter pair has a `to_model` half that receives the raw document
//! value (or `None` when the key is absent) and a `to_document` half that
//! receives the model-side [`FieldValue`]. Fields without converters use the
//! identity pair.

use std::any::Any;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::error::MappingError;
use crate::model::{FieldValue, Model};
use crate::relationship::{ToMany, ToOne};

pub type ToModelFn = Arc<dyn Fn(Option<&Value>) -> Result<FieldValue, MappingError> + Send + Sync>;
pub type ToDocumentFn = Arc<dyn Fn(FieldValue) -> Result<Value, MappingError> + Send + Sync>;

/// Absent keys become `null`.
pub fn identity_to_model(value: Option<&Value>) -> Result<FieldValue, MappingError> {
    Ok(FieldValue::Plain(value.cloned().unwrap_or(Value::Null)))
}

pub fn identity_to_document(value: FieldValue) -> Result<Value, MappingError> {
    match value {
        FieldValue::Plain(value) => Ok(value),
        FieldValue::Typed(_) => Err(MappingError::TypeMismatch {
            expected: "plain value",
            found: "typed value without a converter",
        }),
    }
}

/// Wraps a pair of typed functions into a converter pair for fields of type `F`.
pub fn custom<F, TM, TD>(to_model: TM, to_document: TD) -> (ToModelFn, ToDocumentFn)
where
    F: Any + Send + Sync,
    TM: Fn(Option<&Value>) -> Result<F, MappingError> + Send + Sync + 'static,
    TD: Fn(&F) -> Result<Value, MappingError> + Send + Sync + 'static,
{
    let to_model: ToModelFn = Arc::new(move |value| to_model(value).map(FieldValue::typed));
    let to_document: ToDocumentFn = Arc::new(move |value| {
        let value = value.into_typed::<F>()?;
        to_document(&value)
    });
    (to_model, to_document)
}

/// Like [`custom`], applied element-wise to an array field of type `Vec<F>`.
///
/// An absent or `null` array converts to an empty `Vec`.
pub fn custom_array<F, TM, TD>(to_model: TM, to_document: TD) -> (ToModelFn, ToDocumentFn)
where
    F: Any + Send + Sync,
    TM: Fn(Option<&Value>) -> Result<F, MappingError> + Send + Sync + 'static,
    TD: Fn(&F) -> Result<Value, MappingError> + Send + Sync + 'static,
{
    let to_model: ToModelFn = Arc::new(move |value| match value {
        None | Some(Value::Null) => Ok(FieldValue::typed(Vec::<F>::new())),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| to_model(Some(item)))
            .collect::<Result<Vec<F>, _>>()
            .map(FieldValue::typed),
        Some(other) => Err(MappingError::invalid("array", other)),
    });
    let to_document: ToDocumentFn = Arc::new(move |value| {
        let items = value.into_typed::<Vec<F>>()?;
        items
            .iter()
            .map(|item| to_document(item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    });
    (to_model, to_document)
}

/// Converter pair for `Option<DateTime<Utc>>` fields stored as timestamp pairs.
pub fn date() -> (ToModelFn, ToDocumentFn) {
    custom(date_to_model, date_to_document)
}

/// Reads `{ "seconds", "nanoseconds" }` or an RFC 3339 string.
///
/// A missing timestamp pair yields `None` rather than an error.
pub fn date_to_model(value: Option<&Value>) -> Result<Option<DateTime<Utc>>, MappingError> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Object(map) => {
            let seconds = match map.get("seconds").or_else(|| map.get("_seconds")) {
                None | Some(Value::Null) => return Ok(None),
                Some(seconds) => seconds
                    .as_i64()
                    .ok_or_else(|| MappingError::invalid("integer seconds", seconds))?,
            };
            let nanos = match map.get("nanoseconds").or_else(|| map.get("_nanoseconds")) {
                None | Some(Value::Null) => 0,
                Some(nanos) => nanos
                    .as_u64()
                    .and_then(|nanos| u32::try_from(nanos).ok())
                    .ok_or_else(|| MappingError::invalid("nanoseconds", nanos))?,
            };
            DateTime::from_timestamp(seconds, nanos)
                .map(Some)
                .ok_or_else(|| MappingError::invalid("timestamp in range", value))
        }
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .map(|parsed| Some(parsed.with_timezone(&Utc)))
            .map_err(|_| MappingError::invalid("RFC 3339 timestamp", value)),
        other => Err(MappingError::invalid("timestamp", other)),
    }
}

pub fn date_to_document(value: &Option<DateTime<Utc>>) -> Result<Value, MappingError> {
    Ok(match value {
        Some(date) => json!({
            "seconds": date.timestamp(),
            "nanoseconds": date.timestamp_subsec_nanos(),
        }),
        None => Value::Null,
    })
}

/// Converter pair for `ToOne<T>` fields: the document holds the id.
pub fn to_one<T: Model>() -> (ToModelFn, ToDocumentFn) {
    custom(
        |value: Option<&Value>| match value {
            None | Some(Value::Null) => Ok(ToOne::<T>::new(None)),
            Some(Value::String(id)) => Ok(ToOne::<T>::with_id(id.clone())),
            Some(other) => Err(MappingError::invalid("string id", other)),
        },
        |relationship: &ToOne<T>| {
            Ok(relationship
                .id()
                .map_or(Value::Null, |id| Value::String(id.to_string())))
        },
    )
}

/// Converter pair for `ToMany<T>` fields: the document holds an array of ids.
/// An empty string in that array is rejected rather than dropped.
pub fn to_many<T: Model>() -> (ToModelFn, ToDocumentFn) {
    custom(
        |value: Option<&Value>| match value {
            None | Some(Value::Null) => Ok(ToMany::<T>::default()),
            Some(Value::Array(items)) => {
                let ids = items
                    .iter()
                    .map(|item| match item.as_str() {
                        Some(id) if !id.is_empty() => Ok(id.to_string()),
                        _ => Err(MappingError::invalid("non-empty string id", item)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ToMany::<T>::new(ids))
            }
            Some(other) => Err(MappingError::invalid("array of ids", other)),
        },
        |relationship: &ToMany<T>| {
            Ok(Value::Array(
                relationship
                    .ids()
                    .map(|id| Value::String(id.to_string()))
                    .collect(),
            ))
        },
    )
}
