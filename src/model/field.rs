use std::any::{type_name, Any};
use std::fmt;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::MappingError;

/// Model-side value of a single field.
///
/// Plain fields travel as JSON; fields whose converter produces a concrete Rust
/// type (relationships, dates, custom converters) travel boxed.
pub enum FieldValue {
    Plain(Value),
    Typed(Box<dyn Any + Send + Sync>),
}

impl FieldValue {
    pub fn typed<T: Any + Send + Sync>(value: T) -> Self {
        FieldValue::Typed(Box::new(value))
    }

    /// Unboxes a typed value, failing if it holds anything other than `T`.
    pub fn into_typed<T: Any>(self) -> Result<T, MappingError> {
        match self {
            FieldValue::Typed(boxed) => {
                boxed
                    .downcast::<T>()
                    .map(|value| *value)
                    .map_err(|_| MappingError::TypeMismatch {
                        expected: type_name::<T>(),
                        found: "another typed value",
                    })
            }
            FieldValue::Plain(_) => Err(MappingError::TypeMismatch {
                expected: type_name::<T>(),
                found: "plain value",
            }),
        }
    }

    pub fn as_plain(&self) -> Option<&Value> {
        match self {
            FieldValue::Plain(value) => Some(value),
            FieldValue::Typed(_) => None,
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            FieldValue::Typed(_) => f.write_str("Typed(..)"),
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        FieldValue::Plain(value)
    }
}

/// Reads a serde-convertible field.
pub fn plain_value<T: Serialize>(slot: &T) -> Result<FieldValue, MappingError> {
    Ok(FieldValue::Plain(serde_json::to_value(slot)?))
}

/// Reads a field that converters handle as a concrete type.
pub fn typed_value<T: Clone + Send + Sync + 'static>(slot: &T) -> FieldValue {
    FieldValue::Typed(Box::new(slot.clone()))
}

/// Writes a serde-convertible field.
///
/// A `null` that the field type cannot hold leaves the freshly instantiated
/// default in place, so absent document keys do not fail non-optional fields.
pub fn assign_plain<T: DeserializeOwned + 'static>(
    slot: &mut T,
    value: FieldValue,
) -> Result<(), MappingError> {
    let value = match value {
        FieldValue::Plain(value) => value,
        typed => {
            *slot = typed.into_typed::<T>()?;
            return Ok(());
        }
    };

    match serde_json::from_value::<T>(value.clone()) {
        Ok(parsed) => {
            *slot = parsed;
            Ok(())
        }
        Err(_) if value.is_null() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

/// Writes a field from a typed value produced by a converter.
pub fn assign_typed<T: Any>(slot: &mut T, value: FieldValue) -> Result<(), MappingError> {
    *slot = value.into_typed::<T>()?;
    Ok(())
}
