use std::fmt;

/// Errors raised while declaring models or converting between models and documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// Metadata for this type was registered twice.
    AlreadyRegistered { type_name: &'static str },
    /// Metadata was requested for a type that was never registered.
    NotFoundMetadata { type_name: &'static str },
    /// A conversion was attempted for a type without any property metadata.
    EmptyMetadata { type_name: &'static str },
    /// The type never declared the collection it lives in.
    MissingCollectionName { type_name: &'static str },
    /// An operation that needs an identifier was given a value without one.
    MissingIdentifier { context: &'static str },
    /// A value of one Rust type was handed to a slot of another.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A document value does not have the shape a converter expects.
    InvalidValue { expected: &'static str, found: String },
    /// serde_json failed to (de)serialize a plain field.
    Serde(String),
    /// Conversion of a single field failed.
    Field {
        field: String,
        source: Box<MappingError>,
    },
}

impl MappingError {
    pub(crate) fn in_field(self, field: &str) -> Self {
        MappingError::Field {
            field: field.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn invalid(expected: &'static str, found: &serde_json::Value) -> Self {
        MappingError::InvalidValue {
            expected,
            found: found.to_string(),
        }
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::AlreadyRegistered { type_name } => {
                write!(f, "metadata for {} is already registered", type_name)
            }
            MappingError::NotFoundMetadata { type_name } => {
                write!(f, "no metadata registered for {}", type_name)
            }
            MappingError::EmptyMetadata { type_name } => write!(
                f,
                "no property metadata for {} - missing model annotation",
                type_name
            ),
            MappingError::MissingCollectionName { type_name } => {
                write!(f, "{} does not declare a collection name", type_name)
            }
            MappingError::MissingIdentifier { context } => {
                write!(f, "missing identifier: {}", context)
            }
            MappingError::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {}, found {}", expected, found)
            }
            MappingError::InvalidValue { expected, found } => {
                write!(f, "invalid value: expected {}, found {}", expected, found)
            }
            MappingError::Serde(msg) => write!(f, "field serialization error: {}", msg),
            MappingError::Field { field, source } => write!(f, "field `{}`: {}", field, source),
        }
    }
}

impl std::error::Error for MappingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MappingError::Field { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MappingError {
    fn from(err: serde_json::Error) -> Self {
        MappingError::Serde(err.to_string())
    }
}
