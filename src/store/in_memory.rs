//! InMemoryDocumentStore - HashMap-backed document store for testing and development.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::{DocumentStore, StoreError};
use crate::model::Document;
use crate::path::Path;
use crate::query::{Constraint, Direction, FilterOp};

/// In-memory document store backed by a HashMap.
///
/// Storage key is the document path, e.g. `"users/u1/posts/p1"`. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    storage: Arc<RwLock<HashMap<String, Document>>>,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    /// Create a new empty document store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of documents across all collections.
    pub fn len(&self) -> Result<usize, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn document_key(path: &Path) -> Result<String, StoreError> {
        if !path.is_document() {
            return Err(StoreError::Storage(format!("`{}` is not a document path", path)));
        }
        Ok(path.to_string())
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn get_document(&self, path: &Path) -> Result<Option<Document>, StoreError> {
        let key = Self::document_key(path)?;
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(storage.get(&key).cloned())
    }

    fn set_document(&self, path: &Path, document: Document) -> Result<(), StoreError> {
        let key = Self::document_key(path)?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        storage.insert(key, document);
        Ok(())
    }

    fn update_document(&self, path: &Path, fields: Document) -> Result<(), StoreError> {
        let key = Self::document_key(path)?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let document = storage
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound { path: key.clone() })?;
        for (name, value) in fields {
            document.insert(name, value);
        }
        Ok(())
    }

    fn delete_document(&self, path: &Path) -> Result<bool, StoreError> {
        let key = Self::document_key(path)?;
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(storage.remove(&key).is_some())
    }

    fn query(
        &self,
        collection: &Path,
        constraints: &[Constraint],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        if !collection.is_collection() {
            return Err(StoreError::Storage(format!(
                "`{}` is not a collection path",
                collection
            )));
        }

        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}/", collection);
        let mut results: Vec<(String, Document)> = storage
            .iter()
            .filter_map(|(key, document)| {
                let id = key.strip_prefix(&prefix)?;
                if id.contains('/') {
                    return None;
                }
                Some((id.to_string(), document.clone()))
            })
            .filter(|(_, document)| {
                constraints.iter().all(|constraint| match constraint {
                    Constraint::Where { field, op, value } => matches_filter(document, field, *op, value),
                    _ => true,
                })
            })
            .collect();

        let ordering: Vec<(&str, Direction)> = constraints
            .iter()
            .filter_map(|constraint| match constraint {
                Constraint::OrderBy { field, direction } => Some((field.as_str(), *direction)),
                _ => None,
            })
            .collect();

        // Documents without an ordered field are left out, ids break ties.
        results.retain(|(_, document)| ordering.iter().all(|(field, _)| lookup(document, field).is_some()));
        results.sort_by(|(a_id, a), (b_id, b)| {
            compare_ordered(a, b, &ordering).then_with(|| a_id.cmp(b_id))
        });

        for constraint in constraints {
            let (values, keep): (&Vec<Value>, fn(Ordering) -> bool) = match constraint {
                Constraint::StartAt { values } => (values, Ordering::is_ge),
                Constraint::StartAfter { values } => (values, Ordering::is_gt),
                Constraint::EndAt { values } => (values, Ordering::is_le),
                Constraint::EndBefore { values } => (values, Ordering::is_lt),
                _ => continue,
            };
            results.retain(|(_, document)| keep(compare_to_cursor(document, &ordering, values)));
        }

        if let Some(count) = constraints.iter().find_map(|constraint| match constraint {
            Constraint::Limit { count } => Some(*count),
            _ => None,
        }) {
            results.truncate(count);
        }

        Ok(results)
    }
}

/// Reads a possibly dotted field (`address.city`) from a document.
fn lookup<'d>(document: &'d Document, field: &str) -> Option<&'d Value> {
    let mut parts = field.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn matches_filter(document: &Document, field: &str, op: FilterOp, expected: &Value) -> bool {
    let Some(actual) = lookup(document, field) else {
        return false;
    };
    let alternatives = || expected.as_array().map(Vec::as_slice).unwrap_or_default();

    match op {
        FilterOp::Equal => compare_values(actual, expected) == Ordering::Equal,
        FilterOp::NotEqual => compare_values(actual, expected) != Ordering::Equal,
        FilterOp::LessThan => comparable(actual, expected) && compare_values(actual, expected) == Ordering::Less,
        FilterOp::LessThanOrEqual => {
            comparable(actual, expected) && compare_values(actual, expected) != Ordering::Greater
        }
        FilterOp::GreaterThan => {
            comparable(actual, expected) && compare_values(actual, expected) == Ordering::Greater
        }
        FilterOp::GreaterThanOrEqual => {
            comparable(actual, expected) && compare_values(actual, expected) != Ordering::Less
        }
        FilterOp::ArrayContains => actual
            .as_array()
            .is_some_and(|items| items.iter().any(|item| compare_values(item, expected) == Ordering::Equal)),
        FilterOp::In => alternatives()
            .iter()
            .any(|alternative| compare_values(actual, alternative) == Ordering::Equal),
        FilterOp::NotIn => !alternatives()
            .iter()
            .any(|alternative| compare_values(actual, alternative) == Ordering::Equal),
        FilterOp::ArrayContainsAny => actual.as_array().is_some_and(|items| {
            items.iter().any(|item| {
                alternatives()
                    .iter()
                    .any(|alternative| compare_values(item, alternative) == Ordering::Equal)
            })
        }),
    }
}

/// Range filters only match values of the same kind.
fn comparable(a: &Value, b: &Value) -> bool {
    type_rank(a) == type_rank(b)
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values: by kind first, then by content.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.total_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => a
            .iter()
            .zip(b)
            .map(|(a, b)| compare_values(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        (Value::Object(a), Value::Object(b)) => a
            .iter()
            .zip(b)
            .map(|((a_key, a), (b_key, b))| a_key.cmp(b_key).then_with(|| compare_values(a, b)))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.len().cmp(&b.len())),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn compare_ordered(a: &Document, b: &Document, ordering: &[(&str, Direction)]) -> Ordering {
    for (field, direction) in ordering {
        let ord = match (lookup(a, field), lookup(b, field)) {
            (Some(a), Some(b)) => compare_values(a, b),
            (a, b) => a.is_some().cmp(&b.is_some()),
        };
        if ord.is_ne() {
            return directed(ord, *direction);
        }
    }
    Ordering::Equal
}

/// Position of a document relative to a cursor over the ordered fields.
/// Cursor values beyond the ordered fields are ignored.
fn compare_to_cursor(document: &Document, ordering: &[(&str, Direction)], cursor: &[Value]) -> Ordering {
    for ((field, direction), bound) in ordering.iter().zip(cursor) {
        let ord = match lookup(document, field) {
            Some(value) => compare_values(value, bound),
            None => Ordering::Less,
        };
        if ord.is_ne() {
            return directed(ord, *direction);
        }
    }
    Ordering::Equal
}
