use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a `where` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "array-contains")]
    ArrayContains,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
    #[serde(rename = "array-contains-any")]
    ArrayContainsAny,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::LessThan => "<",
            FilterOp::LessThanOrEqual => "<=",
            FilterOp::Equal => "==",
            FilterOp::NotEqual => "!=",
            FilterOp::GreaterThanOrEqual => ">=",
            FilterOp::GreaterThan => ">",
            FilterOp::ArrayContains => "array-contains",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContainsAny => "array-contains-any",
        }
    }

    /// Operators whose value is a list of alternatives.
    pub fn is_disjunctive(&self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn | FilterOp::ArrayContainsAny)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One flattened query clause, in the form handed to a store client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    Where {
        field: String,
        op: FilterOp,
        value: Value,
    },
    OrderBy {
        field: String,
        direction: Direction,
    },
    Limit {
        count: usize,
    },
    StartAt {
        values: Vec<Value>,
    },
    StartAfter {
        values: Vec<Value>,
    },
    EndAt {
        values: Vec<Value>,
    },
    EndBefore {
        values: Vec<Value>,
    },
}

impl Constraint {
    /// The document field this clause refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Constraint::Where { field, .. } | Constraint::OrderBy { field, .. } => Some(field),
            _ => None,
        }
    }

    pub(crate) fn rename_field(&mut self, renamed: String) {
        if let Constraint::Where { field, .. } | Constraint::OrderBy { field, .. } = self {
            *field = renamed;
        }
    }
}
