use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use super::state::{self, EndBoundable, Filterable, Limitable, StartBoundable};
use super::{Constraint, Direction, FilterOp, QueryError, MAX_DISJUNCTION_VALUES};
use crate::metadata::TypeMetadata;

/// One step of a query chain.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// The root; contributes no constraint.
    Start,
    Where {
        field: String,
        op: FilterOp,
        value: Value,
    },
    OrderBy {
        field: String,
        direction: Direction,
    },
    Limit(usize),
    StartAt {
        values: Vec<Value>,
        inclusive: bool,
    },
    EndAt {
        values: Vec<Value>,
        inclusive: bool,
    },
}

impl QueryNode {
    fn to_constraint(&self) -> Result<Option<Constraint>, QueryError> {
        let constraint = match self {
            QueryNode::Start => return Ok(None),
            QueryNode::Where { field, op, value } => {
                check_disjunction(field, *op, value)?;
                Constraint::Where {
                    field: field.clone(),
                    op: *op,
                    value: value.clone(),
                }
            }
            QueryNode::OrderBy { field, direction } => Constraint::OrderBy {
                field: field.clone(),
                direction: *direction,
            },
            QueryNode::Limit(count) => Constraint::Limit { count: *count },
            QueryNode::StartAt { values, inclusive } => {
                let values = values.clone();
                if *inclusive {
                    Constraint::StartAt { values }
                } else {
                    Constraint::StartAfter { values }
                }
            }
            QueryNode::EndAt { values, inclusive } => {
                let values = values.clone();
                if *inclusive {
                    Constraint::EndAt { values }
                } else {
                    Constraint::EndBefore { values }
                }
            }
        };
        Ok(Some(constraint))
    }
}

fn check_disjunction(field: &str, op: FilterOp, value: &Value) -> Result<(), QueryError> {
    if !op.is_disjunctive() {
        return Ok(());
    }
    let values = value.as_array().ok_or_else(|| QueryError::ExpectedArray {
        field: field.to_string(),
        op,
    })?;
    if values.len() > MAX_DISJUNCTION_VALUES {
        return Err(QueryError::TooManyValues {
            field: field.to_string(),
            op,
            count: values.len(),
            max: MAX_DISJUNCTION_VALUES,
        });
    }
    Ok(())
}

/// A query under construction.
///
/// Nodes are only ever appended: every transition consumes the query and
/// returns it in the state of the new leaf, and the state decides which
/// transitions come next. Clone a query to branch it.
pub struct Query<S = state::Start> {
    nodes: Vec<QueryNode>,
    _state: PhantomData<fn() -> S>,
}

impl Query<state::Start> {
    pub fn new() -> Self {
        Self {
            nodes: vec![QueryNode::Start],
            _state: PhantomData,
        }
    }
}

impl Default for Query<state::Start> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for Query<S> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            _state: PhantomData,
        }
    }
}

impl<S> fmt::Debug for Query<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("state", &std::any::type_name::<S>())
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<S> Query<S> {
    fn push<N>(mut self, node: QueryNode) -> Query<N> {
        self.nodes.push(node);
        Query {
            nodes: self.nodes,
            _state: PhantomData,
        }
    }

    /// All nodes from root to leaf.
    pub fn nodes(&self) -> &[QueryNode] {
        &self.nodes
    }

    pub fn leaf(&self) -> &QueryNode {
        // `new` seeds the root and nodes are never removed.
        self.nodes.last().unwrap_or(&QueryNode::Start)
    }

    /// Flattens the chain into constraints, in declaration order.
    pub fn to_constraints(&self) -> Result<Vec<Constraint>, QueryError> {
        let mut constraints = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if let Some(constraint) = node.to_constraint()? {
                constraints.push(constraint);
            }
        }
        Ok(constraints)
    }

    /// Like [`to_constraints`](Self::to_constraints), with model field names
    /// replaced by the document keys `metadata` maps them to.
    pub fn to_constraints_for(&self, metadata: &TypeMetadata) -> Result<Vec<Constraint>, QueryError> {
        let mut constraints = self.to_constraints()?;
        for constraint in &mut constraints {
            let key = constraint
                .field()
                .and_then(|field| metadata.document_key_for(field))
                .map(str::to_string);
            if let Some(key) = key {
                constraint.rename_field(key);
            }
        }
        Ok(constraints)
    }
}

impl<S: Filterable> Query<S> {
    pub fn where_(self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Query<state::Where> {
        self.push(QueryNode::Where {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Query<state::Where> {
        self.where_(field, FilterOp::Equal, value)
    }

    pub fn order_by(self, field: impl Into<String>, direction: Direction) -> Query<state::OrderBy> {
        self.push(QueryNode::OrderBy {
            field: field.into(),
            direction,
        })
    }
}

impl<S: StartBoundable> Query<S> {
    pub fn start_at<I, V>(self, values: I) -> Query<state::StartAt>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(QueryNode::StartAt {
            values: values.into_iter().map(Into::into).collect(),
            inclusive: true,
        })
    }

    pub fn start_after<I, V>(self, values: I) -> Query<state::StartAt>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(QueryNode::StartAt {
            values: values.into_iter().map(Into::into).collect(),
            inclusive: false,
        })
    }
}

impl<S: EndBoundable> Query<S> {
    pub fn end_at<I, V>(self, values: I) -> Query<state::EndAt>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(QueryNode::EndAt {
            values: values.into_iter().map(Into::into).collect(),
            inclusive: true,
        })
    }

    pub fn end_before<I, V>(self, values: I) -> Query<state::EndAt>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(QueryNode::EndAt {
            values: values.into_iter().map(Into::into).collect(),
            inclusive: false,
        })
    }
}

impl<S: Limitable> Query<S> {
    pub fn limit(self, count: usize) -> Query<state::Limit> {
        self.push(QueryNode::Limit(count))
    }
}
