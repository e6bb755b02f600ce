//! Query - an append-only chain of typed query nodes.
//!
//! Each node's state decides what may follow it, so `limit(..).where_(..)`
//! does not compile. A finished chain flattens into [`Constraint`]s.

mod chain;
mod constraint;

use std::fmt;

pub use chain::{Query, QueryNode};
pub use constraint::{Constraint, Direction, FilterOp};

/// Most alternatives an `in`, `not-in` or `array-contains-any` clause accepts.
pub const MAX_DISJUNCTION_VALUES: usize = 30;

/// States a [`Query`] can be in, named after the node at its leaf.
///
/// Cursors only follow a filter or an ordering:
///
/// ```compile_fail
/// docmap::Query::new().start_at([1]);
/// ```
///
/// ```compile_fail
/// use docmap::Direction;
/// docmap::Query::new().order_by("age", Direction::Asc).start_at([1]).end_at([5]);
/// ```
///
/// Nothing follows a limit:
///
/// ```compile_fail
/// docmap::Query::new().limit(1).where_eq("active", true);
/// ```
///
/// ```
/// use docmap::Direction;
/// let page = docmap::Query::new()
///     .where_eq("active", true)
///     .order_by("age", Direction::Asc)
///     .start_after([30])
///     .limit(10);
/// assert_eq!(page.to_constraints().unwrap().len(), 4);
/// ```
pub mod state {
    mod sealed {
        pub trait Sealed {}
    }

    /// Freshly created, no clause yet.
    #[derive(Debug)]
    pub enum Start {}
    #[derive(Debug)]
    pub enum Where {}
    #[derive(Debug)]
    pub enum OrderBy {}
    /// Terminal.
    #[derive(Debug)]
    pub enum Limit {}
    /// After `start_at` or `start_after`.
    #[derive(Debug)]
    pub enum StartAt {}
    /// After `end_at` or `end_before`.
    #[derive(Debug)]
    pub enum EndAt {}

    /// States that accept `where_` and `order_by`.
    pub trait Filterable: sealed::Sealed {}
    /// States that accept `start_at` and `start_after`.
    pub trait StartBoundable: sealed::Sealed {}
    /// States that accept `end_at` and `end_before`.
    pub trait EndBoundable: sealed::Sealed {}
    /// States that accept `limit`.
    pub trait Limitable: sealed::Sealed {}

    impl sealed::Sealed for Start {}
    impl sealed::Sealed for Where {}
    impl sealed::Sealed for OrderBy {}
    impl sealed::Sealed for Limit {}
    impl sealed::Sealed for StartAt {}
    impl sealed::Sealed for EndAt {}

    impl Filterable for Start {}
    impl Filterable for Where {}
    impl Filterable for OrderBy {}

    impl StartBoundable for Where {}
    impl StartBoundable for OrderBy {}

    impl EndBoundable for Where {}
    impl EndBoundable for OrderBy {}

    impl Limitable for Start {}
    impl Limitable for Where {}
    impl Limitable for OrderBy {}
    impl Limitable for StartAt {}
    impl Limitable for EndAt {}
}

/// A chain that cannot be turned into constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A disjunctive clause lists more alternatives than stores accept.
    TooManyValues {
        field: String,
        op: FilterOp,
        count: usize,
        max: usize,
    },
    /// A disjunctive clause was given a single value instead of a list.
    ExpectedArray { field: String, op: FilterOp },
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::TooManyValues {
                field,
                op,
                count,
                max,
            } => write!(
                f,
                "`{}` {} lists {} values, at most {} are allowed",
                field, op, count, max
            ),
            QueryError::ExpectedArray { field, op } => {
                write!(f, "`{}` {} expects an array of values", field, op)
            }
        }
    }
}

impl std::error::Error for QueryError {}
