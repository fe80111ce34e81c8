//! Query abstraction layer.
//!
//! - [`Query`] - Immutable query expression tree rendered to Query DSL
//! - [`SearchRequest`] - Query plus pagination, sort, highlight and aggregation
//!
//! Requests are executed through [`QueryProvider`](crate::core::QueryProvider)
//! and their responses interpreted by the [`normalizer`](crate::normalizer).

mod dsl;
mod request;

pub use dsl::{ChildScoreMode, Query};
pub use request::{
    Highlight, HistogramAggregation, PageRequest, SearchRequest, SortField, SortOrder,
};
