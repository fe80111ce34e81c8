//! Core client traits.
//!
//! - [`IndexLifecycle`] - Index creation, deletion, mappings, refresh and flush
//! - [`DocumentStore`] - Document CRUD and bulk writes
//! - [`QueryProvider`] - Query execution and result extraction
//! - [`ClusterInspector`] - Node listing
//!
//! [`SearchClient`](crate::SearchClient) implements all four against an
//! Elasticsearch or OpenSearch cluster. Code that only needs one capability
//! can take it as a generic bound:
//!
//! ```ignore
//! use helios_search::core::{DocumentStore, QueryProvider};
//! use helios_search::query::{PageRequest, Query, SortOrder};
//!
//! async fn newest<S: QueryProvider>(store: &S) -> ClientResult<Vec<Product>> {
//!     store
//!         .execute(
//!             "product",
//!             &Query::match_all(),
//!             &PageRequest::new(0, 3).sorted_by("id", SortOrder::Desc),
//!         )
//!         .await
//! }
//! ```

mod cluster;
mod document;
mod index;
mod query;

pub use cluster::ClusterInspector;
pub use document::DocumentStore;
pub use index::IndexLifecycle;
pub use query::QueryProvider;
