//! # helios-search
//!
//! Typed client for Elasticsearch and OpenSearch clusters.
//!
//! This crate covers the four things an application usually needs from a
//! search engine:
//!
//! - **Index lifecycle** - create (with a typed or raw mapping), delete,
//!   inspect, refresh and flush indices
//! - **Documents** - add, update, get and delete single documents, plus bulk
//!   writes that report per-item failures instead of failing the batch
//! - **Queries** - an immutable [`Query`] tree covering the common Query DSL
//!   clauses, with pagination, sort, highlight and histogram aggregation
//! - **Results** - typed [`SearchResponse`] decoding and the
//!   [`normalizer`] helpers that turn it into sources, ids, highlights or
//!   buckets
//!
//! ## Connecting
//!
//! ```no_run
//! use helios_search::{ConnectionConfig, SearchClient};
//!
//! let config = ConnectionConfig::from_hosts("localhost:9200", "http")
//!     .with_basic_auth("elastic", "changeme")
//!     .with_request_timeout_ms(10_000);
//! let client = SearchClient::new(config)?;
//! # Ok::<(), helios_search::ClientError>(())
//! ```
//!
//! ## Mappings and queries
//!
//! ```
//! use helios_search::query::{PageRequest, Query, SearchRequest, SortOrder};
//! use helios_search::types::{Property, TypeMapping};
//!
//! let mapping = TypeMapping::new()
//!     .with_property("id", Property::long())
//!     .with_property("productName", Property::text().with_analyzer("standard"))
//!     .with_property("sku", Property::keyword());
//! assert!(mapping.property("sku").is_some());
//!
//! let request = SearchRequest::new(Query::match_text("productName", "android"))
//!     .with_page(PageRequest::new(0, 10).sorted_by("id", SortOrder::Desc));
//! let body = request.to_body();
//! assert_eq!(body["size"], 10);
//! assert_eq!(body["sort"][0]["id"]["order"], "desc");
//! ```
//!
//! ## Using the client
//!
//! ```ignore
//! use helios_search::{DocumentStore, IndexLifecycle, QueryProvider};
//!
//! client.create_index("product", Some(&mapping)).await?;
//! let outcome = client.batch_add("product", &products).await?;
//! for failure in outcome.failures() {
//!     eprintln!("item {} failed", failure.position);
//! }
//! client.refresh("product").await?;
//!
//! let found: Vec<Product> = client
//!     .execute("product", &Query::match_text("productName", "android"), &PageRequest::new(0, 10))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
pub mod config;
pub mod core;
pub mod error;
pub mod normalizer;
pub mod query;
pub mod types;

#[cfg(test)]
pub(crate) mod test_log;

// Re-export commonly used types at crate root
pub use backend::SearchClient;
pub use config::{ConnectionAuth, ConnectionConfig, TlsConfig};
pub use error::{ClientError, ClientResult};
pub use normalizer::{Hit, HistogramBucket, SearchResponse};
pub use query::{
    ChildScoreMode, Highlight, HistogramAggregation, PageRequest, Query, SearchRequest, SortOrder,
};
pub use types::{BulkOutcome, Property, TypeMapping};

// Re-export core traits
pub use core::{ClusterInspector, DocumentStore, IndexLifecycle, QueryProvider};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
