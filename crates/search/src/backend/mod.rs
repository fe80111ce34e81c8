//! Elasticsearch/OpenSearch implementation of the core traits.
//!
//! [`SearchClient`] wraps one `elasticsearch` client and implements
//! [`IndexLifecycle`](crate::core::IndexLifecycle),
//! [`DocumentStore`](crate::core::DocumentStore),
//! [`QueryProvider`](crate::core::QueryProvider) and
//! [`ClusterInspector`](crate::core::ClusterInspector).
//!
//! Every failure is logged with its operation, index and document key before
//! it is returned. Nothing is retried.

mod client;
mod cluster;
mod documents;
mod indices;
mod search_impl;

pub use client::SearchClient;
