//! Request and response value types.
//!
//! - [`TypeMapping`], [`Property`] - Field mapping schema
//! - [`BulkOutcome`] - Per-item result of a bulk request
//! - [`ShardStatistics`] - Shard counts of refresh/flush
//! - [`WriteResult`], [`IndexInfo`] - Single-document writes and index details
//! - [`IndexRecord`], [`NodeRecord`] - `_cat` rows

mod bulk;
mod cat;
mod document;
mod mapping;
mod shards;

pub use bulk::{BulkItem, BulkItemError, BulkOutcome};
pub use cat::{IndexRecord, NodeRecord};
pub use document::{IndexInfo, WriteResult};
pub use mapping::{FieldType, Property, TypeMapping};
pub use shards::ShardStatistics;
