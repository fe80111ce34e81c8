//! Index lifecycle trait.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::types::{IndexInfo, IndexRecord, TypeMapping};

/// Creation, deletion and inspection of indices.
///
/// # Idempotent create
///
/// [`create_index`](Self::create_index) deletes an existing index of the same
/// name before creating it. Documents stored under that name do not survive
/// a create. The existence check and the delete are separate requests, so a
/// concurrent caller can still race between them.
#[async_trait]
pub trait IndexLifecycle: Send + Sync {
    /// Returns true if the index exists.
    ///
    /// # Errors
    ///
    /// * `ClientError::Transport` - If the engine could not be reached
    async fn index_exists(&self, index: &str) -> ClientResult<bool>;

    /// Creates the index, replacing any existing index of the same name.
    ///
    /// Returns true if the engine acknowledged the creation.
    async fn create_index(
        &self,
        index: &str,
        mapping: Option<&TypeMapping>,
    ) -> ClientResult<bool>;

    /// Creates the index from a mapping given as a JSON string.
    ///
    /// The string is parsed as JSON and sent as the `mappings` body without
    /// further checks. Same replace-on-create behaviour as
    /// [`create_index`](Self::create_index).
    ///
    /// # Errors
    ///
    /// * `ClientError::Serialization` - If `mapping_json` is not JSON
    async fn create_with_raw_mapping(
        &self,
        index: &str,
        mapping_json: &str,
    ) -> ClientResult<bool>;

    /// Deletes the index.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotFound` - If the index does not exist
    async fn delete_index(&self, index: &str) -> ClientResult<bool>;

    /// Returns the field mapping of one index.
    async fn get_mapping(&self, index: &str) -> ClientResult<TypeMapping>;

    /// Returns the field mapping of every index, keyed by index name.
    async fn get_all_mappings(&self) -> ClientResult<BTreeMap<String, TypeMapping>>;

    /// Returns aliases, mappings and settings of one index.
    async fn describe_index(&self, index: &str) -> ClientResult<IndexInfo>;

    /// Lists every index with its health, document count and size.
    async fn list_indices(&self) -> ClientResult<Vec<IndexRecord>>;

    /// Makes recent writes visible to search.
    ///
    /// Returns false only if every targeted shard failed. A partial shard
    /// failure is logged and reported as success.
    async fn refresh(&self, index: &str) -> ClientResult<bool>;

    /// Persists the index to disk. Same shard rule as [`refresh`](Self::refresh).
    async fn flush(&self, index: &str) -> ClientResult<bool>;
}
