//! Document store trait.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ClientResult;
use crate::normalizer::Hit;
use crate::types::{BulkOutcome, WriteResult};

/// Single and batched writes, reads and deletes of documents addressed by
/// index name and key.
///
/// Documents are borrowed and serialized for transmission; the caller's value
/// is never modified.
///
/// # Bulk semantics
///
/// Batch operations send one request. Items the engine rejects are reported
/// individually in the returned [`BulkOutcome`] while the remaining items are
/// still applied. The batch is never rolled back.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Writes one document. When `key` is `None` the engine assigns one,
    /// returned in [`WriteResult::id`].
    async fn add<T>(
        &self,
        index: &str,
        document: &T,
        key: Option<&str>,
    ) -> ClientResult<WriteResult>
    where
        T: Serialize + Sync;

    /// Merges `partial` into the document at `key`.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotFound` - If no document exists at `key`
    async fn update<T>(&self, index: &str, key: &str, partial: &T) -> ClientResult<WriteResult>
    where
        T: Serialize + Sync;

    /// Reads the document at `key`.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotFound` - If the index or the document does not exist
    /// * `ClientError::Serialization` - If the source does not decode as `T`
    async fn get<T>(&self, index: &str, key: &str) -> ClientResult<Hit<T>>
    where
        T: DeserializeOwned + Send;

    /// Returns the documents of an unfiltered search.
    ///
    /// Only the engine's default window (10 hits) is returned. Use
    /// [`QueryProvider::execute`](crate::core::QueryProvider::execute) with an
    /// explicit [`PageRequest`](crate::query::PageRequest) to read more.
    async fn get_all<T>(&self, index: &str) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send;

    /// Returns the keys of an unfiltered search, with the same default window
    /// as [`get_all`](Self::get_all).
    async fn get_all_ids(&self, index: &str) -> ClientResult<Vec<String>>;

    /// Deletes the document at `key`. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// * `ClientError::NotFound` - If the index does not exist
    async fn delete(&self, index: &str, key: &str) -> ClientResult<bool>;

    /// Deletes the documents returned by [`get_all_ids`](Self::get_all_ids).
    ///
    /// This is two requests, not one atomic operation. A document written
    /// between them is not deleted, and only the default window of keys is
    /// collected per call. Returns false if any delete item failed.
    async fn delete_all(&self, index: &str) -> ClientResult<bool> {
        let ids = self.get_all_ids(index).await?;
        let outcome = self.batch_delete(index, &ids).await?;
        Ok(outcome.is_success())
    }

    /// Writes documents with engine-assigned keys.
    async fn batch_add<T>(&self, index: &str, documents: &[T]) -> ClientResult<BulkOutcome>
    where
        T: Serialize + Sync;

    /// Writes documents under caller-supplied keys.
    async fn batch_add_keyed<T>(
        &self,
        index: &str,
        documents: &[(String, T)],
    ) -> ClientResult<BulkOutcome>
    where
        T: Serialize + Sync;

    /// Deletes the documents at `keys`.
    async fn batch_delete(&self, index: &str, keys: &[String]) -> ClientResult<BulkOutcome>;
}
