//! Query execution trait.

use async_trait::async_trait;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::error::ClientResult;
use crate::normalizer::{self, HighlightFields, HistogramBucket, Hit, SearchResponse};
use crate::query::{Highlight, HistogramAggregation, PageRequest, Query, SearchRequest};

/// Runs queries and interprets their results.
///
/// Only [`search`](Self::search), [`count`](Self::count) and
/// [`search_by_id`](Self::search_by_id) talk to the engine directly; the other
/// operations shape a [`SearchRequest`] and pass the response through the
/// [`normalizer`].
#[async_trait]
pub trait QueryProvider: Send + Sync {
    /// Executes a search and decodes hit sources as `T`.
    async fn search<T>(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> ClientResult<SearchResponse<T>>
    where
        T: DeserializeOwned + Send;

    /// Counts the documents matching `query`.
    async fn count(&self, index: &str, query: &Query) -> ClientResult<u64>;

    /// Reads one document by key. A missing document is `Ok(None)`, not an
    /// error; a missing index is still `ClientError::NotFound`.
    async fn search_by_id<T>(&self, index: &str, key: &str) -> ClientResult<Option<Hit<T>>>
    where
        T: DeserializeOwned + Send;

    /// Executes `query` with the given window and sort, returning payloads in
    /// the requested order.
    async fn execute<T>(
        &self,
        index: &str,
        query: &Query,
        page: &PageRequest,
    ) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        let request = SearchRequest::new(query.clone()).with_page(page.clone());
        let response = self.search::<T>(index, &request).await?;
        Ok(normalizer::extract_sources(response))
    }

    /// Buckets documents matching `search_text` on `search_field` into a
    /// histogram over `aggs_field`. No hits are returned.
    async fn aggs_by_histogram(
        &self,
        index: &str,
        search_text: &str,
        search_field: &str,
        aggs_field: &str,
        aggs_key: &str,
        interval: f64,
    ) -> ClientResult<Vec<HistogramBucket>> {
        let request = SearchRequest::aggregation_only(
            Query::match_text(search_field, search_text),
            aggs_key,
            HistogramAggregation::new(aggs_field, interval),
        );
        let response = self.search::<IgnoredAny>(index, &request).await?;
        normalizer::extract_histogram(&response, aggs_key)
    }

    /// Executes `query` with highlighting and returns the fragments of each
    /// hit, in the requested order.
    async fn highlight_query(
        &self,
        index: &str,
        query: &Query,
        highlight: &Highlight,
        page: &PageRequest,
    ) -> ClientResult<Vec<HighlightFields>> {
        let request = SearchRequest::new(query.clone())
            .with_page(page.clone())
            .with_highlight(highlight.clone());
        let response = self.search::<IgnoredAny>(index, &request).await?;
        Ok(normalizer::extract_highlights(&response))
    }
}
