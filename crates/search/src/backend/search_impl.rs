//! QueryProvider implementation.

use async_trait::async_trait;
use elasticsearch::{CountParts, GetParts, SearchParts};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::core::QueryProvider;
use crate::error::{ClientError, ClientResult, NotFoundError};
use crate::normalizer::{self, Hit, SearchResponse};
use crate::query::{Query, SearchRequest};

use super::client::{
    SearchClient, decode, ensure_success, missing_field, read_json, send_error, validate_index,
};

#[async_trait]
impl QueryProvider for SearchClient {
    async fn search<T>(
        &self,
        index: &str,
        request: &SearchRequest,
    ) -> ClientResult<SearchResponse<T>>
    where
        T: DeserializeOwned + Send,
    {
        validate_index("search", index)?;

        let body = request.to_body();
        tracing::debug!(index, query = request.query.kind(), "search: {}", body);

        let response = self
            .client()
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await
            .map_err(|e| send_error("search", index, None, e))?;

        let response = ensure_success("search", index, None, response).await?;
        let body = read_json("search", index, None, response).await?;
        let response: SearchResponse<T> = normalizer::decode_response("search", index, body)?;

        if response.timed_out {
            tracing::warn!(
                index,
                took_ms = response.took,
                "search timed out, results are partial"
            );
        }
        Ok(response)
    }

    async fn count(&self, index: &str, query: &Query) -> ClientResult<u64> {
        validate_index("count", index)?;

        let response = self
            .client()
            .count(CountParts::Index(&[index]))
            .body(json!({ "query": query.to_dsl() }))
            .send()
            .await
            .map_err(|e| send_error("count", index, None, e))?;

        let response = ensure_success("count", index, None, response).await?;
        let body = read_json("count", index, None, response).await?;
        body.get("count")
            .and_then(|c| c.as_u64())
            .ok_or_else(|| missing_field("count", index, None, "count"))
    }

    async fn search_by_id<T>(&self, index: &str, key: &str) -> ClientResult<Option<Hit<T>>>
    where
        T: DeserializeOwned + Send,
    {
        validate_index("search by id", index)?;

        let response = self
            .client()
            .get(GetParts::IndexId(index, key))
            .send()
            .await
            .map_err(|e| send_error("search by id", index, Some(key), e))?;

        match ensure_success("search by id", index, Some(key), response).await {
            Ok(response) => {
                let body = read_json("search by id", index, Some(key), response).await?;
                decode("search by id", index, Some(key), body).map(Some)
            }
            Err(ClientError::NotFound(NotFoundError::Document { .. })) => {
                tracing::debug!("Document '{}' not found in '{}'", key, index);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
