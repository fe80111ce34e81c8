//! DocumentStore implementation.

use async_trait::async_trait;
use elasticsearch::http::request::JsonBody;
use elasticsearch::{BulkParts, DeleteParts, GetParts, IndexParts, UpdateParts};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde_json::{Value, json};

use crate::core::{DocumentStore, QueryProvider};
use crate::error::{ClientResult, SerializationError};
use crate::normalizer::{self, Hit};
use crate::query::{Query, SearchRequest};
use crate::types::{BulkOutcome, WriteResult};

use super::client::{
    SearchClient, classify_failure, decode, ensure_success, read_json, send_error, validate_index,
};

/// Serializes a caller document for transmission.
fn encode<T: Serialize>(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    document: &T,
) -> ClientResult<Value> {
    serde_json::to_value(document).map_err(|source| {
        tracing::error!(operation, index, id, "failed to encode document: {}", source);
        SerializationError::Encode {
            what: "document",
            source,
        }
        .into()
    })
}

impl SearchClient {
    /// Sends one `_bulk` request and reports its per-item outcome.
    async fn send_bulk(
        &self,
        operation: &'static str,
        index: &str,
        lines: Vec<JsonBody<Value>>,
    ) -> ClientResult<BulkOutcome> {
        let response = self
            .client()
            .bulk(BulkParts::Index(index))
            .body(lines)
            .send()
            .await
            .map_err(|e| send_error(operation, index, None, e))?;

        let response = ensure_success(operation, index, None, response).await?;
        let body = read_json(operation, index, None, response).await?;
        let outcome = BulkOutcome::from_response(operation, index, &body)?;

        for item in outcome.failures() {
            if let Some(ref error) = item.error {
                tracing::error!(
                    operation,
                    index,
                    position = item.position,
                    id = item.id.as_deref(),
                    error_type = %error.error_type,
                    "bulk item failed: {}",
                    error.reason
                );
            }
        }

        tracing::debug!(
            operation,
            index,
            items = outcome.items.len(),
            failed = outcome.failed,
            "bulk completed"
        );
        Ok(outcome)
    }
}

#[async_trait]
impl DocumentStore for SearchClient {
    async fn add<T>(
        &self,
        index: &str,
        document: &T,
        key: Option<&str>,
    ) -> ClientResult<WriteResult>
    where
        T: Serialize + Sync,
    {
        validate_index("add document", index)?;
        let body = encode("add document", index, key, document)?;

        let parts = match key {
            Some(id) => IndexParts::IndexId(index, id),
            None => IndexParts::Index(index),
        };
        let response = self
            .client()
            .index(parts)
            .body(body)
            .send()
            .await
            .map_err(|e| send_error("add document", index, key, e))?;

        let response = ensure_success("add document", index, key, response).await?;
        let body = read_json("add document", index, key, response).await?;
        let result: WriteResult = decode("add document", index, key, body)?;

        tracing::debug!(
            "Indexed document '{}' in '{}' ({})",
            result.id,
            index,
            result.result
        );
        Ok(result)
    }

    async fn update<T>(&self, index: &str, key: &str, partial: &T) -> ClientResult<WriteResult>
    where
        T: Serialize + Sync,
    {
        validate_index("update document", index)?;
        let body = json!({ "doc": encode("update document", index, Some(key), partial)? });

        let response = self
            .client()
            .update(UpdateParts::IndexId(index, key))
            .body(body)
            .send()
            .await
            .map_err(|e| send_error("update document", index, Some(key), e))?;

        let response = ensure_success("update document", index, Some(key), response).await?;
        let body = read_json("update document", index, Some(key), response).await?;
        let result: WriteResult = decode("update document", index, Some(key), body)?;

        tracing::debug!(
            "Updated document '{}' in '{}' ({}, version {})",
            key,
            index,
            result.result,
            result.version
        );
        Ok(result)
    }

    async fn get<T>(&self, index: &str, key: &str) -> ClientResult<Hit<T>>
    where
        T: DeserializeOwned + Send,
    {
        validate_index("get document", index)?;

        let response = self
            .client()
            .get(GetParts::IndexId(index, key))
            .send()
            .await
            .map_err(|e| send_error("get document", index, Some(key), e))?;

        let response = ensure_success("get document", index, Some(key), response).await?;
        let body = read_json("get document", index, Some(key), response).await?;
        decode("get document", index, Some(key), body)
    }

    async fn get_all<T>(&self, index: &str) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned + Send,
    {
        validate_index("get all documents", index)?;

        let request = SearchRequest::new(Query::match_all());
        let response = self.search::<T>(index, &request).await?;
        Ok(normalizer::extract_sources(response))
    }

    async fn get_all_ids(&self, index: &str) -> ClientResult<Vec<String>> {
        validate_index("get all ids", index)?;

        let request = SearchRequest::new(Query::match_all());
        let response = self.search::<IgnoredAny>(index, &request).await?;
        Ok(normalizer::extract_ids(&response))
    }

    async fn delete(&self, index: &str, key: &str) -> ClientResult<bool> {
        validate_index("delete document", index)?;

        let response = self
            .client()
            .delete(DeleteParts::IndexId(index, key))
            .send()
            .await
            .map_err(|e| send_error("delete document", index, Some(key), e))?;

        let status = response.status_code();
        if status.is_success() {
            tracing::debug!("Deleted document '{}' from '{}'", key, index);
            return Ok(true);
        }

        let body = response.text().await.unwrap_or_default();
        let not_found = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("result").and_then(|r| r.as_str()).map(|r| r == "not_found"))
            .unwrap_or(false);
        if not_found {
            tracing::warn!("Document '{}' not found in '{}', nothing deleted", key, index);
            return Ok(false);
        }

        Err(classify_failure(
            "delete document",
            index,
            Some(key),
            status.as_u16(),
            &body,
        ))
    }

    async fn batch_add<T>(&self, index: &str, documents: &[T]) -> ClientResult<BulkOutcome>
    where
        T: Serialize + Sync,
    {
        validate_index("batch add", index)?;
        if documents.is_empty() {
            tracing::debug!("Empty batch for '{}', nothing sent", index);
            return Ok(BulkOutcome::empty());
        }

        let mut lines = Vec::with_capacity(documents.len() * 2);
        for document in documents {
            lines.push(JsonBody::new(json!({ "index": {} })));
            lines.push(JsonBody::new(encode("batch add", index, None, document)?));
        }

        self.send_bulk("batch add", index, lines).await
    }

    async fn batch_add_keyed<T>(
        &self,
        index: &str,
        documents: &[(String, T)],
    ) -> ClientResult<BulkOutcome>
    where
        T: Serialize + Sync,
    {
        validate_index("batch add", index)?;
        if documents.is_empty() {
            tracing::debug!("Empty batch for '{}', nothing sent", index);
            return Ok(BulkOutcome::empty());
        }

        let mut lines = Vec::with_capacity(documents.len() * 2);
        for (key, document) in documents {
            lines.push(JsonBody::new(json!({ "index": { "_id": key } })));
            lines.push(JsonBody::new(encode("batch add", index, Some(key), document)?));
        }

        self.send_bulk("batch add", index, lines).await
    }

    async fn batch_delete(&self, index: &str, keys: &[String]) -> ClientResult<BulkOutcome> {
        validate_index("batch delete", index)?;
        if keys.is_empty() {
            tracing::debug!("Empty batch for '{}', nothing sent", index);
            return Ok(BulkOutcome::empty());
        }

        let lines = keys
            .iter()
            .map(|key| JsonBody::new(json!({ "delete": { "_id": key } })))
            .collect();

        self.send_bulk("batch delete", index, lines).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionConfig;
    use crate::error::{ClientError, ConfigError};
    use crate::test_log::capture_events;

    fn offline_client() -> SearchClient {
        // Nothing listens on this port; any request would fail.
        let config = ConnectionConfig {
            nodes: vec!["http://127.0.0.1:1".to_string()],
            request_timeout_ms: 2000,
            ..Default::default()
        };
        SearchClient::new(config).unwrap()
    }

    #[derive(Serialize)]
    struct Sku {
        id: u64,
        #[serde(rename = "skuName")]
        sku_name: String,
    }

    #[test]
    fn test_encode_document() {
        let sku = Sku {
            id: 1,
            sku_name: "phone".to_string(),
        };
        let value = encode("add document", "sku", None, &sku).unwrap();
        assert_eq!(value, json!({ "id": 1, "skuName": "phone" }));
    }

    #[test]
    fn test_encode_rejects_non_string_map_keys() {
        let mut document = std::collections::HashMap::new();
        document.insert(vec![1u8], "x");
        let (events, _guard) = capture_events();

        let err = encode("add document", "sku", Some("7"), &document).unwrap_err();
        assert!(err.to_string().contains("failed to encode document"));

        let errors = events.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("operation"), Some("add document"));
        assert_eq!(errors[0].field("index"), Some("sku"));
        assert_eq!(errors[0].field("id"), Some("7"));
    }

    #[tokio::test]
    async fn test_empty_batches_send_nothing() {
        let client = offline_client();

        let outcome = client.batch_add::<Sku>("sku", &[]).await.unwrap();
        assert!(outcome.is_success());
        assert!(outcome.items.is_empty());

        let outcome = client.batch_add_keyed::<Sku>("sku", &[]).await.unwrap();
        assert!(outcome.is_success());

        let outcome = client.batch_delete("sku", &[]).await.unwrap();
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_transport_error() {
        let client = offline_client();

        let sku = Sku {
            id: 1,
            sku_name: "phone".to_string(),
        };
        let err = client.add("sku", &sku, None).await.unwrap_err();
        assert!(err.is_transport());
    }

    fn assert_invalid_index(err: ClientError) {
        assert!(
            matches!(err, ClientError::Config(ConfigError::InvalidIndexName { .. })),
            "expected an invalid index name error, got {:?}",
            err
        );
    }

    #[tokio::test]
    async fn test_empty_index_is_rejected_before_sending() {
        let client = offline_client();
        let sku = Sku {
            id: 1,
            sku_name: "phone".to_string(),
        };

        assert_invalid_index(client.add("", &sku, None).await.unwrap_err());
        assert_invalid_index(client.update("", "1", &sku).await.unwrap_err());
        assert_invalid_index(client.get::<Value>("", "1").await.unwrap_err());
        assert_invalid_index(client.get_all::<Value>("").await.unwrap_err());
        assert_invalid_index(client.get_all_ids("").await.unwrap_err());
        assert_invalid_index(client.delete("", "1").await.unwrap_err());
        assert_invalid_index(client.delete_all("").await.unwrap_err());
    }

    #[tokio::test]
    async fn test_empty_batches_still_validate_the_index() {
        let client = offline_client();

        assert_invalid_index(client.batch_add::<Sku>("", &[]).await.unwrap_err());
        assert_invalid_index(client.batch_add_keyed::<Sku>("", &[]).await.unwrap_err());
        assert_invalid_index(client.batch_delete("", &[]).await.unwrap_err());
        assert_invalid_index(client.batch_delete("", &["x".to_string()]).await.unwrap_err());
    }
}
