//! IndexLifecycle implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use elasticsearch::cat::CatIndicesParts;
use elasticsearch::indices::{
    IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesFlushParts,
    IndicesGetMappingParts, IndicesGetParts, IndicesRefreshParts,
};
use serde_json::{Map, Value, json};

use crate::core::IndexLifecycle;
use crate::error::{ClientResult, SerializationError};
use crate::types::{IndexInfo, IndexRecord, ShardStatistics, TypeMapping};

use super::client::{
    SearchClient, acknowledged, classify_failure, decode, ensure_success, missing_field,
    read_json, send_error, validate_index,
};

impl SearchClient {
    /// Index settings applied on creation.
    fn index_settings(&self) -> Map<String, Value> {
        let mut settings = Map::new();
        if let Some(shards) = self.config().number_of_shards {
            settings.insert("number_of_shards".to_string(), json!(shards));
        }
        if let Some(replicas) = self.config().number_of_replicas {
            settings.insert("number_of_replicas".to_string(), json!(replicas));
        }
        settings
    }

    /// Deletes `index` if present, then creates it with `mappings`.
    async fn recreate_index(&self, index: &str, mappings: Option<Value>) -> ClientResult<bool> {
        if self.index_exists(index).await? {
            tracing::info!("Index '{}' already exists, deleting it before create", index);
            self.delete_index(index).await?;
        }

        let mut body = json!({});
        if let Some(mappings) = mappings {
            body["mappings"] = mappings;
        }
        let settings = self.index_settings();
        if !settings.is_empty() {
            body["settings"] = Value::Object(settings);
        }

        let response = self
            .client()
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await
            .map_err(|e| send_error("create index", index, None, e))?;

        let response = ensure_success("create index", index, None, response).await?;
        let body = read_json("create index", index, None, response).await?;
        let created = acknowledged("create index", index, &body)?;

        tracing::info!("Created index '{}' (acknowledged: {})", index, created);
        Ok(created)
    }

    /// Sends a refresh or flush and collapses the shard counts.
    async fn broadcast(&self, kind: Broadcast, index: &str) -> ClientResult<bool> {
        let operation = kind.as_str();
        validate_index(operation, index)?;

        let indices = self.client().indices();
        let sent = match kind {
            Broadcast::Refresh => {
                indices
                    .refresh(IndicesRefreshParts::Index(&[index]))
                    .send()
                    .await
            }
            Broadcast::Flush => indices.flush(IndicesFlushParts::Index(&[index])).send().await,
        };
        let response = sent.map_err(|e| send_error(operation, index, None, e))?;

        let response = ensure_success(operation, index, None, response).await?;
        let body = read_json(operation, index, None, response).await?;
        let shards = ShardStatistics::from_response(operation, index, &body)?;

        tracing::debug!(
            operation,
            index,
            total = shards.total,
            successful = shards.successful,
            failed = shards.failed,
            "broadcast completed"
        );
        Ok(shards.collapse(operation, index))
    }
}

#[derive(Debug, Clone, Copy)]
enum Broadcast {
    Refresh,
    Flush,
}

impl Broadcast {
    fn as_str(self) -> &'static str {
        match self {
            Broadcast::Refresh => "refresh",
            Broadcast::Flush => "flush",
        }
    }
}

/// Picks the entry for `index` out of a response keyed by index name.
///
/// When `index` is an alias the response is keyed by the concrete index, so
/// the single entry is used instead.
fn index_entry(operation: &'static str, index: &str, body: Value) -> ClientResult<Value> {
    let Value::Object(mut entries) = body else {
        return Err(missing_field(operation, index, None, index));
    };

    if let Some(entry) = entries.remove(index) {
        return Ok(entry);
    }
    if entries.len() == 1
        && let Some((_, entry)) = entries.into_iter().next()
    {
        return Ok(entry);
    }
    Err(missing_field(operation, index, None, index))
}

/// Reads the `mappings` object of one index entry. Indices without fields
/// answer with an empty object.
fn mappings_of(operation: &'static str, index: &str, entry: Value) -> ClientResult<TypeMapping> {
    match entry.get("mappings") {
        Some(mappings) => decode(operation, index, None, mappings.clone()),
        None => Ok(TypeMapping::default()),
    }
}

#[async_trait]
impl IndexLifecycle for SearchClient {
    async fn index_exists(&self, index: &str) -> ClientResult<bool> {
        validate_index("index exists", index)?;

        let response = self
            .client()
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| send_error("index exists", index, None, e))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(classify_failure("index exists", index, None, status, &body))
            }
        }
    }

    async fn create_index(
        &self,
        index: &str,
        mapping: Option<&TypeMapping>,
    ) -> ClientResult<bool> {
        validate_index("create index", index)?;

        let mappings = mapping
            .map(serde_json::to_value)
            .transpose()
            .map_err(|source| {
                tracing::error!(
                    operation = "create index",
                    index,
                    "failed to encode mapping: {}",
                    source
                );
                SerializationError::Encode {
                    what: "mapping",
                    source,
                }
            })?;

        self.recreate_index(index, mappings).await
    }

    async fn create_with_raw_mapping(
        &self,
        index: &str,
        mapping_json: &str,
    ) -> ClientResult<bool> {
        validate_index("create index", index)?;

        let mappings: Value = serde_json::from_str(mapping_json).map_err(|source| {
            tracing::error!(
                operation = "create index",
                index,
                "raw mapping is not valid JSON: {}",
                source
            );
            SerializationError::Encode {
                what: "raw mapping",
                source,
            }
        })?;

        self.recreate_index(index, Some(mappings)).await
    }

    async fn delete_index(&self, index: &str) -> ClientResult<bool> {
        validate_index("delete index", index)?;

        let response = self
            .client()
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| send_error("delete index", index, None, e))?;

        let response = ensure_success("delete index", index, None, response).await?;
        let body = read_json("delete index", index, None, response).await?;
        let deleted = acknowledged("delete index", index, &body)?;

        tracing::info!("Deleted index '{}' (acknowledged: {})", index, deleted);
        Ok(deleted)
    }

    async fn get_mapping(&self, index: &str) -> ClientResult<TypeMapping> {
        validate_index("get mapping", index)?;

        let response = self
            .client()
            .indices()
            .get_mapping(IndicesGetMappingParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| send_error("get mapping", index, None, e))?;

        let response = ensure_success("get mapping", index, None, response).await?;
        let body = read_json("get mapping", index, None, response).await?;
        mappings_of("get mapping", index, index_entry("get mapping", index, body)?)
    }

    async fn get_all_mappings(&self) -> ClientResult<BTreeMap<String, TypeMapping>> {
        let response = self
            .client()
            .indices()
            .get_mapping(IndicesGetMappingParts::None)
            .send()
            .await
            .map_err(|e| send_error("get all mappings", "_all", None, e))?;

        let response = ensure_success("get all mappings", "_all", None, response).await?;
        let body = read_json("get all mappings", "_all", None, response).await?;
        let body: Map<String, Value> = decode("get all mappings", "_all", None, body)?;

        let mut mappings = BTreeMap::new();
        for (index, entry) in body {
            let mapping = mappings_of("get all mappings", &index, entry)?;
            mappings.insert(index, mapping);
        }
        Ok(mappings)
    }

    async fn describe_index(&self, index: &str) -> ClientResult<IndexInfo> {
        validate_index("describe index", index)?;

        let response = self
            .client()
            .indices()
            .get(IndicesGetParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| send_error("describe index", index, None, e))?;

        let response = ensure_success("describe index", index, None, response).await?;
        let body = read_json("describe index", index, None, response).await?;
        let entry = index_entry("describe index", index, body)?;
        let info: IndexInfo = decode("describe index", index, None, entry)?;

        for (name, property) in &info.mappings.properties {
            tracing::debug!("Index '{}' field '{}': {:?}", index, name, property.field_type);
        }
        Ok(info)
    }

    async fn list_indices(&self) -> ClientResult<Vec<IndexRecord>> {
        let response = self
            .client()
            .cat()
            .indices(CatIndicesParts::None)
            .format("json")
            .send()
            .await
            .map_err(|e| send_error("list indices", "_all", None, e))?;

        let response = ensure_success("list indices", "_all", None, response).await?;
        let body = read_json("list indices", "_all", None, response).await?;
        decode("list indices", "_all", None, body)
    }

    async fn refresh(&self, index: &str) -> ClientResult<bool> {
        self.broadcast(Broadcast::Refresh, index).await
    }

    async fn flush(&self, index: &str) -> ClientResult<bool> {
        self.broadcast(Broadcast::Flush, index).await
    }
}
