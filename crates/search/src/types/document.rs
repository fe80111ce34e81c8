//! Results of single-document writes and index inspection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::mapping::TypeMapping;

/// Acknowledgement of an index or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Concrete index written to.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document key. Engine-assigned when the caller did not supply one.
    #[serde(rename = "_id")]
    pub id: String,
    /// Document version after the write.
    #[serde(rename = "_version", default)]
    pub version: u64,
    /// `created`, `updated`, `deleted`, `noop` or `not_found`.
    pub result: String,
}

impl WriteResult {
    /// Returns true if the write created a new document.
    pub fn is_created(&self) -> bool {
        self.result == "created"
    }
}

/// Aliases, mappings and settings of one index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    /// Aliases pointing at the index.
    #[serde(default)]
    pub aliases: BTreeMap<String, Value>,
    /// Field mapping.
    #[serde(default)]
    pub mappings: TypeMapping,
    /// Index settings as reported by the engine.
    #[serde(default)]
    pub settings: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_result_from_index_response() {
        let body = json!({
            "_index": "sku",
            "_id": "Xy3kU4kBv",
            "_version": 1,
            "result": "created",
            "_shards": { "total": 2, "successful": 1, "failed": 0 },
            "_seq_no": 0,
            "_primary_term": 1
        });
        let result: WriteResult = serde_json::from_value(body).unwrap();
        assert_eq!(result.id, "Xy3kU4kBv");
        assert_eq!(result.version, 1);
        assert!(result.is_created());
    }

    #[test]
    fn test_index_info_from_get_index_entry() {
        let entry = json!({
            "aliases": {},
            "mappings": { "properties": { "id": { "type": "long" } } },
            "settings": { "index": { "number_of_shards": "1" } }
        });
        let info: IndexInfo = serde_json::from_value(entry).unwrap();
        assert!(info.aliases.is_empty());
        assert!(info.mappings.property("id").is_some());
        assert_eq!(info.settings["index"]["number_of_shards"], "1");
    }
}
