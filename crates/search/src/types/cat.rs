//! Rows returned by the `_cat` endpoints in JSON format.
//!
//! The engine reports every column as a string (numbers included), and
//! columns can be absent for closed indices or nodes that are still joining,
//! so every field is optional.

use serde::{Deserialize, Serialize};

/// One row of `_cat/indices`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// `green`, `yellow` or `red`.
    #[serde(default)]
    pub health: Option<String>,
    /// `open` or `close`.
    #[serde(default)]
    pub status: Option<String>,
    /// Index name.
    #[serde(default)]
    pub index: Option<String>,
    /// Index UUID.
    #[serde(default)]
    pub uuid: Option<String>,
    /// Primary shard count.
    #[serde(default)]
    pub pri: Option<String>,
    /// Replica count.
    #[serde(default)]
    pub rep: Option<String>,
    /// Visible documents.
    #[serde(default, rename = "docs.count")]
    pub docs_count: Option<String>,
    /// Deleted documents not yet merged away.
    #[serde(default, rename = "docs.deleted")]
    pub docs_deleted: Option<String>,
    /// Store size across all copies.
    #[serde(default, rename = "store.size")]
    pub store_size: Option<String>,
    /// Store size of the primaries.
    #[serde(default, rename = "pri.store.size")]
    pub pri_store_size: Option<String>,
}

/// One row of `_cat/nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node address.
    #[serde(default)]
    pub ip: Option<String>,
    /// Used heap, in percent.
    #[serde(default, rename = "heap.percent")]
    pub heap_percent: Option<String>,
    /// Used memory, in percent.
    #[serde(default, rename = "ram.percent")]
    pub ram_percent: Option<String>,
    /// Recent CPU usage, in percent.
    #[serde(default)]
    pub cpu: Option<String>,
    /// Load average over one minute.
    #[serde(default)]
    pub load_1m: Option<String>,
    /// Load average over five minutes.
    #[serde(default)]
    pub load_5m: Option<String>,
    /// Load average over fifteen minutes.
    #[serde(default)]
    pub load_15m: Option<String>,
    /// Role letters, e.g. `dilm`.
    #[serde(default, rename = "node.role")]
    pub node_role: Option<String>,
    /// `*` for the elected master.
    #[serde(default)]
    pub master: Option<String>,
    /// Node name.
    #[serde(default)]
    pub name: Option<String>,
}

impl NodeRecord {
    /// Returns true if this node is the elected master.
    pub fn is_master(&self) -> bool {
        self.master.as_deref() == Some("*")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_index_record_from_cat_row() {
        let row = json!({
            "health": "yellow",
            "status": "open",
            "index": "sku",
            "uuid": "q2kUu9JzRfq8",
            "pri": "1",
            "rep": "1",
            "docs.count": "3",
            "docs.deleted": "0",
            "store.size": "12.1kb",
            "pri.store.size": "12.1kb"
        });
        let record: IndexRecord = serde_json::from_value(row).unwrap();
        assert_eq!(record.index.as_deref(), Some("sku"));
        assert_eq!(record.docs_count.as_deref(), Some("3"));
        assert_eq!(record.pri_store_size.as_deref(), Some("12.1kb"));
    }

    #[test]
    fn test_closed_index_row_has_gaps() {
        let row = json!({ "status": "close", "index": "old", "uuid": "x" });
        let record: IndexRecord = serde_json::from_value(row).unwrap();
        assert!(record.health.is_none());
        assert!(record.docs_count.is_none());
    }

    #[test]
    fn test_node_record_master_flag() {
        let row = json!({
            "ip": "172.17.0.2",
            "heap.percent": "41",
            "node.role": "cdfhilmrstw",
            "master": "*",
            "name": "es01"
        });
        let record: NodeRecord = serde_json::from_value(row).unwrap();
        assert!(record.is_master());
        assert_eq!(record.heap_percent.as_deref(), Some("41"));
    }
}
