//! Search response model and result extraction.
//!
//! [`SearchResponse`] is the typed form of a `_search` answer. The `extract_*`
//! functions turn it into the shapes callers consume: typed hits, bare
//! payloads, keys, highlight fragments or histogram buckets. Every extractor
//! preserves the order the engine returned, which is the requested sort.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClientResult, SerializationError};

/// Highlight fragments of one hit, keyed by field.
pub type HighlightFields = BTreeMap<String, Vec<String>>;

/// A decoded `_search` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct SearchResponse<T> {
    /// Milliseconds the engine spent executing the search.
    #[serde(default)]
    pub took: u64,
    /// True if the engine stopped before every shard answered.
    #[serde(default)]
    pub timed_out: bool,
    /// Matched documents.
    #[serde(default)]
    pub hits: Hits<T>,
    /// Raw aggregation results, keyed by aggregation name.
    #[serde(default)]
    pub aggregations: Map<String, Value>,
}

/// The `hits` section of a search response.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Hits<T> {
    /// Total number of matches, absent when total tracking was disabled.
    #[serde(default)]
    pub total: Option<TotalHits>,
    /// Highest score among the hits. `None` for sorted requests.
    #[serde(default)]
    pub max_score: Option<f64>,
    /// The requested page of hits, in engine order.
    #[serde(default = "Vec::new")]
    pub hits: Vec<Hit<T>>,
}

impl<T> Default for Hits<T> {
    fn default() -> Self {
        Self {
            total: None,
            max_score: None,
            hits: Vec::new(),
        }
    }
}

/// Total hit count. `relation` is `gte` when the engine stopped counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    /// Number of matching documents.
    pub value: u64,
    /// `eq` for an exact count, `gte` for a lower bound.
    pub relation: String,
}

/// One matched document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Hit<T> {
    /// Concrete index holding the document.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document key.
    #[serde(rename = "_id")]
    pub id: String,
    /// `None` when the request sorted on a field.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// `None` when the engine did not return the source.
    #[serde(rename = "_source", default = "Option::default")]
    pub source: Option<T>,
    /// Highlight fragments, empty unless highlighting was requested.
    #[serde(default)]
    pub highlight: HighlightFields,
    /// Sort values of the hit, when the request was sorted.
    #[serde(default)]
    pub sort: Vec<Value>,
}

/// One bucket of a histogram aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Lower bound of the bucket.
    pub key: f64,
    /// Number of documents in the bucket.
    pub doc_count: u64,
}

impl<T> SearchResponse<T> {
    /// Total hit count reported by the engine, if it was tracked.
    pub fn total(&self) -> Option<u64> {
        self.hits.total.as_ref().map(|t| t.value)
    }
}

/// Decodes a raw `_search` body of `index` into a typed response.
pub fn decode_response<T: DeserializeOwned>(
    operation: &'static str,
    index: &str,
    body: Value,
) -> ClientResult<SearchResponse<T>> {
    serde_json::from_value(body).map_err(|source| {
        tracing::error!(
            operation,
            index,
            "search response does not match the result type: {}",
            source
        );
        SerializationError::Decode { operation, source }.into()
    })
}

/// Returns the hits in engine order. Empty, never absent, when nothing matched.
pub fn extract_hits<T>(response: SearchResponse<T>) -> Vec<Hit<T>> {
    tracing::debug!(took_ms = response.took, "search completed");
    response.hits.hits
}

/// Returns the payload of each hit in engine order.
///
/// Hits returned without a source are skipped.
pub fn extract_sources<T>(response: SearchResponse<T>) -> Vec<T> {
    extract_hits(response)
        .into_iter()
        .filter_map(|hit| {
            if hit.source.is_none() {
                tracing::warn!(index = %hit.index, id = %hit.id, "hit has no _source, skipping");
            }
            hit.source
        })
        .collect()
}

/// Returns the key of each hit in engine order.
pub fn extract_ids<T>(response: &SearchResponse<T>) -> Vec<String> {
    tracing::debug!(took_ms = response.took, "search completed");
    response.hits.hits.iter().map(|hit| hit.id.clone()).collect()
}

/// Returns the highlight fragments of each hit in engine order. A hit with
/// nothing highlighted contributes an empty map.
pub fn extract_highlights<T>(response: &SearchResponse<T>) -> Vec<HighlightFields> {
    tracing::debug!(took_ms = response.took, "search completed");
    response
        .hits
        .hits
        .iter()
        .map(|hit| hit.highlight.clone())
        .collect()
}

/// Returns the buckets of the histogram aggregation named `key`.
pub fn extract_histogram<T>(
    response: &SearchResponse<T>,
    key: &str,
) -> ClientResult<Vec<HistogramBucket>> {
    let buckets = response
        .aggregations
        .get(key)
        .and_then(|agg| agg.get("buckets"))
        .cloned()
        .ok_or_else(|| {
            tracing::error!(aggregation = key, "response has no histogram buckets");
            SerializationError::MissingField {
                operation: "histogram aggregation",
                field: format!("aggregations.{}.buckets", key),
            }
        })?;

    serde_json::from_value(buckets).map_err(|source| {
        tracing::error!(aggregation = key, "malformed histogram buckets: {}", source);
        SerializationError::Decode {
            operation: "histogram aggregation",
            source,
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::capture_events;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Product {
        id: u64,
        #[serde(rename = "productName")]
        product_name: String,
    }

    fn sample_response() -> Value {
        json!({
            "took": 3,
            "timed_out": false,
            "_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
            "hits": {
                "total": { "value": 3, "relation": "eq" },
                "max_score": null,
                "hits": [
                    {
                        "_index": "product", "_id": "3", "_score": null,
                        "_source": { "id": 3, "productName": "中华人民共和国" },
                        "sort": [3]
                    },
                    {
                        "_index": "product", "_id": "2", "_score": null,
                        "_source": { "id": 2, "productName": "运动服装" },
                        "highlight": { "productName": ["<b>运动</b>服装"] },
                        "sort": [2]
                    },
                    {
                        "_index": "product", "_id": "1", "_score": null,
                        "sort": [1]
                    }
                ]
            }
        })
    }

    #[test]
    fn test_extract_sources_keeps_engine_order() {
        let response: SearchResponse<Product> =
            decode_response("search", "product", sample_response()).unwrap();
        assert_eq!(response.total(), Some(3));

        let sources = extract_sources(response);
        let ids: Vec<u64> = sources.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(sources[1].product_name, "运动服装");
    }

    #[test]
    fn test_extract_hits_keeps_missing_source() {
        let response: SearchResponse<Product> =
            decode_response("search", "product", sample_response()).unwrap();
        let hits = extract_hits(response);
        assert_eq!(hits.len(), 3);
        assert!(hits[2].source.is_none());
        assert_eq!(hits[0].sort, vec![json!(3)]);
    }

    #[test]
    fn test_extract_ids_and_highlights() {
        let response: SearchResponse<Value> =
            decode_response("search", "product", sample_response()).unwrap();
        assert_eq!(extract_ids(&response), vec!["3", "2", "1"]);

        let highlights = extract_highlights(&response);
        assert_eq!(highlights.len(), 3);
        assert!(highlights[0].is_empty());
        assert_eq!(highlights[1]["productName"], vec!["<b>运动</b>服装"]);
    }

    #[test]
    fn test_no_hits_yields_empty_list() {
        let body = json!({ "took": 1, "timed_out": false, "hits": { "hits": [] } });
        let response: SearchResponse<Product> =
            decode_response("search", "product", body).unwrap();
        assert!(extract_sources(response).is_empty());

        let response: SearchResponse<Product> =
            decode_response("search", "product", json!({ "took": 1 })).unwrap();
        assert!(extract_hits(response).is_empty());
    }

    #[test]
    fn test_source_type_mismatch_is_a_decode_error() {
        let body = json!({
            "hits": { "hits": [ { "_index": "p", "_id": "1", "_source": { "id": "x" } } ] }
        });
        let (events, _guard) = capture_events();
        let err = decode_response::<Product>("search", "product", body).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ClientError::Serialization(SerializationError::Decode { .. })
        ));

        let errors = events.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("operation"), Some("search"));
        assert_eq!(errors[0].field("index"), Some("product"));
    }

    #[test]
    fn test_extract_histogram() {
        let body = json!({
            "took": 2,
            "hits": { "total": { "value": 4, "relation": "eq" }, "hits": [] },
            "aggregations": {
                "price": {
                    "buckets": [
                        { "key": 0.0, "doc_count": 1 },
                        { "key": 50.0, "doc_count": 3 }
                    ]
                }
            }
        });
        let response: SearchResponse<Value> =
            decode_response("histogram", "product", body).unwrap();

        let buckets = extract_histogram(&response, "price").unwrap();
        assert_eq!(
            buckets,
            vec![
                HistogramBucket { key: 0.0, doc_count: 1 },
                HistogramBucket { key: 50.0, doc_count: 3 },
            ]
        );

        let (events, _guard) = capture_events();
        let err = extract_histogram(&response, "missing").unwrap_err();
        assert!(err.to_string().contains("aggregations.missing.buckets"));

        let errors = events.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("aggregation"), Some("missing"));
    }
}
