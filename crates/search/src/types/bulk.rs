//! Bulk operation outcomes.
//!
//! A bulk request succeeds at the HTTP level even when some of its items are
//! rejected. [`BulkOutcome`] keeps the per-item status so callers can see
//! exactly which positions failed while the rest of the batch was applied.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientResult, SerializationError};

/// Result of one bulk request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkOutcome {
    /// True if at least one item failed.
    pub failed: bool,
    /// One entry per submitted item, in submission order.
    pub items: Vec<BulkItem>,
}

/// Outcome of a single item within a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItem {
    /// Zero-based position of the item in the submitted batch.
    pub position: usize,
    /// Action the item performed (`index`, `delete`, ...).
    pub operation: String,
    /// Document id, as assigned or echoed by the engine.
    pub id: Option<String>,
    /// Per-item HTTP status.
    pub status: u16,
    /// Present when the item was rejected.
    pub error: Option<BulkItemError>,
}

/// Reason an item was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    /// Engine exception type, such as `document_parsing_exception`.
    pub error_type: String,
    /// Human-readable rejection reason.
    pub reason: String,
}

impl BulkOutcome {
    /// Outcome of a batch with no items. No request is sent for these.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if every item was applied.
    pub fn is_success(&self) -> bool {
        !self.failed
    }

    /// Returns the rejected items.
    pub fn failures(&self) -> impl Iterator<Item = &BulkItem> {
        self.items.iter().filter(|item| item.error.is_some())
    }

    /// Parses the body of a `_bulk` response sent to `index`.
    ///
    /// Each entry of `items` is a single-key object mapping the action name to
    /// the item result.
    pub(crate) fn from_response(
        operation: &'static str,
        index: &str,
        body: &Value,
    ) -> ClientResult<Self> {
        let missing = |field: String| {
            tracing::error!(operation, index, field = %field, "bulk response is missing a field");
            SerializationError::MissingField { operation, field }
        };

        let raw_items = body
            .get("items")
            .and_then(|i| i.as_array())
            .ok_or_else(|| missing("items".to_string()))?;

        let mut items = Vec::with_capacity(raw_items.len());
        for (position, entry) in raw_items.iter().enumerate() {
            let Some((action, result)) = entry.as_object().and_then(|o| o.iter().next()) else {
                return Err(missing(format!("items[{}]", position)).into());
            };

            let error = result.get("error").map(|e| BulkItemError {
                error_type: e
                    .get("type")
                    .and_then(|t| t.as_str())
                    .unwrap_or("unknown")
                    .to_string(),
                reason: e
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .map(String::from)
                    .unwrap_or_else(|| e.to_string()),
            });

            items.push(BulkItem {
                position,
                operation: action.clone(),
                id: result.get("_id").and_then(|i| i.as_str()).map(String::from),
                status: result
                    .get("status")
                    .and_then(|s| s.as_u64())
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or(0),
                error,
            });
        }

        let failed = body
            .get("errors")
            .and_then(|e| e.as_bool())
            .unwrap_or(false)
            || items.iter().any(|item| item.error.is_some());

        Ok(Self { failed, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::capture_events;
    use serde_json::json;

    #[test]
    fn test_parse_partial_failure() {
        let body = json!({
            "took": 12,
            "errors": true,
            "items": [
                { "index": { "_index": "sku", "_id": "1", "status": 201, "result": "created" } },
                { "index": {
                    "_index": "sku", "_id": "2", "status": 400,
                    "error": {
                        "type": "document_parsing_exception",
                        "reason": "failed to parse field [skuPrice] of type [integer]"
                    }
                } },
                { "index": { "_index": "sku", "_id": "3", "status": 201, "result": "created" } }
            ]
        });

        let outcome = BulkOutcome::from_response("batch add", "sku", &body).unwrap();
        assert!(outcome.failed);
        assert!(!outcome.is_success());
        assert_eq!(outcome.items.len(), 3);

        let failures: Vec<_> = outcome.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].position, 1);
        assert_eq!(failures[0].id.as_deref(), Some("2"));
        assert_eq!(failures[0].status, 400);
        let error = failures[0].error.as_ref().unwrap();
        assert_eq!(error.error_type, "document_parsing_exception");
        assert!(error.reason.contains("skuPrice"));
    }

    #[test]
    fn test_parse_delete_batch() {
        let body = json!({
            "errors": false,
            "items": [
                { "delete": { "_id": "a", "status": 200, "result": "deleted" } },
                { "delete": { "_id": "b", "status": 404, "result": "not_found" } }
            ]
        });

        let outcome = BulkOutcome::from_response("batch add", "sku", &body).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.items[0].operation, "delete");
        assert_eq!(outcome.items[1].status, 404);
        assert_eq!(outcome.failures().count(), 0);
    }

    #[test]
    fn test_missing_items_is_an_error() {
        let (events, _guard) = capture_events();

        let err = BulkOutcome::from_response("batch add", "sku", &json!({ "errors": false }))
            .unwrap_err();
        assert!(err.to_string().contains("items"));

        let errors = events.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field("operation"), Some("batch add"));
        assert_eq!(errors[0].field("index"), Some("sku"));
        assert_eq!(errors[0].field("field"), Some("items"));
    }

    #[test]
    fn test_malformed_item_is_an_error() {
        let body = json!({ "errors": false, "items": [ { "index": { "_id": "1" } }, 7 ] });
        let err = BulkOutcome::from_response("batch add", "sku", &body).unwrap_err();
        assert!(err.to_string().contains("items[1]"));
    }

    #[test]
    fn test_empty_outcome() {
        let outcome = BulkOutcome::empty();
        assert!(outcome.is_success());
        assert!(outcome.items.is_empty());
    }
}
