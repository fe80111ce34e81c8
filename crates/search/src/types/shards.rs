//! Per-shard outcome of broadcast operations (refresh, flush).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientResult, SerializationError};

/// The `_shards` section of a broadcast response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShardStatistics {
    /// Shards the operation targeted.
    pub total: u64,
    /// Shards that completed the operation.
    pub successful: u64,
    /// Shards that reported a failure.
    pub failed: u64,
    /// Raw failure entries, one per failed shard.
    #[serde(default)]
    pub failures: Vec<Value>,
}

impl ShardStatistics {
    /// Reads `_shards` from the broadcast response of `index`.
    pub(crate) fn from_response(
        operation: &'static str,
        index: &str,
        body: &Value,
    ) -> ClientResult<Self> {
        let shards = body.get("_shards").cloned().ok_or_else(|| {
            tracing::error!(operation, index, "response has no _shards section");
            SerializationError::MissingField {
                operation,
                field: "_shards".to_string(),
            }
        })?;

        serde_json::from_value(shards).map_err(|source| {
            tracing::error!(operation, index, "malformed _shards section: {}", source);
            SerializationError::Decode { operation, source }.into()
        })
    }

    /// Collapses the shard counts into a single success flag.
    ///
    /// Returns false when every targeted shard failed, which includes the
    /// case where no shard was targeted at all. Partial failures are logged
    /// and reported as success.
    pub fn collapse(&self, operation: &str, index: &str) -> bool {
        if self.failed == self.total {
            tracing::warn!(
                operation,
                index,
                total = self.total,
                "all shards failed: {:?}",
                self.failures
            );
            return false;
        }

        if self.failed > 0 {
            tracing::warn!(
                operation,
                index,
                failed = self.failed,
                total = self.total,
                "some shards failed: {:?}",
                self.failures
            );
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log::capture_events;
    use serde_json::json;

    fn stats(total: u64, failed: u64) -> ShardStatistics {
        ShardStatistics {
            total,
            successful: total - failed,
            failed,
            failures: vec![],
        }
    }

    #[test]
    fn test_healthy_shards_succeed() {
        assert!(stats(2, 0).collapse("refresh", "sku"));
    }

    #[test]
    fn test_all_shards_failed() {
        assert!(!stats(2, 2).collapse("refresh", "sku"));
    }

    #[test]
    fn test_no_shards_targeted_is_failure() {
        assert!(!stats(0, 0).collapse("flush", "sku"));
    }

    #[test]
    fn test_partial_failure_still_succeeds() {
        assert!(stats(2, 1).collapse("flush", "sku"));
    }

    #[test]
    fn test_parse_from_response() {
        let body = json!({ "_shards": { "total": 2, "successful": 1, "failed": 0 } });
        let shards = ShardStatistics::from_response("refresh", "sku", &body).unwrap();
        assert_eq!(shards.total, 2);
        assert_eq!(shards.successful, 1);
        assert!(shards.failures.is_empty());
    }

    #[test]
    fn test_parse_failures_are_logged() {
        let (events, _guard) = capture_events();

        assert!(ShardStatistics::from_response("refresh", "sku", &json!({})).is_err());
        let malformed = json!({ "_shards": { "total": "two" } });
        assert!(ShardStatistics::from_response("flush", "sku", &malformed).is_err());

        let errors = events.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field("operation"), Some("refresh"));
        assert_eq!(errors[1].field("operation"), Some("flush"));
        assert!(errors.iter().all(|e| e.field("index") == Some("sku")));
    }
}
