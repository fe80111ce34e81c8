//! Search client construction and response handling.

use std::fmt::Debug;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::{Certificate, CertificateValidation};
use elasticsearch::http::response::Response;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{ConnectionAuth, ConnectionConfig};
use crate::error::{
    ClientError, ClientResult, ConfigError, EngineError, NotFoundError, SerializationError,
    TransportError,
};

/// Client for an Elasticsearch or OpenSearch cluster.
///
/// Holds the connection handle and nothing else; every operation is an
/// independent request. The handle is cheap to share behind an `Arc`.
pub struct SearchClient {
    /// The Elasticsearch client.
    client: Elasticsearch,
    /// Configuration the client was built from.
    config: ConnectionConfig,
}

impl Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("nodes", &self.config.nodes)
            .field("request_timeout_ms", &self.config.request_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// * `ClientError::Config` - If the configuration is invalid or the trust
    ///   store cannot be loaded
    /// * `ClientError::Transport` - If the transport cannot be built
    pub fn new(config: ConnectionConfig) -> ClientResult<Self> {
        config.validate()?;
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Wraps an already configured client.
    pub fn from_client(client: Elasticsearch, config: ConnectionConfig) -> Self {
        Self { client, config }
    }

    /// Builds the Elasticsearch client from configuration.
    fn build_client(config: &ConnectionConfig) -> ClientResult<Elasticsearch> {
        let url = config.primary_node()?;
        if config.nodes.len() > 1 {
            tracing::warn!(
                "{} nodes configured, only {} is used (single-node connection pool)",
                config.nodes.len(),
                url
            );
        }

        let conn_pool = SingleNodeConnectionPool::new(url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.tls.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        } else if let Some(ref path) = config.tls.trust_store_path {
            let pem = std::fs::read(path).map_err(|e| ConfigError::TrustStore {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            let certificate = Certificate::from_pem(&pem).map_err(|e| ConfigError::TrustStore {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            builder = builder.cert_validation(CertificateValidation::Full(certificate));
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ConnectionAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ConnectionAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| TransportError::Build {
            message: e.to_string(),
        })?;

        Ok(Elasticsearch::new(transport))
    }

    /// Returns the Elasticsearch client.
    pub fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

/// Maps a send failure to a transport error, logging the target.
pub(crate) fn send_error(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    source: elasticsearch::Error,
) -> ClientError {
    tracing::error!(operation, index, id, "request failed: {}", source);
    TransportError::from_send(operation, source).into()
}

/// Passes a successful response through and turns any other into an error.
pub(crate) async fn ensure_success(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    response: Response,
) -> ClientResult<Response> {
    let status = response.status_code();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(operation, index, id, status.as_u16(), &body))
}

/// Classifies a non-success answer.
///
/// A 404 names a missing index when the engine says so or when no document
/// was addressed, and a missing document otherwise. Any other status is an
/// engine rejection carrying the engine's error type and reason.
pub(crate) fn classify_failure(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    status: u16,
    body: &str,
) -> ClientError {
    let error = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned());

    let error_type = error
        .as_ref()
        .and_then(|e| e.get("type"))
        .and_then(|t| t.as_str())
        .unwrap_or("unknown")
        .to_string();

    if status == 404 {
        let not_found = match id {
            Some(id) if error_type != "index_not_found_exception" => NotFoundError::Document {
                index: index.to_string(),
                id: id.to_string(),
            },
            _ => NotFoundError::Index {
                index: index.to_string(),
            },
        };
        tracing::warn!(operation, index, id, "{}", not_found);
        return not_found.into();
    }

    let reason = error
        .as_ref()
        .and_then(|e| e.get("reason"))
        .and_then(|r| r.as_str())
        .map(String::from)
        .unwrap_or_else(|| body.to_string());

    tracing::error!(
        operation,
        index,
        id,
        status,
        error_type = %error_type,
        "engine rejected request: {}",
        reason
    );

    EngineError::Rejected {
        operation,
        status,
        error_type,
        reason,
    }
    .into()
}

/// Rejects index names that would not address exactly one index.
///
/// An empty name would target the cluster root or every index, and wildcard,
/// comma or `_`-prefixed names address several indices or an API endpoint.
pub(crate) fn validate_index(operation: &'static str, index: &str) -> ClientResult<()> {
    let Some(reason) = index_name_problem(index) else {
        return Ok(());
    };

    tracing::error!(operation, index, "invalid index name: {}", reason);
    Err(ConfigError::InvalidIndexName {
        operation,
        index: index.to_string(),
        reason,
    }
    .into())
}

fn index_name_problem(index: &str) -> Option<&'static str> {
    if index.trim().is_empty() {
        return Some("index name is empty");
    }
    if index == "." || index == ".." {
        return Some("'.' and '..' are not index names");
    }
    if index.starts_with(['_', '-', '+']) {
        return Some("index name must not start with '_', '-' or '+'");
    }
    if index.chars().any(char::is_uppercase) {
        return Some("index name must be lowercase");
    }
    if index
        .chars()
        .any(|c| c.is_whitespace() || RESERVED_INDEX_CHARS.contains(c))
    {
        return Some("index name contains a reserved character");
    }
    None
}

const RESERVED_INDEX_CHARS: &str = "\\/*?\"<>|,#:";

/// Builds a `MissingField` error, logging the target.
pub(crate) fn missing_field(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    field: impl Into<String>,
) -> ClientError {
    let field = field.into();
    tracing::error!(operation, index, id, field = %field, "response is missing a field");
    SerializationError::MissingField { operation, field }.into()
}

/// Reads a response body as JSON.
pub(crate) async fn read_json(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    response: Response,
) -> ClientResult<Value> {
    response.json::<Value>().await.map_err(|e| {
        tracing::error!(operation, index, id, "failed to read response body: {}", e);
        TransportError::from_send(operation, e).into()
    })
}

/// Decodes a JSON value into `T`.
pub(crate) fn decode<T: DeserializeOwned>(
    operation: &'static str,
    index: &str,
    id: Option<&str>,
    value: Value,
) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|source| {
        tracing::error!(
            operation,
            index,
            id,
            "response does not match the result type: {}",
            source
        );
        SerializationError::Decode { operation, source }.into()
    })
}

/// Reads the `acknowledged` flag of an index management response.
pub(crate) fn acknowledged(
    operation: &'static str,
    index: &str,
    body: &Value,
) -> ClientResult<bool> {
    body.get("acknowledged")
        .and_then(|a| a.as_bool())
        .ok_or_else(|| missing_field(operation, index, None, "acknowledged"))
}
