//! Connection configuration.
//!
//! [`ConnectionConfig`] describes how to reach the engine: node URLs,
//! credentials, request timeout and TLS trust. It is consumed once, when a
//! [`SearchClient`](crate::SearchClient) is built, and never re-read.
//!
//! TLS trust is configured per connection. The PEM bundle named by
//! [`TlsConfig::trust_store_path`] is loaded and handed to the transport for
//! that client only, so two clients with different trust stores can coexist
//! in one process.

use std::path::PathBuf;

use elasticsearch::http::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ClientResult, ConfigError};

/// Authentication configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// TLS trust settings for one connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TlsConfig {
    /// PEM bundle of trusted certificates. When set, the server certificate
    /// must chain to one of these.
    #[serde(default)]
    pub trust_store_path: Option<PathBuf>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

/// Configuration for a search client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ConnectionAuth>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// TLS trust settings.
    #[serde(default)]
    pub tls: TlsConfig,

    /// Primary shards for indices created through this client.
    /// `None` leaves the engine default in place.
    #[serde(default)]
    pub number_of_shards: Option<u32>,

    /// Replica shards for indices created through this client.
    /// `None` leaves the engine default in place.
    #[serde(default)]
    pub number_of_replicas: Option<u32>,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            auth: None,
            request_timeout_ms: default_request_timeout_ms(),
            tls: TlsConfig::default(),
            number_of_shards: None,
            number_of_replicas: None,
        }
    }
}

impl ConnectionConfig {
    /// Builds a configuration from a comma-separated `host:port` list.
    ///
    /// Entries that already carry a scheme are kept as they are; the others
    /// get `scheme://` prepended. Blank entries are ignored.
    pub fn from_hosts(hosts: &str, scheme: &str) -> Self {
        let nodes = hosts
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|host| {
                if host.contains("://") {
                    host.to_string()
                } else {
                    format!("{}://{}", scheme, host)
                }
            })
            .collect();

        Self {
            nodes,
            ..Default::default()
        }
    }

    /// Sets basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(ConnectionAuth::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Sets the trust store used to validate the server certificate.
    pub fn with_trust_store(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls.trust_store_path = Some(path.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = timeout_ms;
        self
    }

    /// Returns the node the transport connects to.
    pub fn primary_node(&self) -> ClientResult<Url> {
        let url = self.nodes.first().ok_or(ConfigError::NoNodes)?;
        parse_node(url)
    }

    /// Checks the configuration for errors.
    pub fn validate(&self) -> ClientResult<()> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes.into());
        }
        for node in &self.nodes {
            parse_node(node)?;
        }
        if self.tls.disable_certificate_validation && self.tls.trust_store_path.is_some() {
            return Err(ConfigError::Conflict {
                message: "a trust store cannot be combined with disabled certificate validation"
                    .to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn parse_node(url: &str) -> ClientResult<Url> {
    Url::parse(url).map_err(|e| {
        ConfigError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.nodes, vec!["http://localhost:9200"]);
        assert_eq!(config.request_timeout_ms, 30000);
        assert!(config.auth.is_none());
        assert!(config.tls.trust_store_path.is_none());
        assert!(!config.tls.disable_certificate_validation);
        assert!(config.number_of_shards.is_none());
    }

    #[test]
    fn test_from_hosts_adds_scheme() {
        let config = ConnectionConfig::from_hosts("es1:9200, es2:9201,,https://es3:9443", "https");
        assert_eq!(
            config.nodes,
            vec!["https://es1:9200", "https://es2:9201", "https://es3:9443"]
        );
    }

    #[test]
    fn test_validate_rejects_empty_nodes() {
        let config = ConnectionConfig {
            nodes: vec![],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at least one node"));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = ConnectionConfig {
            nodes: vec!["not a url".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_trust_store_without_validation() {
        let mut config = ConnectionConfig::default().with_trust_store("/etc/ssl/search.pem");
        config.tls.disable_certificate_validation = true;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_defaults_fill_missing_fields() {
        let config: ConnectionConfig =
            serde_json::from_str(r#"{"nodes": ["http://es:9200"]}"#).unwrap();
        assert_eq!(config.request_timeout_ms, 30000);
        assert_eq!(config.tls, TlsConfig::default());
        assert_eq!(config.primary_node().unwrap().as_str(), "http://es:9200/");
    }
}
