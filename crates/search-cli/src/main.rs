//! Helios Search CLI (hsearch)
//!
//! Exercises the helios-search client against a running Elasticsearch or
//! OpenSearch cluster. Results are printed to stdout as pretty JSON.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use helios_search::normalizer;
use helios_search::{
    ClusterInspector, ConnectionConfig, DocumentStore, IndexLifecycle, PageRequest, Query,
    QueryProvider, SearchClient, SearchRequest, SortOrder,
};
use serde_json::Value;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hsearch")]
#[command(about = "Index, document and query operations against a search cluster")]
struct Cli {
    /// Cluster nodes (comma-separated host:port or scheme://host:port).
    #[arg(long, env = "SEARCH_NODES", default_value = "localhost:9200", global = true)]
    nodes: String,

    /// Scheme used for nodes given without one.
    #[arg(long, env = "SEARCH_SCHEME", default_value = "http", global = true)]
    scheme: String,

    /// Username for basic authentication. Requires --password.
    #[arg(long, env = "SEARCH_USERNAME", global = true)]
    username: Option<String>,

    /// Password for basic authentication. Requires --username.
    #[arg(long, env = "SEARCH_PASSWORD", global = true)]
    password: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, env = "SEARCH_TIMEOUT_MS", default_value = "30000", global = true)]
    timeout_ms: u64,

    /// PEM bundle used to validate the server certificate.
    #[arg(long, env = "SEARCH_TRUST_STORE", global = true)]
    trust_store: Option<PathBuf>,

    /// Skip server certificate validation.
    #[arg(long, env = "SEARCH_INSECURE", default_value = "false", global = true)]
    insecure: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SEARCH_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List indices.
    Indices,
    /// List cluster nodes.
    Nodes,
    /// Check whether an index exists.
    Exists { index: String },
    /// Create an index, replacing any existing one.
    Create {
        index: String,
        /// JSON file holding the `mappings` body.
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Delete an index.
    Delete { index: String },
    /// Show the mapping of one index, or of all indices.
    Mapping { index: Option<String> },
    /// Show aliases, mappings and settings of an index.
    Describe { index: String },
    /// Refresh an index.
    Refresh { index: String },
    /// Flush an index.
    Flush { index: String },
    /// Add a JSON document.
    Add {
        index: String,
        /// Document JSON.
        document: String,
        /// Document key; generated by the engine when omitted.
        #[arg(long)]
        id: Option<String>,
    },
    /// Bulk-load a file holding a JSON array of documents.
    Load { index: String, file: PathBuf },
    /// Fetch a document by key.
    Get { index: String, id: String },
    /// Delete a document by key.
    Remove { index: String, id: String },
    /// List every document key of an index.
    Ids { index: String },
    /// Run a query-string search.
    Search {
        index: String,
        /// Query-string expression.
        #[arg(default_value = "*")]
        query: String,
        /// Default field for terms without a field prefix.
        #[arg(long)]
        field: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value = "0")]
        from: u64,
        #[arg(long, default_value = "10")]
        size: u64,
    },
    /// Count documents matching a query-string expression.
    Count {
        index: String,
        #[arg(default_value = "*")]
        query: String,
    },
}

/// Initializes tracing with `RUST_LOG` taking precedence over `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("helios_search={},hsearch={}", level, level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

impl Cli {
    fn connection_config(&self) -> anyhow::Result<ConnectionConfig> {
        let mut config = ConnectionConfig::from_hosts(&self.nodes, &self.scheme)
            .with_request_timeout_ms(self.timeout_ms);

        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                config = config.with_basic_auth(username.clone(), password.clone());
            }
            (Some(_), None) => anyhow::bail!("--username requires --password"),
            (None, Some(_)) => anyhow::bail!("--password requires --username"),
            (None, None) => {}
        }
        if let Some(ref path) = self.trust_store {
            config = config.with_trust_store(path.clone());
        }
        config.tls.disable_certificate_validation = self.insecure;
        Ok(config)
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = cli.connection_config()?;
    info!(nodes = ?config.nodes, timeout_ms = config.request_timeout_ms, "Connecting");
    let client = SearchClient::new(config)?;

    match cli.command {
        Command::Indices => print_json(&client.list_indices().await?)?,
        Command::Nodes => print_json(&client.nodes().await?)?,
        Command::Exists { index } => print_json(&client.index_exists(&index).await?)?,
        Command::Create { index, mapping } => {
            let created = match mapping {
                Some(path) => {
                    let mapping = read_file(&path)?;
                    client.create_with_raw_mapping(&index, &mapping).await?
                }
                None => client.create_index(&index, None).await?,
            };
            print_json(&created)?
        }
        Command::Delete { index } => print_json(&client.delete_index(&index).await?)?,
        Command::Mapping { index: Some(index) } => print_json(&client.get_mapping(&index).await?)?,
        Command::Mapping { index: None } => print_json(&client.get_all_mappings().await?)?,
        Command::Describe { index } => print_json(&client.describe_index(&index).await?)?,
        Command::Refresh { index } => print_json(&client.refresh(&index).await?)?,
        Command::Flush { index } => print_json(&client.flush(&index).await?)?,
        Command::Add {
            index,
            document,
            id,
        } => {
            let document: Value =
                serde_json::from_str(&document).context("document is not valid JSON")?;
            print_json(&client.add(&index, &document, id.as_deref()).await?)?
        }
        Command::Load { index, file } => {
            let documents: Vec<Value> = serde_json::from_str(&read_file(&file)?)
                .context("file does not hold a JSON array")?;
            let outcome = client.batch_add(&index, &documents).await?;
            if outcome.failed {
                eprintln!("{} of {} item(s) failed", outcome.failures().count(), documents.len());
            }
            print_json(&outcome)?
        }
        Command::Get { index, id } => {
            let hit = client.get::<Value>(&index, &id).await?;
            print_json(&hit.source)?
        }
        Command::Remove { index, id } => print_json(&client.delete(&index, &id).await?)?,
        Command::Ids { index } => print_json(&client.get_all_ids(&index).await?)?,
        Command::Search {
            index,
            query,
            field,
            sort,
            desc,
            from,
            size,
        } => {
            let query = match field {
                Some(field) => Query::query_string_in(field, query),
                None => Query::query_string(query),
            };
            let mut page = PageRequest::new(from, size);
            if let Some(sort) = sort {
                page = page.sorted_by(sort, SortOrder::from_descending(desc));
            }

            let request = SearchRequest::new(query).with_page(page);
            let response = client.search::<Value>(&index, &request).await?;
            info!(took_ms = response.took, total = ?response.total(), "Search completed");
            print_json(&normalizer::extract_sources(response))?
        }
        Command::Count { index, query } => {
            print_json(&client.count(&index, &Query::query_string(query)).await?)?
        }
    }

    Ok(())
}
