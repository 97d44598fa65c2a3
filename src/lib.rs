//! Triple Store Client — typed async client for RDF4J-style REST APIs
//!
//! Covers repository management, SPARQL query/update, statement CRUD,
//! namespaces, server-side transactions and the SPARQL 1.1 Graph Store
//! Protocol. Each method is one HTTP request; nothing about the remote
//! store is cached locally.
//!
//! - **`TripleStoreClient`**: server-level operations and repository factory
//! - **`RepositoryClient`**: queries, updates and statements for one repository
//! - **`Transaction`**: a server-side transaction, closed by commit or rollback
//! - **`GraphStore`**: whole-graph get/replace/append/delete
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use triplestore_client::{ClientConfig, QueryOptions, TripleStoreClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), triplestore_client::ClientError> {
//!     let client = TripleStoreClient::new(ClientConfig::new("http://localhost:8080/rdf4j-server"))?;
//!     let repo = client.repository("demo");
//!
//!     let mut tx = repo.begin_transaction(None).await?;
//!     tx.update(
//!         r#"INSERT DATA { <http://ex.org/alice> <http://xmlns.com/foaf/0.1/name> "Alice" }"#,
//!         &Default::default(),
//!     ).await?;
//!     tx.commit().await?;
//!
//!     let rows = repo.query("SELECT ?name { ?s <http://xmlns.com/foaf/0.1/name> ?name }",
//!         &QueryOptions::new().limit(10)).await?;
//!     println!("Found {} rows", rows.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod content_type;
pub mod error;
pub mod graph_store;
pub mod models;
pub mod params;
pub mod rdf;
pub mod repository;
pub mod results;
pub mod transaction;
pub mod transport;

pub use client::TripleStoreClient;
pub use config::ClientConfig;
pub use content_type::ContentType;
pub use error::{ClientError, ClientResult, ErrorBody, Lookup};
pub use graph_store::{GraphStore, GraphTarget};
pub use models::{RepositoryDescriptor, RepositoryOptions};
pub use params::{AddOptions, QueryOptions, StatementFilter, UpdateOptions, DEFAULT_CONTEXT};
pub use repository::{QueryMethod, RepositoryClient};
pub use results::{BindingValue, QuerySolution, SelectResults};
pub use transaction::{IsolationLevel, Transaction};
pub use transport::{HttpTransport, Request, Response, Transport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
