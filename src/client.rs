//! TripleStoreClient: entry point for a triple store server
//!
//! Manages repositories and hands out per-repository clients.

use crate::config::ClientConfig;
use crate::content_type::ContentType;
use crate::error::{ClientResult, Lookup};
use crate::models::{RepositoryDescriptor, RepositoryOptions};
use crate::repository::{encode_segment, RepositoryClient};
use crate::results;
use crate::transport::{HttpTransport, Request, Transport};
use std::sync::Arc;
use tracing::info;

/// Network client for a running triple store server.
///
/// Cheap to clone; clones share one transport.
#[derive(Clone)]
pub struct TripleStoreClient {
    transport: Arc<dyn Transport>,
}

impl TripleStoreClient {
    /// Create a client over HTTP.
    ///
    /// # Example
    /// ```no_run
    /// # use triplestore_client::{ClientConfig, TripleStoreClient};
    /// let client = TripleStoreClient::new(
    ///     ClientConfig::new("http://localhost:8080/rdf4j-server").with_credentials("admin", "secret"),
    /// ).unwrap();
    /// ```
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Client for one repository. No request is made.
    pub fn repository(&self, id: &str) -> RepositoryClient {
        RepositoryClient::new(self.transport.clone(), id)
    }

    /// All repositories known to the server
    pub async fn list_repositories(&self) -> ClientResult<Vec<RepositoryDescriptor>> {
        let request = Request::get("/repositories").accept(ContentType::SparqlResultsJson);
        let body = self.transport.send(request).await?.body;
        Ok(RepositoryDescriptor::from_results(&results::parse_select(&body)?))
    }

    /// Create a repository, generating a configuration unless one is given
    pub async fn create_repository(
        &self,
        id: &str,
        options: &RepositoryOptions,
    ) -> ClientResult<RepositoryClient> {
        let request = Request::put(format!("/repositories/{}", encode_segment(id)))
            .body(options.to_turtle(id), ContentType::Turtle);
        self.transport.send(request).await?;
        info!(repository = %id, "Created repository");
        Ok(self.repository(id))
    }

    /// Delete a repository and all its data
    pub async fn delete_repository(&self, id: &str) -> ClientResult<()> {
        let request = Request::delete(format!("/repositories/{}", encode_segment(id)));
        self.transport.send(request).await?;
        info!(repository = %id, "Deleted repository");
        Ok(())
    }

    /// Probe a repository, keeping failures apart from absence
    pub async fn probe_repository(&self, id: &str) -> Lookup<()> {
        let request = Request::get(format!("/repositories/{}/size", encode_segment(id)))
            .accept(ContentType::Text);
        Lookup::from_result(self.transport.send(request).await.map(|_| ()))
    }

    /// Whether a repository exists. Never fails: any error reads as `false`.
    pub async fn repository_exists(&self, id: &str) -> bool {
        self.probe_repository(id).await.found().is_some()
    }

    /// Server protocol version
    pub async fn protocol_version(&self) -> ClientResult<String> {
        let request = Request::get("/protocol").accept(ContentType::Text);
        Ok(self.transport.send(request).await?.body.trim().to_string())
    }
}

impl std::fmt::Debug for TripleStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TripleStoreClient").finish_non_exhaustive()
    }
}
