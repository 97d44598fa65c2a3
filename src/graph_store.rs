//! SPARQL 1.1 Graph Store HTTP Protocol
//!
//! Three ways to address a graph:
//! - the default graph (`rdf-graphs/service?default`)
//! - a named graph by full IRI (`rdf-graphs/service?graph=<iri>`, indirect)
//! - a named graph by local name (`rdf-graphs/<name>`, direct)
//!
//! Each supports get, replace (PUT), append (POST) and delete.

use crate::content_type::ContentType;
use crate::error::{ClientResult, Lookup};
use crate::repository::encode_segment;
use crate::transport::{Method, Request, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Which graph a request addresses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphTarget {
    Default,
    /// Indirect reference by full IRI
    Named(String),
    /// Direct reference by local name; percent-encoded into the path
    Direct(String),
}

impl GraphTarget {
    pub fn named(iri: impl Into<String>) -> Self {
        GraphTarget::Named(iri.into())
    }

    pub fn direct(name: impl Into<String>) -> Self {
        GraphTarget::Direct(name.into())
    }
}

/// Graph Store Protocol client for one repository
#[derive(Clone)]
pub struct GraphStore {
    transport: Arc<dyn Transport>,
    repository_id: String,
    timeout: Option<Duration>,
}

impl GraphStore {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        repository_id: &str,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            transport,
            repository_id: repository_id.to_string(),
            timeout,
        }
    }

    fn request(&self, method: Method, target: &GraphTarget) -> Request {
        let base = format!("/repositories/{}/rdf-graphs", encode_segment(&self.repository_id));
        let request = match target {
            GraphTarget::Default => {
                Request::new(method, format!("{}/service", base)).param("default", "")
            }
            GraphTarget::Named(iri) => {
                Request::new(method, format!("{}/service", base)).param("graph", iri.as_str())
            }
            GraphTarget::Direct(name) => {
                Request::new(method, format!("{}/{}", base, encode_segment(name)))
            }
        };
        request.timeout(self.timeout)
    }

    /// Fetch a graph serialized in `format`
    pub async fn get(&self, target: &GraphTarget, format: ContentType) -> ClientResult<String> {
        let request = self.request(Method::GET, target).accept(format);
        Ok(self.transport.send(request).await?.body)
    }

    /// Replace a graph's contents
    pub async fn replace(
        &self,
        target: &GraphTarget,
        data: &str,
        content_type: ContentType,
    ) -> ClientResult<()> {
        let request = self.request(Method::PUT, target).body(data, content_type);
        self.transport.send(request).await?;
        Ok(())
    }

    /// Merge data into a graph
    pub async fn append(
        &self,
        target: &GraphTarget,
        data: &str,
        content_type: ContentType,
    ) -> ClientResult<()> {
        let request = self.request(Method::POST, target).body(data, content_type);
        self.transport.send(request).await?;
        Ok(())
    }

    /// Remove a graph
    pub async fn delete(&self, target: &GraphTarget) -> ClientResult<()> {
        self.transport.send(self.request(Method::DELETE, target)).await?;
        Ok(())
    }

    /// Header-only probe
    pub async fn probe(&self, target: &GraphTarget) -> Lookup<()> {
        Lookup::from_result(
            self.transport
                .send(self.request(Method::HEAD, target))
                .await
                .map(|_| ()),
        )
    }

    /// Whether the server answers a probe for the graph.
    ///
    /// Any failure reads as `false`. An empty graph may still answer, so use
    /// the repository's context list for a reliable emptiness check.
    pub async fn exists(&self, target: &GraphTarget) -> bool {
        self.probe(target).await.found().is_some()
    }
}
