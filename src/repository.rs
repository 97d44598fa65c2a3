//! Repository-scoped operations
//!
//! Every method builds exactly one request under `/repositories/{id}`.

use crate::content_type::ContentType;
use crate::error::{ClientResult, Lookup};
use crate::graph_store::GraphStore;
use crate::models::{contexts_from_results, namespaces_from_results};
use crate::params::{encode_contexts, AddOptions, QueryOptions, StatementFilter, UpdateOptions};
use crate::rdf;
use crate::results::{self, SelectResults};
use crate::transaction::{IsolationLevel, Transaction};
use crate::transport::{Request, Transport};
use oxrdf::Quad;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Characters left as-is in a path segment (RFC 3986 unreserved)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a value for use as one URL path segment
pub(crate) fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// How a query is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMethod {
    /// Query text in the query string; suits short queries
    #[default]
    Get,
    /// Query text in the request body; options stay in the query string
    Post,
}

/// Client for a single repository
#[derive(Clone)]
pub struct RepositoryClient {
    transport: Arc<dyn Transport>,
    id: String,
    timeout: Option<Duration>,
}

impl RepositoryClient {
    pub(crate) fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        Self {
            transport,
            id: id.into(),
            timeout: None,
        }
    }

    /// Override the client-wide timeout for requests from this handle
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn path(&self, suffix: &str) -> String {
        format!("/repositories/{}{}", encode_segment(&self.id), suffix)
    }

    async fn send(&self, request: Request) -> ClientResult<crate::transport::Response> {
        self.transport.send(request.timeout(self.timeout)).await
    }

    // ---------------------------------------------------------------
    // SPARQL query
    // ---------------------------------------------------------------

    /// Build a query request. POST moves the query text from the
    /// parameters into the body; everything else is encoded identically.
    fn query_request(
        &self,
        query: &str,
        options: &QueryOptions,
        accept: ContentType,
        method: QueryMethod,
    ) -> Request {
        let mut params = options.encode(Some(query));
        match method {
            QueryMethod::Get => Request::get(self.path("")).params(params).accept(accept),
            QueryMethod::Post => {
                let text = params
                    .remove("query")
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                Request::post(self.path(""))
                    .params(params)
                    .body(text, ContentType::SparqlQuery)
                    .accept(accept)
            }
        }
    }

    /// Run a query and return the raw body in the requested format
    pub async fn query_raw(
        &self,
        query: &str,
        options: &QueryOptions,
        accept: ContentType,
        method: QueryMethod,
    ) -> ClientResult<String> {
        let response = self
            .send(self.query_request(query, options, accept, method))
            .await?;
        Ok(response.body)
    }

    /// Run a SELECT query via GET
    pub async fn query(&self, query: &str, options: &QueryOptions) -> ClientResult<SelectResults> {
        let body = self
            .query_raw(query, options, ContentType::SparqlResultsJson, QueryMethod::Get)
            .await?;
        results::parse_select(&body)
    }

    /// Run a SELECT query via POST, for queries too long for a URL
    pub async fn query_post(
        &self,
        query: &str,
        options: &QueryOptions,
    ) -> ClientResult<SelectResults> {
        let body = self
            .query_raw(query, options, ContentType::SparqlResultsJson, QueryMethod::Post)
            .await?;
        results::parse_select(&body)
    }

    /// Run an ASK query
    pub async fn ask(&self, query: &str, options: &QueryOptions) -> ClientResult<bool> {
        let body = self
            .query_raw(query, options, ContentType::SparqlResultsJson, QueryMethod::Get)
            .await?;
        results::parse_boolean(&body)
    }

    /// Run a CONSTRUCT query, returning RDF in `format`
    pub async fn construct(
        &self,
        query: &str,
        options: &QueryOptions,
        format: ContentType,
    ) -> ClientResult<String> {
        self.query_raw(query, options, format, QueryMethod::Get).await
    }

    /// Run a DESCRIBE query, returning RDF in `format`
    pub async fn describe(
        &self,
        query: &str,
        options: &QueryOptions,
        format: ContentType,
    ) -> ClientResult<String> {
        self.query_raw(query, options, format, QueryMethod::Get).await
    }

    // ---------------------------------------------------------------
    // SPARQL update and statements
    // ---------------------------------------------------------------

    /// Execute a SPARQL update
    pub async fn update(&self, update: &str, options: &UpdateOptions) -> ClientResult<()> {
        let request = Request::post(self.path("/statements"))
            .params(options.encode(None))
            .body(update, ContentType::SparqlUpdate);
        self.send(request).await?;
        Ok(())
    }

    /// Matching statements as RDF/JSON
    pub async fn get_statements(&self, filter: &StatementFilter) -> ClientResult<serde_json::Value> {
        let request = Request::get(self.path("/statements"))
            .params(filter.encode())
            .accept(ContentType::RdfJson);
        self.send(request).await?.json()
    }

    /// Matching statements serialized in `format`
    pub async fn export(&self, filter: &StatementFilter, format: ContentType) -> ClientResult<String> {
        let request = Request::get(self.path("/statements"))
            .params(filter.encode())
            .accept(format);
        Ok(self.send(request).await?.body)
    }

    /// Append RDF data
    pub async fn add(
        &self,
        data: &str,
        content_type: ContentType,
        options: &AddOptions,
    ) -> ClientResult<()> {
        let request = Request::post(self.path("/statements"))
            .params(options.encode())
            .body(data, content_type);
        self.send(request).await?;
        Ok(())
    }

    /// Append statements given as `oxrdf` quads
    pub async fn add_quads(&self, quads: &[Quad]) -> ClientResult<()> {
        self.add(&rdf::to_nquads(quads), ContentType::NQuads, &AddOptions::default())
            .await
    }

    /// Replace the contents of the given contexts (or the whole repository)
    pub async fn replace(
        &self,
        data: &str,
        content_type: ContentType,
        options: &AddOptions,
    ) -> ClientResult<()> {
        let request = Request::put(self.path("/statements"))
            .params(options.encode())
            .body(data, content_type);
        self.send(request).await?;
        Ok(())
    }

    /// Delete matching statements; an empty filter clears the repository
    pub async fn delete_statements(&self, filter: &StatementFilter) -> ClientResult<()> {
        let request = Request::delete(self.path("/statements")).params(filter.encode());
        self.send(request).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Metadata
    // ---------------------------------------------------------------

    /// Number of statements, optionally restricted to contexts
    pub async fn size(&self, contexts: &[String]) -> ClientResult<u64> {
        let request = Request::get(self.path("/size"))
            .params(encode_contexts(contexts))
            .accept(ContentType::Text);
        let response = self.send(request).await?;
        results::parse_size(&response.body)
    }

    /// Context identifiers in server order
    pub async fn contexts(&self) -> ClientResult<Vec<String>> {
        let request = Request::get(self.path("/contexts")).accept(ContentType::SparqlResultsJson);
        let body = self.send(request).await?.body;
        Ok(contexts_from_results(&results::parse_select(&body)?))
    }

    /// All namespace declarations, prefix → IRI
    pub async fn namespaces(&self) -> ClientResult<HashMap<String, String>> {
        let request = Request::get(self.path("/namespaces")).accept(ContentType::SparqlResultsJson);
        let body = self.send(request).await?.body;
        Ok(namespaces_from_results(&results::parse_select(&body)?))
    }

    /// Namespace IRI for a prefix, distinguishing absence from failure
    pub async fn lookup_namespace(&self, prefix: &str) -> Lookup<String> {
        let request = Request::get(self.path(&format!("/namespaces/{}", encode_segment(prefix))))
            .accept(ContentType::Text);
        Lookup::from_result(self.send(request).await.map(|r| r.body.trim().to_string()))
    }

    /// Namespace IRI for a prefix; `None` when absent or unreachable
    pub async fn get_namespace(&self, prefix: &str) -> Option<String> {
        self.lookup_namespace(prefix).await.found()
    }

    pub async fn set_namespace(&self, prefix: &str, namespace: &str) -> ClientResult<()> {
        let request = Request::put(self.path(&format!("/namespaces/{}", encode_segment(prefix))))
            .body(namespace, ContentType::Text);
        self.send(request).await?;
        Ok(())
    }

    pub async fn delete_namespace(&self, prefix: &str) -> ClientResult<()> {
        let request = Request::delete(self.path(&format!("/namespaces/{}", encode_segment(prefix))));
        self.send(request).await?;
        Ok(())
    }

    /// Remove every namespace declaration
    pub async fn clear_namespaces(&self) -> ClientResult<()> {
        self.send(Request::delete(self.path("/namespaces"))).await?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Transactions and graph store
    // ---------------------------------------------------------------

    /// Open a server-side transaction
    pub async fn begin_transaction(
        &self,
        isolation: Option<IsolationLevel>,
    ) -> ClientResult<Transaction> {
        Transaction::begin(self.transport.clone(), &self.id, isolation, self.timeout).await
    }

    /// Graph Store Protocol operations on this repository
    pub fn graph_store(&self) -> GraphStore {
        GraphStore::new(self.transport.clone(), &self.id, self.timeout)
    }
}

impl std::fmt::Debug for RepositoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryClient")
            .field("id", &self.id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
