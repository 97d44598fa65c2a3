//! Server-side transactions
//!
//! A [`Transaction`] wraps one transaction resource on the server. All
//! operations go to the same URL and are told apart by the `action`
//! parameter plus the HTTP method.
//!
//! The handle is either active or closed. It closes exactly once, when a
//! `commit` or `rollback` request succeeds. A failed commit/rollback leaves
//! it active so the caller may retry, check it with `ping`/`size`, or give
//! up. Every operation on a closed handle fails with
//! [`ClientError::TransactionNotActive`] before anything is sent.
//!
//! `commit` and `rollback` take `&mut self`, so no other operation on the
//! same handle can be in flight while the liveness flag changes.

use crate::content_type::ContentType;
use crate::error::{ClientError, ClientResult};
use crate::params::{encode_contexts, AddOptions, QueryOptions, StatementFilter, UpdateOptions};
use crate::rdf;
use crate::repository::encode_segment;
use crate::results::{self, SelectResults};
use crate::transport::{Method, Request, Transport};
use oxrdf::Quad;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Isolation level requested when starting a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    None,
    ReadUncommitted,
    ReadCommitted,
    SnapshotRead,
    Snapshot,
    Serializable,
}

impl IsolationLevel {
    pub fn name(&self) -> &'static str {
        match self {
            IsolationLevel::None => "NONE",
            IsolationLevel::ReadUncommitted => "READ_UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ_COMMITTED",
            IsolationLevel::SnapshotRead => "SNAPSHOT_READ",
            IsolationLevel::Snapshot => "SNAPSHOT",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// IRI sent as the `isolation-level` parameter
    pub fn iri(&self) -> String {
        format!("http://www.openrdf.org/schema/sesame#{}", self.name())
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Action discriminator sent with every transaction request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionAction {
    Query,
    Update,
    Add,
    Delete,
    Get,
    Size,
    Ping,
    Commit,
    Rollback,
}

impl TransactionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionAction::Query => "QUERY",
            TransactionAction::Update => "UPDATE",
            TransactionAction::Add => "ADD",
            TransactionAction::Delete => "DELETE",
            TransactionAction::Get => "GET",
            TransactionAction::Size => "SIZE",
            TransactionAction::Ping => "PING",
            TransactionAction::Commit => "COMMIT",
            TransactionAction::Rollback => "ROLLBACK",
        }
    }

    fn method(&self) -> Method {
        match self {
            TransactionAction::Rollback => Method::DELETE,
            _ => Method::PUT,
        }
    }
}

/// Extract the transaction id from a `Location` header value
fn transaction_id_from_location(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next()?;
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Handle to an open server-side transaction
pub struct Transaction {
    transport: Arc<dyn Transport>,
    repository_id: String,
    transaction_id: String,
    active: bool,
    timeout: Option<Duration>,
}

impl Transaction {
    /// Start a transaction on a repository
    pub(crate) async fn begin(
        transport: Arc<dyn Transport>,
        repository_id: &str,
        isolation: Option<IsolationLevel>,
        timeout: Option<Duration>,
    ) -> ClientResult<Self> {
        let path = format!("/repositories/{}/transactions", encode_segment(repository_id));
        let mut request = Request::post(path).timeout(timeout);
        if let Some(level) = isolation {
            request = request.param("isolation-level", level.iri());
        }

        let response = transport.send(request).await?;
        let transaction_id = response
            .header("location")
            .and_then(transaction_id_from_location)
            .ok_or(ClientError::MissingTransactionId)?;

        info!(
            repository = %repository_id,
            transaction = %transaction_id,
            isolation = ?isolation,
            "Started transaction"
        );

        Ok(Self {
            transport,
            repository_id: repository_id.to_string(),
            transaction_id,
            active: true,
            timeout,
        })
    }

    pub fn id(&self) -> &str {
        &self.transaction_id
    }

    pub fn repository_id(&self) -> &str {
        &self.repository_id
    }

    /// Whether commit/rollback has not yet succeeded
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn path(&self) -> String {
        format!(
            "/repositories/{}/transactions/{}",
            encode_segment(&self.repository_id),
            encode_segment(&self.transaction_id)
        )
    }

    fn ensure_active(&self) -> ClientResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(ClientError::TransactionNotActive {
                transaction_id: self.transaction_id.clone(),
            })
        }
    }

    /// Guarded request template shared by every action
    fn request(&self, action: TransactionAction) -> ClientResult<Request> {
        self.ensure_active()?;
        Ok(Request::new(action.method(), self.path())
            .param("action", action.as_str())
            .timeout(self.timeout))
    }

    /// Run a SELECT query inside the transaction
    pub async fn query(&self, query: &str, options: &QueryOptions) -> ClientResult<SelectResults> {
        let body = self
            .query_raw(query, options, ContentType::SparqlResultsJson)
            .await?;
        results::parse_select(&body)
    }

    /// Run any query form, returning the body in the requested format
    pub async fn query_raw(
        &self,
        query: &str,
        options: &QueryOptions,
        accept: ContentType,
    ) -> ClientResult<String> {
        let request = self.request(TransactionAction::Query)?;
        let mut params = options.encode(Some(query));
        params.remove("query");

        let response = self
            .transport
            .send(
                request
                    .params(params)
                    .body(query, ContentType::SparqlQuery)
                    .accept(accept),
            )
            .await?;
        Ok(response.body)
    }

    /// Execute a SPARQL update inside the transaction
    pub async fn update(&self, update: &str, options: &UpdateOptions) -> ClientResult<()> {
        let request = self.request(TransactionAction::Update)?;
        self.transport
            .send(
                request
                    .params(options.encode(None))
                    .body(update, ContentType::SparqlUpdate),
            )
            .await?;
        Ok(())
    }

    /// Add RDF data in the given serialization
    pub async fn add(
        &self,
        data: &str,
        content_type: ContentType,
        options: &AddOptions,
    ) -> ClientResult<()> {
        let request = self.request(TransactionAction::Add)?;
        self.transport
            .send(request.params(options.encode()).body(data, content_type))
            .await?;
        Ok(())
    }

    /// Add statements given as `oxrdf` quads
    pub async fn add_quads(&self, quads: &[Quad]) -> ClientResult<()> {
        self.add(&rdf::to_nquads(quads), ContentType::NQuads, &AddOptions::default())
            .await
    }

    /// Remove the statements contained in `data`
    pub async fn delete(&self, data: &str, content_type: ContentType) -> ClientResult<()> {
        let request = self.request(TransactionAction::Delete)?;
        self.transport.send(request.body(data, content_type)).await?;
        Ok(())
    }

    /// Fetch matching statements as seen by this transaction
    pub async fn get_statements(
        &self,
        filter: &StatementFilter,
        accept: ContentType,
    ) -> ClientResult<String> {
        let request = self.request(TransactionAction::Get)?;
        let response = self
            .transport
            .send(request.params(filter.encode()).accept(accept))
            .await?;
        Ok(response.body)
    }

    /// Number of statements visible in this transaction
    pub async fn size(&self, contexts: &[String]) -> ClientResult<u64> {
        let request = self.request(TransactionAction::Size)?;
        let response = self
            .transport
            .send(request.params(encode_contexts(contexts)).accept(ContentType::Text))
            .await?;
        results::parse_size(&response.body)
    }

    /// Keep the transaction alive on the server without touching data
    pub async fn ping(&self) -> ClientResult<()> {
        let request = self.request(TransactionAction::Ping)?;
        self.transport.send(request).await?;
        debug!(transaction = %self.transaction_id, "Pinged transaction");
        Ok(())
    }

    /// Commit. The handle closes only if the server confirms.
    pub async fn commit(&mut self) -> ClientResult<()> {
        self.finish(TransactionAction::Commit).await
    }

    /// Roll back. The handle closes only if the server confirms.
    pub async fn rollback(&mut self) -> ClientResult<()> {
        self.finish(TransactionAction::Rollback).await
    }

    async fn finish(&mut self, action: TransactionAction) -> ClientResult<()> {
        let request = self.request(action)?;
        self.transport.send(request).await?;
        self.active = false;
        info!(
            repository = %self.repository_id,
            transaction = %self.transaction_id,
            action = action.as_str(),
            "Closed transaction"
        );
        Ok(())
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("repository_id", &self.repository_id)
            .field("transaction_id", &self.transaction_id)
            .field("active", &self.active)
            .finish()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.active {
            warn!(
                transaction = %self.transaction_id,
                "Transaction dropped while active; it stays open until the server times it out"
            );
        }
    }
}
