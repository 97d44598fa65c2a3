//! Error types for the triple store client

use thiserror::Error;

/// Best-effort decoded body of a failed response
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    /// Body parsed as JSON
    Json(serde_json::Value),
    /// Non-JSON body
    Text(String),
    /// No body
    Empty,
}

impl ErrorBody {
    /// Decode a raw error body, preferring JSON
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ErrorBody::Empty;
        }
        match serde_json::from_str(trimmed) {
            Ok(value) => ErrorBody::Json(value),
            Err(_) => ErrorBody::Text(trimmed.to_string()),
        }
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorBody::Json(value) => write!(f, "{}", value),
            ErrorBody::Text(text) => write!(f, "{}", text),
            ErrorBody::Empty => write!(f, "<empty>"),
        }
    }
}

/// Errors that can occur when talking to the triple store
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server answered with a non-success status code
    #[error("HTTP {status} {status_text}: {body}")]
    Http {
        status: u16,
        status_text: String,
        body: ErrorBody,
    },

    /// Request never produced a response (connect failure, timeout, I/O)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Operation attempted on a committed or rolled back transaction
    #[error("Transaction {transaction_id} is no longer active")]
    TransactionNotActive { transaction_id: String },

    /// Transaction begin response carried no usable Location header
    #[error("Server did not return a transaction location")]
    MissingTransactionId,

    /// Size endpoint returned something other than a non-negative integer
    #[error("Invalid size response: {body:?}")]
    InvalidSize { body: String },

    /// Response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status code, if the server produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Http { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            ClientError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Outcome of probing for a remote resource.
///
/// Keeps "absent" apart from "could not ask". Only a few call sites
/// collapse this into a plain `bool` or `Option`.
#[derive(Debug)]
pub enum Lookup<T> {
    /// Resource exists
    Found(T),
    /// Server reported 404
    NotFound,
    /// Any other failure
    Failed(ClientError),
}

impl<T> Lookup<T> {
    /// Classify a request result
    pub fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(value) => Lookup::Found(value),
            Err(e) if e.is_not_found() => Lookup::NotFound,
            Err(e) => Lookup::Failed(e),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Collapse "not found" and failures into `None`
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
            Lookup::Failed(e) => {
                tracing::warn!("Treating failed lookup as absent: {}", e);
                None
            }
        }
    }

    /// Propagate failures, keep "not found" as `None`
    pub fn into_result(self) -> ClientResult<Option<T>> {
        match self {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NotFound => Ok(None),
            Lookup::Failed(e) => Err(e),
        }
    }
}
