//! Request transport
//!
//! Every client operation is translated into one [`Request`] and handed to a
//! [`Transport`]. [`HttpTransport`] is the production implementation.

mod http;

pub use http::HttpTransport;

use crate::content_type::ContentType;
use crate::error::ClientResult;
use crate::params::{ParamValue, Params};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
pub use reqwest::Method;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// A single request against the server, relative to the base URL
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path below the base URL, starting with `/`
    pub path: String,
    pub params: Params,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub content_type: Option<ContentType>,
    pub accept: Option<ContentType>,
    /// Overrides the client-wide timeout
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Params::new(),
            headers: Vec::new(),
            body: None,
            content_type: None,
            accept: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(Method::HEAD, path)
    }

    /// Merge encoded parameters into the request
    pub fn params(mut self, params: Params) -> Self {
        self.params.extend(params);
        self
    }

    pub fn param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body together with its content-type tag
    pub fn body(mut self, body: impl Into<String>, content_type: ContentType) -> Self {
        self.body = Some(body.into());
        self.content_type = Some(content_type);
        self
    }

    pub fn accept(mut self, accept: ContentType) -> Self {
        self.accept = Some(accept);
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A successful response
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Header value as a string, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends requests and returns decoded responses.
///
/// Implementations must map any non-success status to
/// [`ClientError::Http`](crate::ClientError::Http).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> ClientResult<Response>;
}
