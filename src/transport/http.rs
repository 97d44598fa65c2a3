//! reqwest-backed transport

use super::{Request, Response, Transport};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, ErrorBody};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use tracing::debug;

/// HTTP transport for a single server.
///
/// The underlying reqwest `Client` is built once with the configured
/// default timeout and headers; credentials are attached to every request.
pub struct HttpTransport {
    client: Client,
    base_url: String,
    credentials: Option<(String, String)>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::Config(format!("invalid header name {:?}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::Config(format!("invalid header value for {}: {}", name, e)))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            credentials,
        })
    }

    fn url(&self, request: &Request) -> ClientResult<Url> {
        let raw = format!("{}{}", self.base_url, request.path);
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::Config(format!("invalid request URL {:?}: {}", raw, e)))?;

        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in request.params.iter() {
                pairs.append_pair(key, &value.to_string());
            }
        }

        Ok(url)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some((user, pass)) => builder.basic_auth(user, Some(pass)),
            None => builder,
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> ClientResult<Response> {
        let url = self.url(&request)?;
        debug!(
            method = %request.method,
            path = %request.path,
            timeout = ?request.timeout,
            "Sending request"
        );

        let mut builder = self.with_auth(self.client.request(request.method.clone(), url));
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type.as_str());
        }
        if let Some(accept) = request.accept {
            builder = builder.header(ACCEPT, accept.as_str());
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), path = %request.path, "Request failed");
            return Err(ClientError::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body: ErrorBody::parse(&body),
            });
        }

        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
