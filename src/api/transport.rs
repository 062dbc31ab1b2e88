//! The HTTP transport seam.
//!
//! [`Client`](super::Client) never talks to the network directly. It builds an
//! [`HttpRequest`] and hands it to a [`Transport`], which returns the raw
//! status and body. [`HttpTransport`] is the default reqwest-backed implementation.

use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};

use super::error::{ApiError, Result};

/// Default connection timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A fully resolved request ready to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Whether the server certificate must be verified.
    pub verify_tls: bool,
}

/// A response body as delivered by the transport.
///
/// Transports that decode JSON themselves may hand back [`Body::Json`]; the
/// client then skips its own parsing step.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Json(Value),
}

/// A raw response from the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl HttpResponse {
    /// A response with a text body and no headers.
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Text(body.into()),
        }
    }

    /// A response with an already decoded JSON body and no headers.
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Json(body),
        }
    }
}

/// Performs one HTTP request.
///
/// Implementations own cancellation and timeouts. They must not retry.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// The default transport, backed by `reqwest`.
///
/// Holds one client that verifies certificates and one that does not, picked
/// per request from [`HttpRequest::verify_tls`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    verifying: reqwest::Client,
    permissive: reqwest::Client,
}

impl HttpTransport {
    /// Build the HTTP clients.
    pub fn new() -> Result<Self> {
        Ok(Self {
            verifying: build_http_client(true)?,
            permissive: build_http_client(false)?,
        })
    }

    fn client_for(&self, verify_tls: bool) -> &reqwest::Client {
        if verify_tls {
            &self.verifying
        } else {
            &self.permissive
        }
    }
}

fn build_http_client(verify_tls: bool) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(ApiError::from)
}

impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            verify_tls,
        } = request;

        let mut builder = self
            .client_for(verify_tls)
            .request(method, url.as_str())
            .headers(headers);
        if let Some(body) = body {
            trace!("Request body: {}", body);
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let text = response.text().await?;
        debug!(status = %status, bytes = text.len(), "Received response");

        Ok(HttpResponse {
            status,
            headers,
            body: Body::Text(text),
        })
    }
}
