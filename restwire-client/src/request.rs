//! Owned HTTP request and response values.
//!
//! These are the values that flow through the interceptor chain. Interceptors
//! may rewrite any field of a [`Request`] before forwarding it, or build a
//! [`Response`] themselves to answer without reaching the transport.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri, header};
use serde::de::DeserializeOwned;

use crate::ClientError;

/// An outgoing request with a fully buffered body.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URI.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded body (empty when there is none).
    pub body: Bytes,
}

impl Request {
    /// Create a request with no headers and an empty body.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Replace the body and set its `Content-Type`.
    pub fn with_body(mut self, content_type: HeaderValue, body: Bytes) -> Self {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = body;
        self
    }

    /// Get a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Convert into an [`http::Request`].
    pub fn into_http(self) -> http::Request<Bytes> {
        let mut request = http::Request::new(self.body);
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        request
    }
}

/// A response with a fully buffered body.
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    /// Create a new response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Build from an [`http::Response`] whose body has been collected.
    pub fn from_http(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Turn a non-2xx response into [`ClientError::Status`].
    pub fn error_for_status(self) -> Result<Self, ClientError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ClientError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ClientError::Decode(format!("JSON decoding failed: {}", e)))
    }

    /// Decode the body as UTF-8 text.
    pub fn text(&self) -> Result<String, ClientError> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| ClientError::Decode(format!("response body is not UTF-8: {}", e)))
    }
}
