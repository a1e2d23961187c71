//! Hyper-based HTTP transport.
//!
//! This module provides [`HyperTransport`], the main transport implementation
//! using hyper_util's legacy client.

use std::error::Error as _;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use rustls::ClientConfig;
use tower_service::Service;

use super::Exchange;
use super::connector::{build_https_connector, default_tls_config};
use crate::interceptor::BoxFuture;
use crate::request::{Request, Response};
use crate::ClientError;

/// Type alias for the hyper client with HTTPS connector.
type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP transport using hyper_util's legacy client.
///
/// This transport provides HTTP/1.1 and HTTP/2 support with TLS,
/// connection pooling, and automatic protocol negotiation via ALPN.
/// Cloning is cheap and clones share the connection pool.
///
/// # Example
///
/// ```ignore
/// use restwire_client::transport::HyperTransport;
///
/// let transport = HyperTransport::builder().build()?;
///
/// let client = Client::builder("https://api.example.com")
///     .with_transport(transport)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    /// Whether HTTP/2 only mode is enabled.
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ClientError> {
        Self::builder().build()
    }

    /// Send an HTTP request and receive the streaming response.
    pub async fn request(
        &self,
        request: http::Request<Full<Bytes>>,
    ) -> Result<http::Response<Incoming>, ClientError> {
        self.client.request(request).await.map_err(map_client_error)
    }

    /// Check if this transport is configured for HTTP/2 only.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}

impl Exchange for HyperTransport {
    fn exchange(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
        Box::pin(async move {
            let response = self.request(request.into_http().map(Full::new)).await?;
            let (parts, body) = response.into_parts();
            let body = body
                .collect()
                .await
                .map_err(|e| {
                    if e.is_canceled() {
                        ClientError::Cancelled
                    } else {
                        ClientError::Transport(format!("failed to read response body: {}", e))
                    }
                })?
                .to_bytes();
            Ok(Response::from_http(http::Response::from_parts(parts, body)))
        })
    }
}

/// Map a client error, surfacing cancellation from hyper as its own variant.
fn map_client_error(err: hyper_util::client::legacy::Error) -> ClientError {
    let canceled = err
        .source()
        .and_then(|source| source.downcast_ref::<hyper::Error>())
        .is_some_and(hyper::Error::is_canceled);
    if canceled {
        return ClientError::Cancelled;
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(error = ?err, "transport request failed");

    ClientError::Transport(format!("request failed: {}", err))
}

/// Builder for [`HyperTransport`].
///
/// Provides configuration options for the HTTP transport including
/// TLS settings, HTTP/2 mode, and connection pooling.
///
/// # Example
///
/// ```ignore
/// use restwire_client::transport::HyperTransportBuilder;
/// use std::time::Duration;
///
/// let transport = HyperTransportBuilder::new()
///     .http2_only(true)
///     .pool_idle_timeout(Duration::from_secs(90))
///     .build()?;
/// ```
pub struct HyperTransportBuilder {
    /// Custom TLS configuration.
    tls_config: Option<ClientConfig>,
    /// Force HTTP/2 only (for h2c or when HTTP/2 is required).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Set a custom TLS configuration.
    ///
    /// Use this to configure custom root certificates, client certificates for mTLS,
    /// or other TLS settings.
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Enable HTTP/2 only mode.
    ///
    /// When enabled, the transport will use HTTP/2 directly without
    /// the HTTP/1.1 upgrade handshake.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, ClientError> {
        let tls_config = match self.tls_config {
            Some(config) => config,
            None => default_tls_config()?,
        };
        let https_connector = build_https_connector(tls_config);

        let mut builder = Client::builder(TokioExecutor::new());

        // Configure connection pool timer (required for pool_idle_timeout to work)
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        let client = builder.build(https_connector);

        Ok(HyperTransport {
            client,
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}

impl Service<http::Request<Full<Bytes>>> for HyperTransport {
    type Response = http::Response<Incoming>;
    type Error = ClientError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // hyper_util legacy::Client is always ready
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Full<Bytes>>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move { client.request(req).await.map_err(map_client_error) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = HyperTransportBuilder::new();
        assert!(!builder.http2_only);
        assert_eq!(builder.pool_max_idle_per_host, 32);
        assert!(builder.pool_idle_timeout.is_some());
    }

    #[test]
    fn test_builder_pool_settings() {
        let builder = HyperTransportBuilder::new()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(10);
        assert_eq!(builder.pool_idle_timeout, Some(Duration::from_secs(60)));
        assert_eq!(builder.pool_max_idle_per_host, 10);

        let builder = builder.pool_idle_timeout_none();
        assert!(builder.pool_idle_timeout.is_none());
    }

    #[tokio::test]
    async fn test_build_transport_http2_only() {
        let transport = HyperTransportBuilder::new().http2_only(true).build().unwrap();
        assert!(transport.is_http2_only());
    }

    #[tokio::test]
    async fn test_tower_service_round_trip() {
        let app = axum::Router::new().route(
            "/echo",
            axum::routing::post(|body: Bytes| async move { body }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut service = HyperTransport::new().unwrap();
        futures::future::poll_fn(|cx| service.poll_ready(cx))
            .await
            .unwrap();

        let request = http::Request::post(format!("http://{}/echo", addr))
            .body(Full::new(Bytes::from_static(b"ping")))
            .unwrap();
        let response = service.call(request).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ping");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HyperTransport::new().unwrap();
        let uri: http::Uri = format!("http://{}/", addr).parse().unwrap();
        let err = transport
            .exchange(Request::new(http::Method::GET, uri))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Transport(_)));
    }
}
