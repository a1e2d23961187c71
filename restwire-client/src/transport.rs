//! HTTP transport layer.
//!
//! The [`Exchange`] trait is the boundary between the interceptor chain and
//! the network: it sends one request and returns its response. A chain calls
//! it at most once per request.
//!
//! [`HyperTransport`] is the default implementation, built on hyper_util's
//! legacy client. It supports:
//!
//! - HTTP/1.1 and HTTP/2 with automatic protocol negotiation
//! - TLS with rustls (ring provider, system root certificates)
//! - Connection pooling
//! - Tower service integration for middleware
//!
//! # Example
//!
//! ```ignore
//! use restwire_client::transport::HyperTransport;
//! use std::time::Duration;
//!
//! let transport = HyperTransport::builder()
//!     .http2_only(true)
//!     .pool_idle_timeout(Duration::from_secs(60))
//!     .build()?;
//! ```

mod connector;
mod hyper;

use std::sync::Arc;

pub use self::connector::{build_https_connector, default_tls_config};
pub use self::hyper::{HyperTransport, HyperTransportBuilder};

// Re-export rustls types that users might need for TLS configuration
pub use rustls::ClientConfig as TlsClientConfig;

use crate::interceptor::BoxFuture;
use crate::request::{Request, Response};
use crate::ClientError;

/// Performs the network exchange for one request.
///
/// Implement this to plug in a different HTTP stack or an in-memory fake.
pub trait Exchange: Send + Sync {
    /// Send `request` and return the buffered response.
    fn exchange(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>>;
}

impl<T: Exchange + ?Sized> Exchange for Arc<T> {
    fn exchange(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
        (**self).exchange(request)
    }
}
