//! Client builder.
//!
//! Provides a fluent API for configuring and building a [`Client`].

use std::sync::Arc;
use std::time::Duration;

use http::{HeaderMap, HeaderName, HeaderValue, Uri};

use crate::client::Client;
use crate::interceptor::{Interceptor, InterceptorChain};
use crate::transport::{Exchange, HyperTransport};
use crate::ClientError;

/// Builder for creating a [`Client`].
///
/// # Example
///
/// ```ignore
/// use restwire_client::{Client, HeaderInterceptor};
/// use std::time::Duration;
///
/// let client = Client::builder("http://localhost:3000")
///     .timeout(Duration::from_secs(30))
///     .with_interceptor(HeaderInterceptor::new("authorization", "Bearer token"))
///     .build()?;
/// ```
pub struct ClientBuilder {
    /// Base URL for the service (e.g., "http://localhost:3000").
    base_url: String,
    /// Headers added to every request.
    default_headers: HeaderMap,
    /// Default timeout for requests.
    default_timeout: Option<Duration>,
    /// Interceptors in the order they were added.
    interceptors: InterceptorChain,
    /// Transport override; a [`HyperTransport`] is created when unset.
    transport: Option<Arc<dyn Exchange>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("default_timeout", &self.default_timeout)
            .field("interceptors", &self.interceptors)
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new ClientBuilder with the given base URL.
    ///
    /// The base URL should include the scheme and host, e.g.,
    /// "http://localhost:3000". A trailing slash is removed.
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: HeaderMap::new(),
            default_timeout: None,
            interceptors: InterceptorChain::new(),
            transport: None,
        }
    }

    /// Add a header sent with every request.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn default_header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.default_headers.insert(name, value);
        self
    }

    /// Set the default timeout for requests.
    ///
    /// Individual calls can override it with
    /// [`CallOptions::timeout`](crate::CallOptions::timeout).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Append an interceptor.
    ///
    /// Interceptors run in the order they are added; the first one added sees
    /// the request first.
    pub fn with_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors = self.interceptors.with(Arc::new(interceptor));
        self
    }

    /// Use a custom transport instead of the default [`HyperTransport`].
    pub fn with_transport<T: Exchange + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Build the client.
    ///
    /// Fails if the base URL is not an absolute URI or if the default
    /// transport cannot be created.
    pub fn build(self) -> Result<Client, ClientError> {
        let base_url = self.base_url.trim_end_matches('/').to_owned();
        let uri: Uri = base_url
            .parse()
            .map_err(|e| ClientError::InvalidRequest(format!("invalid base URL {}: {}", base_url, e)))?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ClientError::InvalidRequest(format!(
                "base URL must be absolute: {}",
                base_url
            )));
        }

        let transport: Arc<dyn Exchange> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HyperTransport::new()?),
        };

        Ok(Client::new(
            base_url,
            self.default_headers,
            self.default_timeout,
            self.interceptors,
            transport,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::interceptor::BoxFuture;
    use crate::request::{Request, Response};

    struct NoopExchange;

    impl Exchange for NoopExchange {
        fn exchange(&self, _request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
            Box::pin(async { Err(ClientError::Cancelled) })
        }
    }

    #[test]
    fn test_trailing_slash_is_removed() {
        let client = ClientBuilder::new("http://localhost:3000/")
            .with_transport(NoopExchange)
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }

    #[test]
    fn test_relative_base_url_is_rejected() {
        let result = ClientBuilder::new("/api")
            .with_transport(NoopExchange)
            .build();
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn test_builder_collects_settings() {
        let builder = ClientBuilder::new("http://localhost")
            .default_header("x-api-key", "secret")
            .timeout(Duration::from_secs(3))
            .with_interceptor(crate::HeaderInterceptor::new("x-a", "1"));

        assert_eq!(builder.default_headers.get("x-api-key").unwrap(), "secret");
        assert_eq!(builder.default_timeout, Some(Duration::from_secs(3)));
        assert_eq!(builder.interceptors.len(), 1);
    }
}
