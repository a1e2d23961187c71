//! Call options for per-request configuration.
//!
//! This module provides [`CallOptions`] for configuring individual requests
//! with timeouts and custom headers.

use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

use crate::ClientError;

/// Options for configuring individual requests.
///
/// Use this to set per-call timeouts or headers that differ from the client
/// defaults.
///
/// # Example
///
/// ```ignore
/// use restwire_client::CallOptions;
/// use std::time::Duration;
///
/// let options = CallOptions::new()
///     .timeout(Duration::from_secs(5))
///     .header("x-request-id", "abc-123");
///
/// let response = client
///     .get("/users/{id}")
///     .path_param("id", "42")
///     .options(options)
///     .send()
///     .await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Timeout for this specific call.
    /// If set, overrides the client's default timeout.
    pub(crate) timeout: Option<Duration>,
    /// Custom headers for this specific call.
    pub(crate) headers: HeaderMap,
}

impl CallOptions {
    /// Create new default call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for this call.
    ///
    /// The timeout covers the whole interceptor chain and the exchange.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Get the configured timeout, if any.
    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Add a custom header for this call.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// Try to add a custom header for this call.
    pub fn try_header(mut self, name: &str, value: &str) -> Result<Self, ClientError> {
        let name: HeaderName = name
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header name: {}", name)))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header value: {}", value)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Get the custom headers.
    pub fn get_headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_options_default() {
        let options = CallOptions::new();
        assert!(options.get_timeout().is_none());
        assert!(options.get_headers().is_empty());
    }

    #[test]
    fn test_call_options_timeout_and_headers() {
        let options = CallOptions::new()
            .timeout(Duration::from_secs(5))
            .header("x-request-id", "abc-123");

        assert_eq!(options.get_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(options.get_headers().get("x-request-id").unwrap(), "abc-123");
    }

    #[test]
    fn test_try_header_rejects_invalid_name() {
        let result = CallOptions::new().try_header("bad header", "v");
        assert!(matches!(result, Err(ClientError::InvalidRequest(_))));
    }
}
