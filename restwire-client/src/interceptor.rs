//! Interceptors for outgoing requests.
//!
//! Interceptors add cross-cutting logic around every request, such as:
//! - Adding authentication headers
//! - Logging
//! - Answering from a local stub without touching the network
//!
//! Interceptors run in the order they were added. Each one receives the
//! request and a [`Next`] continuation for the rest of the chain. It can
//! forward the (possibly modified) request with [`Next::run`], or return a
//! response of its own and skip everything after it, including the transport.
//! `Next::run` consumes the continuation, so a request is forwarded at most
//! once per interceptor call.
//!
//! # Example
//!
//! ```ignore
//! use restwire_client::{Client, FnInterceptor, HeaderInterceptor};
//!
//! let auth = HeaderInterceptor::new("authorization", "Bearer token123");
//! let logging = FnInterceptor::new(|request, next| {
//!     Box::pin(async move {
//!         println!("{} {}", request.method, request.uri);
//!         next.run(request).await
//!     })
//! });
//!
//! let client = Client::builder("http://localhost:3000")
//!     .with_interceptor(auth)
//!     .with_interceptor(logging)
//!     .build()?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{HeaderName, HeaderValue};

use crate::request::{Request, Response};
use crate::transport::Exchange;
use crate::ClientError;

/// Type alias for a boxed future returning a result.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A middleware around the request exchange.
pub trait Interceptor: Send + Sync {
    /// Handle `request`, usually by calling `next.run(request)`.
    ///
    /// Returning without calling `next` short-circuits the chain.
    fn intercept<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, ClientError>>;
}

impl<T: Interceptor + ?Sized> Interceptor for Arc<T> {
    fn intercept<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, ClientError>> {
        (**self).intercept(request, next)
    }
}

/// The remainder of an interceptor chain.
///
/// Holds the interceptors that have not run yet and the terminal exchange.
/// It is created fresh for each request and never shared between requests.
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    exchange: &'a dyn Exchange,
}

impl<'a> Next<'a> {
    /// Create a continuation that runs `interceptors` in order, then `exchange`.
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], exchange: &'a dyn Exchange) -> Self {
        Self {
            interceptors,
            exchange,
        }
    }

    /// Number of interceptors still ahead of the exchange.
    pub fn remaining(&self) -> usize {
        self.interceptors.len()
    }

    /// Forward `request` to the next interceptor, or to the exchange when
    /// none are left.
    pub async fn run(self, request: Request) -> Result<Response, ClientError> {
        match self.interceptors.split_first() {
            Some((current, rest)) => {
                let next = Next {
                    interceptors: rest,
                    exchange: self.exchange,
                };
                current.intercept(request, next).await
            }
            None => self.exchange.exchange(request).await,
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.interceptors.len())
            .finish_non_exhaustive()
    }
}

/// An ordered, immutable list of interceptors.
///
/// Cloning is cheap; the list is shared between clones and between
/// concurrent requests.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl std::fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("count", &self.interceptors.len())
            .finish()
    }
}

impl InterceptorChain {
    /// Create a new empty interceptor chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a chain with `interceptor` appended.
    pub fn with(&self, interceptor: Arc<dyn Interceptor>) -> Self {
        let mut interceptors = self.interceptors.to_vec();
        interceptors.push(interceptor);
        Self {
            interceptors: interceptors.into(),
        }
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Get the number of interceptors in the chain.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Run `request` through every interceptor and then `exchange`.
    pub async fn proceed(
        &self,
        request: Request,
        exchange: &dyn Exchange,
    ) -> Result<Response, ClientError> {
        Next::new(&self.interceptors, exchange).run(request).await
    }
}

impl FromIterator<Arc<dyn Interceptor>> for InterceptorChain {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Interceptor>>>(iter: I) -> Self {
        Self {
            interceptors: iter.into_iter().collect(),
        }
    }
}

/// A simple interceptor that sets a header on every request.
///
/// # Example
///
/// ```ignore
/// use restwire_client::HeaderInterceptor;
///
/// let auth = HeaderInterceptor::new("authorization", "Bearer token123");
/// let client = Client::builder("http://localhost:3000")
///     .with_interceptor(auth)
///     .build()?;
/// ```
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderInterceptor {
    /// Create a new header interceptor.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.parse().expect("invalid header name"),
            value: value.parse().expect("invalid header value"),
        }
    }

    /// Try to create a new header interceptor, returning an error if invalid.
    pub fn try_new(name: &str, value: &str) -> Result<Self, ClientError> {
        let name = name
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header name: {}", name)))?;
        let value = value
            .parse()
            .map_err(|_| ClientError::InvalidRequest(format!("invalid header value: {}", value)))?;
        Ok(Self { name, value })
    }

    /// Create a new header interceptor from pre-parsed values.
    pub fn from_parts(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Interceptor for HeaderInterceptor {
    fn intercept<'a>(
        &'a self,
        mut request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, ClientError>> {
        request
            .headers
            .insert(self.name.clone(), self.value.clone());
        Box::pin(next.run(request))
    }
}

/// A closure-based interceptor.
///
/// # Example
///
/// ```ignore
/// use restwire_client::FnInterceptor;
///
/// let logging = FnInterceptor::new(|request, next| {
///     Box::pin(async move {
///         println!("Calling: {}", request.uri);
///         let result = next.run(request).await;
///         println!("Call completed");
///         result
///     })
/// });
/// ```
pub struct FnInterceptor<F> {
    func: F,
}

impl<F> FnInterceptor<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Result<Response, ClientError>> + Send + Sync,
{
    /// Create a new function-based interceptor.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Interceptor for FnInterceptor<F>
where
    F: for<'a> Fn(Request, Next<'a>) -> BoxFuture<'a, Result<Response, ClientError>> + Send + Sync,
{
    fn intercept<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, ClientError>> {
        (self.func)(request, next)
    }
}

impl<F: Clone> Clone for FnInterceptor<F> {
    fn clone(&self) -> Self {
        Self {
            func: self.func.clone(),
        }
    }
}

impl<F> std::fmt::Debug for FnInterceptor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnInterceptor").finish()
    }
}

/// Logs every request and its outcome with `tracing`.
#[cfg(feature = "tracing")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingInterceptor;

#[cfg(feature = "tracing")]
impl Interceptor for TracingInterceptor {
    fn intercept<'a>(
        &'a self,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Result<Response, ClientError>> {
        Box::pin(async move {
            let method = request.method.clone();
            let uri = request.uri.clone();
            let started = std::time::Instant::now();
            tracing::debug!(%method, %uri, body_len = request.body.len(), "sending request");

            let result = next.run(request).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;
            match &result {
                Ok(response) => {
                    tracing::info!(%method, %uri, status = %response.status, elapsed_ms, "request completed")
                }
                Err(err) => tracing::warn!(%method, %uri, error = %err, elapsed_ms, "request failed"),
            }
            result
        })
    }
}
