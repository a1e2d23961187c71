//! Runtime for generated REST clients.
//!
//! This crate sends requests described by generated interface stubs. It
//! provides:
//!
//! - URL assembly with `{name}` path parameters and query pairs
//! - Form, multipart and JSON request bodies (see [`restwire_core`])
//! - An interceptor chain around every request
//! - Timeouts and cancellation
//! - A hyper-based transport with TLS and connection pooling
//!
//! ## Example
//!
//! ```ignore
//! use restwire_client::{Client, HeaderInterceptor, Value};
//!
//! let client = Client::builder("http://localhost:3000")
//!     .with_interceptor(HeaderInterceptor::new("authorization", "Bearer token"))
//!     .build()?;
//!
//! let body = Value::record([("name", "Alice"), ("city", "Rome")]);
//! let response = client
//!     .post("/{path}")
//!     .path_param("path", "users")
//!     .form(&body)
//!     .send()
//!     .await?
//!     .error_for_status()?;
//!
//! println!("{}", response.text()?);
//! ```
//!
//! ## Multipart Uploads
//!
//! File leaves in the body tree become file parts:
//!
//! ```ignore
//! use restwire_client::{FilePart, Value};
//!
//! let avatar = FilePart::new("avatar", "me.png", png_bytes).with_content_type("image/png");
//! let body = Value::record([
//!     ("user", Value::from("alice")),
//!     ("avatar", Value::from(avatar)),
//! ]);
//!
//! client.post("/upload").multipart(&body).send().await?;
//! ```
//!
//! ## Interceptors
//!
//! Interceptors run in the order they were added. Each receives the request
//! and a [`Next`] continuation; it may rewrite the request, forward it, or
//! answer on its own. See the [`interceptor`] module.
//!
//! ## Timeouts and Cancellation
//!
//! Set a default with [`ClientBuilder::timeout`] or per call with
//! [`CallOptions::timeout`]. An expired timeout returns
//! [`ClientError::Timeout`]. A call started with
//! [`RequestBuilder::send_abortable`] returns [`ClientError::Cancelled`] once
//! its [`AbortHandle`](futures::future::AbortHandle) fires. Dropping the
//! future also cancels the request.
//!
//! ## Feature Flags
//!
//! | Feature | Description | Dependencies |
//! |---------|-------------|--------------|
//! | `tracing` | Request spans and [`TracingInterceptor`] | `tracing` |
//!
//! When enabled, each request runs in an `http.request` span with
//! `http.method`, `http.url` and `otel.kind = "client"`.

mod builder;
mod client;
mod error;
pub mod interceptor;
mod options;
pub mod request;
pub mod transport;

pub use builder::ClientBuilder;
pub use client::{Client, RequestBuilder};
pub use error::ClientError;
pub use options::CallOptions;
pub use request::{Request, Response};

pub use interceptor::{
    BoxFuture, FnInterceptor, HeaderInterceptor, Interceptor, InterceptorChain, Next,
};
#[cfg(feature = "tracing")]
pub use interceptor::TracingInterceptor;

// Re-export transport types at the top level for convenience
pub use transport::{Exchange, HyperTransport, HyperTransportBuilder, TlsClientConfig};

// Re-export body types that generated code needs
pub use restwire_core::{
    Boundary, EncodeError, FilePart, FormEncoder, MultipartEncoder, Scalar, ToValue, Value,
};

pub use bytes::Bytes;
pub use futures::future::{AbortHandle, AbortRegistration};
pub use http::Method;
