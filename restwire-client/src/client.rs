//! The client used by generated REST stubs.
//!
//! A [`Client`] owns the base URL, default headers, interceptor chain and
//! transport. Requests are assembled with a [`RequestBuilder`]: path
//! parameters are substituted into `{name}` placeholders, query pairs are
//! appended, and the body is encoded as form, multipart or JSON data.
//!
//! # Example
//!
//! ```ignore
//! use restwire_client::Client;
//! use restwire_core::Value;
//!
//! let client = Client::builder("http://localhost:3000").build()?;
//!
//! let body = Value::record([("name", "Alice")]);
//! let response = client
//!     .post("/{path}")
//!     .path_param("path", "users")
//!     .query("q", "search term")
//!     .form(&body)
//!     .send()
//!     .await?
//!     .error_for_status()?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::future::{AbortRegistration, Abortable};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, header};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use restwire_core::{Boundary, FormEncoder, MultipartEncoder, Value};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::Instrument;

use crate::builder::ClientBuilder;
use crate::interceptor::InterceptorChain;
use crate::options::CallOptions;
use crate::request::{Request, Response};
use crate::transport::Exchange;
use crate::ClientError;

/// Characters left unescaped in path parameters and query pairs.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// HTTP client for REST services.
///
/// Cloning is cheap; clones share the interceptor list and the transport.
#[derive(Clone)]
pub struct Client {
    base_url: String,
    default_headers: HeaderMap,
    default_timeout: Option<Duration>,
    interceptors: InterceptorChain,
    transport: Arc<dyn Exchange>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .field("default_timeout", &self.default_timeout)
            .field("interceptors", &self.interceptors)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub(crate) fn new(
        base_url: String,
        default_headers: HeaderMap,
        default_timeout: Option<Duration>,
        interceptors: InterceptorChain,
        transport: Arc<dyn Exchange>,
    ) -> Self {
        Self {
            base_url,
            default_headers,
            default_timeout,
            interceptors,
            transport,
        }
    }

    /// Create a new [`ClientBuilder`] for `base_url`.
    pub fn builder<S: Into<String>>(base_url: S) -> ClientBuilder {
        ClientBuilder::new(base_url)
    }

    /// The base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured interceptors.
    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// Start a request for `path`, relative to the base URL.
    ///
    /// `path` may contain `{name}` placeholders filled in with
    /// [`RequestBuilder::path_param`].
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, path)
    }

    /// Start a `GET` request.
    pub fn get(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    /// Start a `POST` request.
    pub fn post(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::POST, path)
    }

    /// Start a `PUT` request.
    pub fn put(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::PUT, path)
    }

    /// Start a `PATCH` request.
    pub fn patch(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::PATCH, path)
    }

    /// Start a `DELETE` request.
    pub fn delete(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::DELETE, path)
    }

    /// Start a `HEAD` request.
    pub fn head(&self, path: &str) -> RequestBuilder<'_> {
        self.request(Method::HEAD, path)
    }

    /// Run a prepared request through the interceptors and the transport,
    /// using the client's default timeout.
    pub async fn execute(&self, request: Request) -> Result<Response, ClientError> {
        self.dispatch(request, self.default_timeout).await
    }

    async fn dispatch(
        &self,
        request: Request,
        timeout: Option<Duration>,
    ) -> Result<Response, ClientError> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!(
            "http.request",
            http.method = %request.method,
            http.url = %request.uri,
            otel.kind = "client",
        );

        let call = self.interceptors.proceed(request, self.transport.as_ref());
        let call = async move {
            match timeout {
                Some(duration) => tokio::time::timeout(duration, call)
                    .await
                    .map_err(|_| ClientError::Timeout(duration))?,
                None => call.await,
            }
        };

        #[cfg(feature = "tracing")]
        let call = call.instrument(span);

        call.await
    }
}

/// Builder for a single request.
///
/// Errors from header parsing or body encoding are kept until
/// [`send`](Self::send) or [`build`](Self::build), so calls can be chained.
#[must_use = "a RequestBuilder does nothing until it is sent"]
pub struct RequestBuilder<'a> {
    client: &'a Client,
    method: Method,
    path: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    options: CallOptions,
    error: Option<ClientError>,
}

impl std::fmt::Debug for RequestBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("path_params", &self.path_params)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("options", &self.options)
            .field("error", &self.error)
            .finish()
    }
}

impl<'a> RequestBuilder<'a> {
    fn new(client: &'a Client, method: Method, path: &str) -> Self {
        Self {
            client,
            method,
            path: path.to_owned(),
            path_params: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            options: CallOptions::default(),
            error: None,
        }
    }

    fn fail(mut self, error: ClientError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Replace the `{name}` placeholder in the path with `value`.
    ///
    /// The value is percent-encoded.
    pub fn path_param(mut self, name: &str, value: impl ToString) -> Self {
        self.path_params.push((name.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter when `value` is present.
    pub fn query_opt<T: ToString>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// Set a request header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = match name.parse() {
            Ok(name) => name,
            Err(_) => {
                let err = ClientError::InvalidRequest(format!("invalid header name: {}", name));
                return self.fail(err);
            }
        };
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
                self
            }
            Err(_) => {
                let err = ClientError::InvalidRequest(format!("invalid header value: {}", value));
                self.fail(err)
            }
        }
    }

    /// Set a raw body with its content type.
    pub fn body(mut self, content_type: HeaderValue, body: impl Into<Bytes>) -> Self {
        self.headers.insert(header::CONTENT_TYPE, content_type);
        self.body = body.into();
        self
    }

    /// Encode `value` as an `application/x-www-form-urlencoded` body.
    pub fn form(self, value: &Value) -> Self {
        let encoder = FormEncoder::new();
        match encoder.encode(value) {
            Ok(body) => self.body(HeaderValue::from_static(encoder.content_type()), body),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Encode `value` as a `multipart/form-data` body with a fresh boundary.
    pub fn multipart(self, value: &Value) -> Self {
        self.multipart_with_boundary(value, Boundary::random())
    }

    /// Encode `value` as a `multipart/form-data` body using `boundary`.
    pub fn multipart_with_boundary(self, value: &Value, boundary: Boundary) -> Self {
        let encoder = MultipartEncoder::new(boundary);
        let content_type = match HeaderValue::from_str(&encoder.content_type()) {
            Ok(content_type) => content_type,
            Err(_) => {
                let err = ClientError::InvalidRequest(format!(
                    "invalid multipart boundary: {}",
                    encoder.boundary()
                ));
                return self.fail(err);
            }
        };
        match encoder.encode(value) {
            Ok(body) => self.body(content_type, body),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Encode `value` as a JSON body.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => self.body(HeaderValue::from_static("application/json"), body),
            Err(e) => self.fail(ClientError::Encode(format!("JSON encoding failed: {}", e))),
        }
    }

    /// Apply per-call options.
    pub fn options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Assemble the [`Request`] without sending it.
    pub fn build(self) -> Result<Request, ClientError> {
        self.into_parts().map(|(request, _)| request)
    }

    fn into_parts(self) -> Result<(Request, Option<Duration>), ClientError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let url = build_url(
            &self.client.base_url,
            &self.path,
            &self.path_params,
            &self.query,
        )?;
        let uri: Uri = url
            .parse()
            .map_err(|e| ClientError::InvalidRequest(format!("invalid URL {}: {}", url, e)))?;

        let mut headers = self.client.default_headers.clone();
        headers.extend(self.headers);
        headers.extend(self.options.headers);

        let request = Request {
            method: self.method,
            uri,
            headers,
            body: self.body,
        };
        let timeout = self.options.timeout.or(self.client.default_timeout);
        Ok((request, timeout))
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response, ClientError> {
        let client = self.client;
        let (request, timeout) = self.into_parts()?;
        client.dispatch(request, timeout).await
    }

    /// Send the request, giving up with [`ClientError::Cancelled`] once the
    /// matching [`AbortHandle`](futures::future::AbortHandle) is aborted.
    pub async fn send_abortable(
        self,
        registration: AbortRegistration,
    ) -> Result<Response, ClientError> {
        Abortable::new(self.send(), registration)
            .await
            .map_err(|_| ClientError::Cancelled)?
    }
}

/// Join base URL and path, fill in path parameters and append the query.
///
/// Fails when a `{name}` placeholder has no matching path parameter.
fn build_url(
    base_url: &str,
    path: &str,
    path_params: &[(String, String)],
    query: &[(String, String)],
) -> Result<String, ClientError> {
    let mut path = path.to_owned();
    for (name, value) in path_params {
        let placeholder = format!("{{{}}}", name);
        let encoded = utf8_percent_encode(value, UNRESERVED).to_string();
        path = path.replace(&placeholder, &encoded);
    }
    if let Some(placeholder) = unfilled_placeholder(&path) {
        return Err(ClientError::InvalidRequest(format!(
            "missing path parameter for {} in {}",
            placeholder, path
        )));
    }

    let mut url = String::with_capacity(base_url.len() + path.len() + 1);
    url.push_str(base_url);
    if !path.is_empty() && !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(&path);

    for (index, (name, value)) in query.iter().enumerate() {
        let separator = if index == 0 && !url.contains('?') { '?' } else { '&' };
        url.push(separator);
        url.extend(utf8_percent_encode(name, UNRESERVED));
        url.push('=');
        url.extend(utf8_percent_encode(value, UNRESERVED));
    }
    Ok(url)
}

/// The first `{...}` left in the path part (before any `?`).
///
/// Substituted values are percent-encoded, so braces here always come from
/// the path template.
fn unfilled_placeholder(path: &str) -> Option<&str> {
    let path = path.split('?').next().unwrap_or(path);
    let start = path.find('{')?;
    let len = path[start..].find('}')?;
    Some(&path[start..=start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use futures::future::AbortHandle;
    use http::StatusCode;
    use restwire_core::FilePart;

    use crate::interceptor::{BoxFuture, FnInterceptor};

    /// Records requests and answers 200 with the request body.
    #[derive(Clone, Default)]
    struct EchoExchange {
        seen: Arc<Mutex<Vec<Request>>>,
    }

    impl Exchange for EchoExchange {
        fn exchange(&self, request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
            Box::pin(async move {
                let body = request.body.clone();
                self.seen.lock().unwrap().push(request);
                Ok(Response::new(StatusCode::OK, HeaderMap::new(), body))
            })
        }
    }

    /// Never answers.
    struct PendingExchange;

    impl Exchange for PendingExchange {
        fn exchange(&self, _request: Request) -> BoxFuture<'_, Result<Response, ClientError>> {
            Box::pin(futures::future::pending())
        }
    }

    fn client(exchange: impl Exchange + 'static) -> Client {
        Client::builder("http://localhost:3000/")
            .default_header("x-client", "restwire")
            .with_transport(exchange)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_url_substitutes_and_encodes() {
        let url = build_url(
            "http://h",
            "/users/{id}/files/{name}",
            &[
                ("id".into(), "42".into()),
                ("name".into(), "a b/c".into()),
            ],
            &[("q".into(), "x y".into()), ("page".into(), "2".into())],
        )
        .unwrap();
        assert_eq!(url, "http://h/users/42/files/a%20b%2Fc?q=x%20y&page=2");
    }

    #[test]
    fn test_build_url_rejects_unfilled_placeholder() {
        let err = build_url(
            "http://h",
            "/users/{id}/files/{name}",
            &[("id".into(), "1".into())],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(ref msg) if msg.contains("{name}")));

        // Braces inside a value are encoded and never mistaken for a placeholder.
        let url =
            build_url("http://h", "/tags/{tag}", &[("tag".into(), "{x}".into())], &[]).unwrap();
        assert_eq!(url, "http://h/tags/%7Bx%7D");
    }

    #[test]
    fn test_build_url_adds_missing_slash_and_keeps_existing_query() {
        assert_eq!(build_url("http://h", "items", &[], &[]).unwrap(), "http://h/items");
        assert_eq!(
            build_url("http://h", "/items?sort=asc", &[], &[("q".into(), "1".into())]).unwrap(),
            "http://h/items?sort=asc&q=1"
        );
        assert_eq!(build_url("http://h", "", &[], &[]).unwrap(), "http://h");
    }

    #[tokio::test]
    async fn test_form_request() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        let body = Value::record([("name", "Alice"), ("q", "a b")]);
        let response = client.post("/post").form(&body).send().await.unwrap();

        assert_eq!(response.body.as_ref(), b"name=Alice&q=a%20b");
        let seen = exchange.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::POST);
        assert_eq!(seen[0].uri, "http://localhost:3000/post");
        assert_eq!(
            seen[0].headers.get(header::CONTENT_TYPE).unwrap(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(seen[0].headers.get("x-client").unwrap(), "restwire");
    }

    #[tokio::test]
    async fn test_multipart_request_with_boundary() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        let body = Value::record([(
            "file",
            Value::from(FilePart::new("file", "a.txt", "hi").with_content_type("text/plain")),
        )]);
        let response = client
            .post("/upload")
            .multipart_with_boundary(&body, Boundary::new("B"))
            .send()
            .await
            .unwrap();

        assert_eq!(
            response.body.as_ref(),
            &b"--B\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a.txt\"\r\n\
               Content-Type: text/plain\r\n\r\nhi\r\n--B--"[..]
        );
        let seen = exchange.seen.lock().unwrap();
        assert_eq!(
            seen[0].headers.get(header::CONTENT_TYPE).unwrap(),
            "multipart/form-data; boundary=B"
        );
    }

    #[tokio::test]
    async fn test_multipart_request_random_boundary_matches_header() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        let body = Value::record([("field", "value")]);
        client.post("/upload").multipart(&body).send().await.unwrap();

        let seen = exchange.seen.lock().unwrap();
        let content_type = seen[0].headers[header::CONTENT_TYPE].to_str().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let expected_tail = format!("\r\n--{}--", boundary);
        assert!(seen[0].body.ends_with(expected_tail.as_bytes()));
    }

    #[tokio::test]
    async fn test_form_with_file_fails_before_sending() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        let body = Value::record([("f", Value::from(FilePart::new("f", "f.bin", "x")))]);
        let err = client.post("/post").form(&body).send().await.unwrap_err();

        assert!(matches!(err, ClientError::Body(_)));
        assert!(exchange.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_json_request_and_response() {
        #[derive(Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Hello {
            message: String,
        }

        let exchange = EchoExchange::default();
        let client = client(exchange.clone());
        let hello = Hello {
            message: "hi".into(),
        };

        let response = client
            .put("/{path}")
            .path_param("path", "hello")
            .query("q", "query")
            .json(&hello)
            .send()
            .await
            .unwrap();

        assert_eq!(response.json::<Hello>().unwrap(), hello);
        let seen = exchange.seen.lock().unwrap();
        assert_eq!(seen[0].uri, "http://localhost:3000/hello?q=query");
        assert_eq!(
            seen[0].headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_call_headers_override_defaults() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        client
            .get("/")
            .header("x-client", "builder")
            .options(CallOptions::new().header("x-request-id", "7"))
            .send()
            .await
            .unwrap();

        let seen = exchange.seen.lock().unwrap();
        assert_eq!(seen[0].headers.get("x-client").unwrap(), "builder");
        assert_eq!(seen[0].headers.get("x-request-id").unwrap(), "7");
    }

    #[tokio::test]
    async fn test_invalid_header_is_reported_on_send() {
        let client = client(EchoExchange::default());
        let err = client
            .get("/")
            .header("bad header", "v")
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_missing_path_param_is_not_sent() {
        let exchange = EchoExchange::default();
        let client = client(exchange.clone());

        let err = client.get("/users/{id}").send().await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidRequest(ref msg) if msg.contains("{id}")));
        assert!(exchange.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interceptors_see_built_request() {
        let exchange = EchoExchange::default();
        let client = Client::builder("http://localhost")
            .with_interceptor(FnInterceptor::new(|mut request, next| {
                Box::pin(async move {
                    request.headers.insert("x-signed", HeaderValue::from_static("yes"));
                    next.run(request).await
                })
            }))
            .with_transport(exchange.clone())
            .build()
            .unwrap();

        client.delete("/items/{id}").path_param("id", 9).send().await.unwrap();

        let seen = exchange.seen.lock().unwrap();
        assert_eq!(seen[0].method, Method::DELETE);
        assert_eq!(seen[0].uri, "http://localhost/items/9");
        assert_eq!(seen[0].headers.get("x-signed").unwrap(), "yes");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let client = client(PendingExchange);
        let err = client
            .get("/slow")
            .timeout(Duration::from_millis(50))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_abort_cancels_request() {
        let client = client(PendingExchange);
        let (handle, registration) = AbortHandle::new_pair();

        let call = client.get("/slow").send_abortable(registration);
        handle.abort();

        let err = call.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}
