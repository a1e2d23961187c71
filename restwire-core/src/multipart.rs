//! `multipart/form-data` body encoding.
//!
//! Each leaf becomes one part delimited by the boundary:
//!
//! ```text
//! --{boundary}\r\n
//! Content-Disposition: form-data; name="{key}"\r\n
//! \r\n
//! {value}\r\n
//! ```
//!
//! File leaves add `; filename="{file name}"` to the disposition and a
//! `Content-Type` line. The body ends with `--{boundary}--` and no trailing
//! CRLF. Values and file bytes are embedded as-is; callers that pick their own
//! boundary must make sure it does not occur in the payload.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;
use rand::distr::Alphanumeric;

use crate::EncodeError;
use crate::traverse::{LeafSink, traverse};
use crate::value::{FilePart, KeyPath, Scalar, Value};

const BOUNDARY_PREFIX: &str = "restwire-";
const BOUNDARY_RANDOM_LEN: usize = 32;

/// Delimiter token between multipart parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Boundary(String);

impl Boundary {
    /// Use a caller-chosen boundary.
    pub fn new<S: Into<String>>(token: S) -> Self {
        Boundary(token.into())
    }

    /// Generate a fresh random boundary.
    pub fn random() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(BOUNDARY_RANDOM_LEN)
            .map(char::from)
            .collect();
        Boundary(format!("{}{}", BOUNDARY_PREFIX, suffix))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoder for multipart form bodies.
#[derive(Clone, Debug)]
pub struct MultipartEncoder {
    boundary: Boundary,
}

impl MultipartEncoder {
    /// Create an encoder using `boundary`.
    pub fn new(boundary: Boundary) -> Self {
        Self { boundary }
    }

    /// Create an encoder with a freshly generated boundary.
    pub fn with_random_boundary() -> Self {
        Self::new(Boundary::random())
    }

    /// The boundary used by this encoder.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// `Content-Type` header value, including the boundary parameter.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encode `value` into a multipart body.
    ///
    /// A file at the document root has no key path and is named after its
    /// own field name. Files inside a sequence are keyed by position like any
    /// other item: `docs: [a, b]` produces parts named `docs[0]` and
    /// `docs[1]`, never two parts that share the name `docs`.
    pub fn encode(&self, value: &Value) -> Result<Bytes, EncodeError> {
        let mut sink = MultipartSink {
            boundary: self.boundary.as_str(),
            out: BytesMut::new(),
        };
        traverse(value, &mut sink)?;
        Ok(sink.finish())
    }
}

struct MultipartSink<'a> {
    boundary: &'a str,
    out: BytesMut,
}

impl MultipartSink<'_> {
    fn open_part(&mut self, name: &str) {
        self.out.put_slice(b"--");
        self.out.put_slice(self.boundary.as_bytes());
        self.out
            .put_slice(b"\r\nContent-Disposition: form-data; name=\"");
        self.out.put_slice(name.as_bytes());
        self.out.put_u8(b'"');
    }

    fn finish(mut self) -> Bytes {
        self.out.put_slice(b"--");
        self.out.put_slice(self.boundary.as_bytes());
        self.out.put_slice(b"--");
        self.out.freeze()
    }
}

impl LeafSink for MultipartSink<'_> {
    fn scalar(&mut self, path: &KeyPath, scalar: &Scalar) -> Result<(), EncodeError> {
        self.open_part(&path.render());
        self.out.put_slice(b"\r\n\r\n");
        self.out.put_slice(scalar.as_str().as_bytes());
        self.out.put_slice(b"\r\n");
        Ok(())
    }

    fn file(&mut self, path: &KeyPath, file: &FilePart) -> Result<(), EncodeError> {
        let name = if path.is_root() {
            file.field_name().to_owned()
        } else {
            path.render()
        };
        self.open_part(&name);
        self.out.put_slice(b"; filename=\"");
        self.out.put_slice(file.file_name().as_bytes());
        self.out.put_slice(b"\"\r\nContent-Type: ");
        self.out.put_slice(file.content_type().as_bytes());
        self.out.put_slice(b"\r\n\r\n");
        self.out.put_slice(file.bytes());
        self.out.put_slice(b"\r\n");
        Ok(())
    }
}
