//! `application/x-www-form-urlencoded` body encoding.
//!
//! Leaves are written as `key=value` pairs joined by `&`. Keys are the
//! rendered [`KeyPath`] and go out verbatim; values are percent-encoded with
//! only ASCII alphanumerics left as-is.
//!
//! # Example
//!
//! ```
//! use restwire_core::{FormEncoder, Value};
//!
//! let body = Value::record([("q", "a b"), ("page", "2")]);
//! let encoded = FormEncoder::new().encode_to_string(&body)?;
//! assert_eq!(encoded, "q=a%20b&page=2");
//! # Ok::<(), restwire_core::EncodeError>(())
//! ```

use bytes::Bytes;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::EncodeError;
use crate::traverse::{LeafSink, traverse};
use crate::value::{FilePart, KeyPath, Scalar, Value};

/// Content type of form encoded bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encoder for URL-encoded form bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormEncoder;

impl FormEncoder {
    /// Create a form encoder.
    pub fn new() -> Self {
        FormEncoder
    }

    /// `Content-Type` header value for bodies produced by this encoder.
    pub fn content_type(&self) -> &'static str {
        FORM_CONTENT_TYPE
    }

    /// Encode `value` into form bytes.
    pub fn encode(&self, value: &Value) -> Result<Bytes, EncodeError> {
        self.encode_to_string(value).map(Bytes::from)
    }

    /// Encode `value` into a form string.
    ///
    /// An empty record encodes to the empty string. File leaves cannot be
    /// represented and fail with [`EncodeError::UnsupportedValueType`].
    pub fn encode_to_string(&self, value: &Value) -> Result<String, EncodeError> {
        let mut sink = FormSink::default();
        traverse(value, &mut sink)?;
        Ok(sink.out)
    }
}

#[derive(Default)]
struct FormSink {
    out: String,
}

impl LeafSink for FormSink {
    fn scalar(&mut self, path: &KeyPath, scalar: &Scalar) -> Result<(), EncodeError> {
        if !self.out.is_empty() {
            self.out.push('&');
        }
        self.out.push_str(&path.render());
        self.out.push('=');
        self.out
            .extend(utf8_percent_encode(scalar.as_str(), NON_ALPHANUMERIC));
        Ok(())
    }

    fn file(&mut self, path: &KeyPath, _file: &FilePart) -> Result<(), EncodeError> {
        Err(EncodeError::unsupported(path, "FilePart"))
    }
}
