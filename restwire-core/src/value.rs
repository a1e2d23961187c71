//! Structured value model shared by the body encoders.
//!
//! Request bodies are converted into a [`Value`] tree before encoding. The tree
//! is a plain sum type: scalars, file attachments, ordered sequences and
//! ordered records. Field and item order is preserved and decides wire order.
//!
//! # Example
//!
//! ```
//! use restwire_core::{FilePart, Value};
//!
//! let body = Value::record([
//!     ("name", Value::from("Alice")),
//!     ("tags", Value::sequence(["a", "b"])),
//!     ("avatar", Value::from(FilePart::new("avatar", "me.png", vec![0x89, b'P']))),
//! ]);
//! assert!(body.is_record());
//! ```

use std::fmt;

use bytes::Bytes;
use serde::Serialize;

use crate::EncodeError;

/// Content type used for file parts that do not declare one.
pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// One step in a [`KeyPath`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named record field, rendered as its literal text.
    Field(String),
    /// A sequence position, rendered as `[i]`.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => f.write_str(name),
            PathSegment::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Path from the document root to a leaf.
///
/// Extending a path returns a new path, so sibling branches never observe
/// each other's segments.
///
/// Rendering concatenates segments with no separator: the path
/// `address` / `city` renders as `addresscity`, and `items` / `0` renders as
/// `items[0]`. Generated clients rely on these exact keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<PathSegment>,
}

impl KeyPath {
    /// The empty path of the document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// A copy of this path extended with a named field.
    pub fn field(&self, name: &str) -> Self {
        self.with(PathSegment::Field(name.to_owned()))
    }

    /// A copy of this path extended with a sequence index.
    pub fn index(&self, index: usize) -> Self {
        self.with(PathSegment::Index(index))
    }

    fn with(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// Segments from root to leaf.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render the wire key for this path.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            segment.fmt(f)?;
        }
        Ok(())
    }
}

/// A leaf already reduced to its canonical text.
///
/// Absent values are represented by the empty string and are still written
/// to the body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Scalar(String);

impl Scalar {
    /// Create a scalar from its text.
    pub fn new<S: Into<String>>(text: S) -> Self {
        Scalar(text.into())
    }

    /// The scalar standing in for an absent value.
    pub fn null() -> Self {
        Scalar(String::new())
    }

    /// The canonical text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the scalar, returning its text.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A binary attachment framed as a file part in multipart bodies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilePart {
    field_name: String,
    file_name: String,
    content_type: String,
    bytes: Bytes,
}

impl FilePart {
    /// Create a file part with the default `application/octet-stream` type.
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: DEFAULT_FILE_CONTENT_TYPE.to_owned(),
            bytes: bytes.into(),
        }
    }

    /// Set the content type of the part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Field name used when the part sits at the document root.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// File name announced in `Content-Disposition`.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content type of the payload.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Raw payload.
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }
}

/// A structured request body.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A textual leaf.
    Scalar(Scalar),
    /// A binary leaf.
    File(FilePart),
    /// Items in append order.
    Sequence(Vec<Value>),
    /// Fields in declaration order.
    Record(Vec<(String, Value)>),
    /// A leaf that the conversion layer could not decompose, carrying its
    /// type name. Encoding it always fails.
    Opaque(String),
}

impl Value {
    /// The absent value.
    pub fn null() -> Self {
        Value::Scalar(Scalar::null())
    }

    /// Build a record from `(name, value)` pairs, keeping their order.
    pub fn record<K, V, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Record(
            fields
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }

    /// Build a sequence, keeping item order.
    pub fn sequence<V, I>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Convert any serde-serializable type.
    ///
    /// Struct fields keep their declaration order. Input that has no JSON
    /// shape, such as a map with non-string keys, is reported as
    /// [`EncodeError::UnsupportedValueType`].
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, EncodeError> {
        let json = serde_json::to_value(value).map_err(|err| {
            let type_name = format!("{} ({})", std::any::type_name::<T>(), err);
            EncodeError::unsupported(&KeyPath::root(), type_name)
        })?;
        Ok(Value::from(json))
    }

    /// Whether this is a record.
    pub fn is_record(&self) -> bool {
        matches!(self, Value::Record(_))
    }

    /// Whether this is the absent value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Scalar(scalar) if scalar.as_str().is_empty())
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<FilePart> for Value {
    fn from(file: FilePart) -> Self {
        Value::File(file)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Scalar(Scalar::new(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Scalar(Scalar::new(text))
    }
}

impl From<bool> for Value {
    fn from(flag: bool) -> Self {
        Value::Scalar(Scalar::new(flag.to_string()))
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(number: $ty) -> Self {
                    Value::Scalar(Scalar::new(number.to_string()))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// `{:?}` keeps the fractional part (`1.0`, not `1`). Very large and very
// small magnitudes switch to exponent form with no `+` sign (`1e20`, `1e-7`).
macro_rules! impl_from_float {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(number: $ty) -> Self {
                    Value::Scalar(Scalar::new(format!("{:?}", number)))
                }
            }
        )*
    };
}

impl_from_float!(f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Value::null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::sequence(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::null(),
            serde_json::Value::Bool(flag) => Value::from(flag),
            serde_json::Value::Number(number) => Value::Scalar(Scalar::new(number.to_string())),
            serde_json::Value::String(text) => Value::from(text),
            serde_json::Value::Array(items) => Value::sequence(items),
            serde_json::Value::Object(fields) => Value::record(fields),
        }
    }
}

/// Conversion of caller types into a [`Value`] tree.
///
/// Generated clients implement this for their body types, usually by
/// building a [`Value::record`] from their fields in declaration order.
pub trait ToValue {
    /// Build the structured representation of `self`.
    fn to_value(&self) -> Value;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for FilePart {
    fn to_value(&self) -> Value {
        Value::File(self.clone())
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::from(self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::from(self.as_str())
    }
}

macro_rules! impl_to_value_copy {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_to_value_copy!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or_else(Value::null, ToValue::to_value)
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Sequence(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}
