//! Core body encoding for restwire clients.
//!
//! This crate turns request bodies into wire bytes. It is shared by the
//! `restwire-client` runtime and by code generated for REST interfaces.
//!
//! ## Modules
//!
//! - [`value`]: the [`Value`] tree bodies are converted into
//! - [`traverse`]: the depth-first walk shared by the encoders
//! - [`form`]: `application/x-www-form-urlencoded` encoding
//! - [`multipart`]: `multipart/form-data` encoding
//! - [`error`]: [`EncodeError`]
//!
//! ## Example
//!
//! ```
//! use restwire_core::{Boundary, FormEncoder, MultipartEncoder, Value};
//!
//! let body = Value::record([("name", Value::from("Alice"))]);
//!
//! let form = FormEncoder::new().encode(&body)?;
//! assert_eq!(&form[..], b"name=Alice");
//!
//! let multipart = MultipartEncoder::new(Boundary::new("B")).encode(&body)?;
//! assert!(multipart.ends_with(b"\r\n--B--"));
//! # Ok::<(), restwire_core::EncodeError>(())
//! ```

pub mod error;
pub mod form;
pub mod multipart;
pub mod traverse;
pub mod value;

pub use error::EncodeError;
pub use form::{FORM_CONTENT_TYPE, FormEncoder};
pub use multipart::{Boundary, MultipartEncoder};
pub use traverse::{LeafSink, traverse};
pub use value::{DEFAULT_FILE_CONTENT_TYPE, FilePart, KeyPath, PathSegment, Scalar, ToValue, Value};
