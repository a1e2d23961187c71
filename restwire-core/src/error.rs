//! Body encoding errors.
//!
//! This module provides [`EncodeError`], returned by the form and multipart
//! encoders and by [`Value::from_serialize`](crate::Value::from_serialize).

use crate::value::KeyPath;

/// Errors raised while turning a [`Value`](crate::Value) tree into a body.
///
/// An encode that fails never hands back partial output.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A leaf that is neither a scalar nor a file the encoder can frame.
    #[error("unsupported value type `{type_name}` at key `{key}`")]
    UnsupportedValueType {
        /// Wire key of the offending leaf (empty for the document root).
        key: String,
        /// Name of the type that could not be encoded.
        type_name: String,
    },
}

impl EncodeError {
    /// Create an unsupported value error for the leaf at `path`.
    pub fn unsupported<S: Into<String>>(path: &KeyPath, type_name: S) -> Self {
        EncodeError::UnsupportedValueType {
            key: path.render(),
            type_name: type_name.into(),
        }
    }

    /// Wire key of the leaf that caused the error.
    pub fn key(&self) -> &str {
        match self {
            EncodeError::UnsupportedValueType { key, .. } => key,
        }
    }
}
