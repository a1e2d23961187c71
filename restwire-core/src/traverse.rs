//! Depth-first walk over a [`Value`] tree.
//!
//! Both body encoders share this walk and differ only in how they write
//! leaves, which they express by implementing [`LeafSink`].

use crate::EncodeError;
use crate::value::{FilePart, KeyPath, Scalar, Value};

/// Receiver of the leaves found by [`traverse`].
pub trait LeafSink {
    /// Write a scalar leaf found at `path`.
    fn scalar(&mut self, path: &KeyPath, scalar: &Scalar) -> Result<(), EncodeError>;

    /// Write a file leaf found at `path`.
    fn file(&mut self, path: &KeyPath, file: &FilePart) -> Result<(), EncodeError>;
}

/// Walk `root` in pre-order, handing every leaf to `sink` with its key path.
///
/// Record fields extend the path with their name and sequence items with
/// their position. The first error stops the walk; whatever the sink has
/// written so far is left for the caller to discard.
pub fn traverse<S: LeafSink + ?Sized>(root: &Value, sink: &mut S) -> Result<(), EncodeError> {
    visit(root, &KeyPath::root(), sink)
}

fn visit<S: LeafSink + ?Sized>(
    value: &Value,
    path: &KeyPath,
    sink: &mut S,
) -> Result<(), EncodeError> {
    match value {
        Value::Scalar(scalar) => sink.scalar(path, scalar),
        Value::File(file) => sink.file(path, file),
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                visit(item, &path.index(index), sink)?;
            }
            Ok(())
        }
        Value::Record(fields) => {
            for (name, field) in fields {
                visit(field, &path.field(name), sink)?;
            }
            Ok(())
        }
        Value::Opaque(type_name) => Err(EncodeError::unsupported(path, type_name.as_str())),
    }
}
