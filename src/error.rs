use alloc::string::{String, ToString};
use core::fmt;

use crate::sink::SerError;
use crate::tree::ElementKind;

/// Serialization result
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by the tree model, the adapters, the engine and formats.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A narrowing accessor was used on the wrong tree variant
    #[error("expected a {expected} tree element, found {found}")]
    TypeMismatch { expected: ElementKind, found: ElementKind },
    /// An adapter received a tree node it can't decode
    #[error("cannot decode `{type_name}` from a {found} element")]
    ShapeMismatch { type_name: &'static str, found: ElementKind },
    /// No enum case carries the decoded name
    #[error("unknown case `{case}` of enum `{type_name}`")]
    UnknownEnumCase { type_name: &'static str, case: String },
    /// No adapter matched and the node is not an object
    #[error("no adapter for `{type_name}` accepts a {found} element")]
    UnsupportedShape { type_name: &'static str, found: ElementKind },
    /// No adapter matched and the type does not describe its fields
    #[error("`{type_name}` has no adapter and no field layout")]
    NotDecomposable { type_name: &'static str },
    /// A value-level call was made on a serializer without a format
    #[error("no format configured")]
    NoFormatConfigured,
    /// Malformed input text
    #[error("{message} at position {position}")]
    Parse { position: usize, message: String },
    /// The target type can't be instantiated
    #[error("cannot construct an instance of `{type_name}`")]
    ConstructionFailure { type_name: &'static str },
    /// A type-erased value was not of the expected concrete type
    #[error("value is not a `{expected}`")]
    ValueMismatch { expected: &'static str },
    /// A fixed size array was decoded from an array of a different length
    #[error("expected an array of {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    /// A built-in output sink rejected rendered text
    #[error("write error: {0}")]
    Write(#[from] SerError),
    /// An error raised by a custom adapter or format
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Create a custom error from any displayable message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Create a parse error at the given input `position`.
    pub fn parse<T: fmt::Display>(position: usize, msg: T) -> Self {
        Error::Parse { position, message: msg.to_string() }
    }
}
