//! Errors raised while indexing a single record.

use thiserror::Error;

/// Reasons a single record cannot be indexed.
///
/// These are recoverable: the aggregator logs them, drops the offending
/// file from the index and moves on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("top-level value is not a JSON object")]
    RecordNotObject,

    #[error("`parameters` is not an array")]
    ParametersNotArray,

    #[error("parameter #{position} is not an object")]
    ParameterNotObject { position: usize },

    #[error("parameter #{position} has no `name`")]
    MissingName { position: usize },

    #[error("parameter #{position} has a non-string `name`")]
    NameNotString { position: usize },

    #[error("duplicate parameter `{name}`")]
    DuplicateParameter { name: String },
}
