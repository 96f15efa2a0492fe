//! Error taxonomy for shape conversions.

use thiserror::Error;

use crate::types::ValidationError;

#[derive(Error, Debug)]
pub enum ShapeError {
    /// The datum or payload has the wrong arity, tag or field kinds.
    #[error("validation error: {0}")]
    Validation(String),

    #[error("cannot serialize {value} of type {kind}")]
    InvalidArgument { value: String, kind: &'static str },

    #[error("malformed JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot resolve shape class: {0}")]
    Resolution(String),

    #[error("MessagePack encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("MessagePack decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("runtime bridge error: {0}")]
    Bridge(String),
}

impl From<Vec<ValidationError>> for ShapeError {
    fn from(errors: Vec<ValidationError>) -> Self {
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        ShapeError::Validation(joined)
    }
}

pub type Result<T> = std::result::Result<T, ShapeError>;
