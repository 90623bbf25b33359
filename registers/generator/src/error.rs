// Licensed under the Apache-2.0 license

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by an [`OffsetExpressionResolver`](crate::offset::OffsetExpressionResolver).
#[derive(Error, Debug)]
#[error("{0}")]
pub struct ResolveError(pub String);

impl ResolveError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors that can occur while turning register tables into a layout.
#[derive(Error, Debug)]
pub enum RegisterError {
    /// The offset cell does not even start with a hex literal.
    #[error("malformed offset {0:?}: expected a 0x-prefixed hex address")]
    MalformedOffset(String),

    /// The external expression resolver could not translate a parametric offset.
    #[error("could not resolve offset expression {expression:?}: {source}")]
    ResolutionFailed {
        expression: String,
        #[source]
        source: ResolveError,
    },

    /// A per-register detail table exists but cannot be used.
    #[error("malformed field table {}: {message}", path.display())]
    MalformedFieldTable { path: PathBuf, message: String },

    /// The register summary table cannot be read as CSV at all.
    #[error("malformed register summary {}: {message}", path.display())]
    MalformedSummary { path: PathBuf, message: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RegisterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RegisterError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for register table operations.
pub type RegisterResult<T> = std::result::Result<T, RegisterError>;
