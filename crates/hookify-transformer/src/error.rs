//! Error types for conversion.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Reasons a source cannot be converted structurally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// No class declaration extending `Component` or `PureComponent` was found.
    #[error("no class component declaration found")]
    NotAClassComponent,

    /// The class has no `render` method with a `return` expression.
    #[error("class component has no render return expression")]
    NoRenderExpression,
}

/// Errors reported by a conversion sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the output failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sink refused the output.
    #[error("output rejected: {0}")]
    Rejected(String),
}
