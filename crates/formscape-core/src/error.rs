//! Error types for Formscape

use thiserror::Error;

/// Result type alias using Formscape's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Formscape operations
#[derive(Error, Debug)]
pub enum Error {
    /// Formula text failed the grammar check (prefix, parentheses, function whitelist)
    #[error("{0}")]
    InvalidFormula(String),

    /// Formula could not be parsed into an expression tree
    ///
    /// The display text is fixed; `detail` carries the parser's reason.
    #[error("Syntax error in formula")]
    Syntax { detail: String },

    /// Formula parsed but could not be evaluated
    #[error("Formula evaluation error: {0}")]
    Evaluation(String),

    /// No formula registered under this name
    #[error("Formula type '{name}' not found")]
    UnknownFormula { name: String },

    /// Formula does not support the requested dimensionality
    #[error("Formula '{name}' does not support {dimension} output")]
    UnsupportedDimension { name: String, dimension: String },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Mesh generation failed
    #[error("Mesh generation failed: {0}")]
    MeshGeneration(String),

    /// Export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preset (de)serialization error
    #[error("Preset error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn syntax(detail: impl Into<String>) -> Self {
        Self::Syntax {
            detail: detail.into(),
        }
    }

    pub(crate) fn evaluation(detail: impl Into<String>) -> Self {
        Self::Evaluation(detail.into())
    }
}
