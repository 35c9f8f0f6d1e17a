use crate::prompt::TemplateError;
use crate::research::LookupError;
use thiserror::Error;

/// Failure of one pipeline submission
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Model call failed: {0}")]
    Model(#[source] anyhow::Error),

    #[error("Model returned an empty completion for `{output_key}`")]
    EmptyCompletion { output_key: String },

    #[error("Research lookup failed: {0}")]
    Lookup(#[from] LookupError),
}

impl ChainError {
    /// True for failures of an external collaborator (model or lookup)
    pub fn is_upstream(&self) -> bool {
        !matches!(self, ChainError::Template(_))
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
