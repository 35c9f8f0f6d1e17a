//! External reference lookup used to ground script generation.

pub mod wikipedia;

pub use wikipedia::{WikipediaClient, WikipediaConfig};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Reference service unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Reference service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response from reference service: {0}")]
    InvalidResponse(String),

    #[error("No reference result found for `{0}`")]
    NoResult(String),
}

/// Reference-search collaborator: query in, plain-text summary out
#[async_trait]
pub trait ResearchLookup: Send + Sync {
    async fn run(&self, query: &str) -> Result<String, LookupError>;
}
