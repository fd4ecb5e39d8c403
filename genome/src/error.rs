//! Error taxonomy surfaced by genome lookups and the express/mutate flows.
//!
//! Adapters (config, loaders, transport, shell) stay on `anyhow`; their
//! errors are wrapped here when they cross into an orchestration result.

use thiserror::Error;

/// Convenience alias for results carrying a [`GenomeError`].
pub type Result<T> = std::result::Result<T, GenomeError>;

#[derive(Debug, Error)]
pub enum GenomeError {
    /// Gene names must be non-empty.
    #[error("gene name must not be empty")]
    InvalidName,

    #[error("unknown gene {name}")]
    UnknownGene { name: String },

    #[error("duplicate gene {name}")]
    DuplicateGene { name: String },

    /// An expression action failed; earlier actions are not rolled back.
    #[error("expression of {gene} failed on action `{action}`")]
    ExpressionFailed {
        gene: String,
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// The directory a gene is expressed into could not be created.
    #[error("expression of {gene} failed: create target directory {path}")]
    TargetDirectory {
        gene: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A mutation action failed; remaining actions for this gene were skipped.
    #[error("mutation of {gene} failed on action `{action}`")]
    MutationFailed {
        gene: String,
        action: String,
        #[source]
        source: anyhow::Error,
    },

    /// The source behind a deferred genome could not be read.
    #[error("load genome")]
    Load(#[source] anyhow::Error),

    #[error("expressed genes manifest")]
    Manifest(#[source] anyhow::Error),
}

impl GenomeError {
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownGene { name: name.into() }
    }

    /// The message followed by every underlying cause, `: `-separated.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = std::error::Error::source(cause);
        }
        message
    }
}
