//! Unified error type for the staffline application.
//!
//! All crates funnel their failures into [`Error`], which carries enough
//! context for API handlers to derive an HTTP status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in staffline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "job").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation (missing upload, unsupported format).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A download was requested before the job reached a completed state.
    #[error("Job {id} is not ready for download")]
    NotReady {
        /// The job that was queried.
        id: String,
    },

    /// The job completed but the file backing its artifact no longer exists.
    #[error("Artifact for job {id} is missing")]
    ArtifactMissing {
        /// The job whose artifact is gone.
        id: String,
    },

    /// The recognition engine itself failed.
    #[error("Engine error: {message}")]
    Engine {
        /// Human-readable failure description.
        message: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::NotReady { .. } => 409,
            Error::ArtifactMissing { .. } => 410,
            Error::Engine { .. } => 502,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::NotReady`].
    pub fn not_ready(id: impl fmt::Display) -> Self {
        Error::NotReady { id: id.to_string() }
    }

    /// Convenience constructor for [`Error::ArtifactMissing`].
    pub fn artifact_missing(id: impl fmt::Display) -> Self {
        Error::ArtifactMissing { id: id.to_string() }
    }

    /// Convenience constructor for [`Error::Engine`].
    pub fn engine(message: impl Into<String>) -> Self {
        Error::Engine {
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
