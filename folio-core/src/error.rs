//! Error types for folio-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, with the path that was being touched.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored file exists but is not valid JSON for its shape.
    #[error("failed to parse store file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error on the write path.
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// A [`RequireEmpty`](crate::store::BatchOp::RequireEmpty) batch met a
    /// non-empty collection; nothing was written.
    #[error("collection {collection} is not empty")]
    NotEmpty { collection: String },

    /// The backing store could not be reached or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

/// Errors from reading or writing `~/.folio/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Neither `$FOLIO_HOME` nor a home directory is available.
    #[error("cannot determine home directory; set $FOLIO_HOME or $HOME")]
    HomeNotFound,
}

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Path of the field in the submitted form, e.g. `plans[1].features[0].name`.
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Form input rejected before it reaches the sync service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
