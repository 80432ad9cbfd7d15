//! Error types for folio-sync.

use thiserror::Error;

use folio_core::error::{StoreError, ValidationError};
use folio_core::types::ContentKind;
use folio_renderer::RenderError;

/// All errors that can arise from content sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The document store failed or was unreachable.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A record could not be turned into document fields.
    #[error("could not encode {kind} record: {source}")]
    Encode {
        kind: ContentKind,
        #[source]
        source: serde_json::Error,
    },

    /// Submitted input did not have the shape of the target records.
    #[error("malformed {what}: {source}")]
    Input {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    /// Submitted input failed form validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// YAML rendering for a replace preview.
    #[error("preview rendering error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
