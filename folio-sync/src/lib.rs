//! # folio-sync
//!
//! The content sync service and the helpers built on it.
//!
//! - [`ContentSync`]: `load` / `seed` / `replace_all` for collections, load
//!   and patch for singletons, page-cache invalidation after writes
//! - [`form`]: validated entry points taking untyped input, by [`ContentKind`]
//! - [`diff`]: dry-run preview of a replace
//! - [`Site`]: public pages rendered through the page cache
//!
//! [`ContentKind`]: folio_core::types::ContentKind

pub mod diff;
pub mod error;
pub mod form;
pub mod pages;
pub mod service;

pub use diff::{preview_replace, ReplacePreview};
pub use error::SyncError;
pub use pages::Site;
pub use service::{ContentSync, NoopInvalidator, ReplaceOutcome};
