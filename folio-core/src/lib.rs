//! Folio core library: content types, document store, config, validation.
//!
//! - [`types`]: newtypes and content records
//! - [`content`]: typed records ⇄ stored documents, read-side coercions
//! - [`store`]: [`DocumentStore`] plus file and in-memory implementations
//! - [`seed`]: default content for empty collections
//! - [`validate`]: form-layer checks
//! - [`config`]: `~/.folio/config.yaml`
//! - [`error`]: [`StoreError`], [`ConfigError`], [`ValidationError`]

pub mod config;
pub mod content;
pub mod error;
pub mod seed;
pub mod store;
pub mod types;
pub mod validate;

pub use config::{FolioConfig, SeedPolicy};
pub use content::{Content, Singleton};
pub use error::{ConfigError, FieldIssue, StoreError, ValidationError};
pub use store::{DocumentStore, FileStore, MemoryStore};
pub use types::{
    ContentKind, DocPath, DocumentId, Feature, HomePageContent, HomePagePatch, MediaKind,
    PortfolioItem, PricingPlan, Service, Stored, WhyChooseUsContent, WhyChooseUsFeature,
    WhyChooseUsPatch,
};
