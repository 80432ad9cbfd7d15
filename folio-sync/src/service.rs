//! The content sync service: load, seed and replace collections, and read or
//! patch the singleton sections.
//!
//! # Write flow
//!
//! `replace_all` builds one batch (`DeleteAll` followed by one `Insert` per
//! record), commits it, then invalidates every route that shows the
//! collection. Nothing is invalidated when the commit fails.
//!
//! # Seeding
//!
//! Defaults are committed behind a `RequireEmpty` precondition and singleton
//! defaults go through `merge_absent`, so the emptiness check happens inside
//! the store. A replace or patch that lands between a load's read and its
//! seed always wins over the defaults.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use folio_core::config::{FolioConfig, SeedPolicy};
use folio_core::content::{self, Content, Singleton};
use folio_core::error::StoreError;
use folio_core::store::{Document, DocumentStore, FileStore, WriteBatch};
use folio_core::types::{
    ContentKind, HomePageContent, HomePagePatch, PortfolioItem, PricingPlan, Service, Stored,
    WhyChooseUsContent, WhyChooseUsPatch,
};
use folio_renderer::Invalidator;

use crate::SyncError;

/// Invalidator for callers with no page cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl Invalidator for NoopInvalidator {
    fn invalidate(&self, _route: &str) {}
}

/// Result of a successful [`ContentSync::replace_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceOutcome {
    pub kind: ContentKind,
    pub removed: usize,
    pub inserted: usize,
}

/// Content sync service shared by the CLI and the daemon.
///
/// Holds no content state of its own; every call is one unit of work
/// against the store.
pub struct ContentSync {
    store: Arc<dyn DocumentStore>,
    invalidator: Arc<dyn Invalidator>,
    seed_policy: SeedPolicy,
}

impl ContentSync {
    pub fn new(store: Arc<dyn DocumentStore>, invalidator: Arc<dyn Invalidator>) -> Self {
        ContentSync {
            store,
            invalidator,
            seed_policy: SeedPolicy::default(),
        }
    }

    /// Service over the [`FileStore`] named by `config`.
    pub fn open(home: &Path, config: &FolioConfig, invalidator: Arc<dyn Invalidator>) -> Self {
        let store = FileStore::open(config.store_dir_at(home));
        ContentSync::new(Arc::new(store), invalidator).with_seed_policy(config.seed_policy)
    }

    pub fn with_seed_policy(mut self, policy: SeedPolicy) -> Self {
        self.seed_policy = policy;
        self
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    // -----------------------------------------------------------------------
    // Collections
    // -----------------------------------------------------------------------

    /// Current records of `T`'s collection in creation order, seeding the
    /// defaults first when the collection is empty and the policy allows it.
    /// Store failures are logged and yield an empty list.
    pub fn load<T: Content>(&self) -> Vec<Stored<T>> {
        self.try_load::<T>().unwrap_or_else(|err| {
            tracing::error!("failed to load {}: {err}", T::KIND);
            Vec::new()
        })
    }

    /// [`ContentSync::load`] that reports store failures.
    pub fn try_load<T: Content>(&self) -> Result<Vec<Stored<T>>, SyncError> {
        let docs = self.store.query_ordered(T::KIND.collection())?;
        if !docs.is_empty() || self.seed_policy == SeedPolicy::Explicit {
            return Ok(decode_all(&docs));
        }
        self.seed_defaults::<T>()?;
        let docs = self.store.query_ordered(T::KIND.collection())?;
        Ok(decode_all(&docs))
    }

    /// Current records without seeding, whatever the policy.
    pub fn read<T: Content>(&self) -> Result<Vec<Stored<T>>, SyncError> {
        let docs = self.store.query_ordered(T::KIND.collection())?;
        Ok(decode_all(&docs))
    }

    /// Write the default records if the collection is empty.
    /// Returns whether anything was written.
    pub fn seed<T: Content>(&self) -> Result<bool, SyncError> {
        let seeded = self.seed_defaults::<T>()?;
        if seeded {
            self.invalidate_routes(&T::KIND.routes());
        }
        Ok(seeded)
    }

    // Seeding from a load needs no invalidation: nothing could have rendered
    // the collection's content before it existed.
    fn seed_defaults<T: Content>(&self) -> Result<bool, SyncError> {
        let mut batch = WriteBatch::new();
        batch.require_empty();
        for item in T::defaults() {
            batch.insert(encode(&item)?);
        }
        match self.store.commit(T::KIND.collection(), batch) {
            Ok(receipt) => {
                tracing::info!("seeded {} with {} default records", T::KIND, receipt.inserted.len());
                Ok(true)
            }
            Err(StoreError::NotEmpty { .. }) => {
                tracing::debug!("{} already has records, not seeding", T::KIND);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Seed every collection and both singletons. Returns the collections
    /// that were empty and got their defaults.
    pub fn seed_all(&self) -> Result<Vec<ContentKind>, SyncError> {
        let mut seeded = Vec::new();
        if self.seed::<PortfolioItem>()? {
            seeded.push(ContentKind::Portfolio);
        }
        if self.seed::<PricingPlan>()? {
            seeded.push(ContentKind::Pricing);
        }
        if self.seed::<Service>()? {
            seeded.push(ContentKind::Services);
        }
        self.seed_singleton::<HomePageContent>()?;
        self.seed_singleton::<WhyChooseUsContent>()?;
        Ok(seeded)
    }

    /// Discard every record of `T`'s collection and store `items` in their
    /// place, in order, as one atomic batch.
    pub fn replace_all<T: Content>(&self, items: &[T]) -> Result<ReplaceOutcome, SyncError> {
        let mut batch = WriteBatch::new();
        batch.delete_all();
        for item in items {
            batch.insert(encode(item)?);
        }

        let receipt = self.store.commit(T::KIND.collection(), batch)?;
        self.invalidate_routes(&T::KIND.routes());

        let outcome = ReplaceOutcome {
            kind: T::KIND,
            removed: receipt.deleted,
            inserted: receipt.inserted.len(),
        };
        tracing::info!(
            "replaced {}: {} removed, {} inserted",
            outcome.kind,
            outcome.removed,
            outcome.inserted
        );
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Singletons
    // -----------------------------------------------------------------------

    /// Read a singleton, writing its defaults first when it was never stored
    /// (unless the seed policy is explicit).
    pub fn try_load_singleton<S: Singleton>(&self) -> Result<S, SyncError> {
        if let Some(fields) = self.store.get(&S::PATH)? {
            return Ok(S::decode(&fields));
        }
        if self.seed_policy == SeedPolicy::Explicit {
            return Ok(S::default_content());
        }
        self.seed_singleton::<S>()?;
        // A patch may have landed first; its fields outrank the defaults.
        Ok(self
            .store
            .get(&S::PATH)?
            .map(|fields| S::decode(&fields))
            .unwrap_or_else(S::default_content))
    }

    /// [`ContentSync::try_load_singleton`] that logs failures and yields `None`.
    pub fn load_singleton<S: Singleton>(&self) -> Option<S> {
        self.try_load_singleton::<S>()
            .map_err(|err| tracing::error!("failed to load {}: {err}", S::PATH))
            .ok()
    }

    /// Merge the supplied fields of `patch` into the stored document; fields
    /// the patch leaves out are untouched.
    pub fn update_singleton<S: Singleton>(&self, patch: &S::Patch) -> Result<(), SyncError> {
        let fields = S::patch_fields(patch).map_err(|source| SyncError::Input {
            what: format!("{} patch", S::PATH),
            source,
        })?;
        let keys: Vec<String> = fields.keys().cloned().collect();
        self.store.merge(&S::PATH, fields)?;
        self.invalidate_routes(S::ROUTES);
        tracing::info!("updated {} ({})", S::PATH, keys.join(", "));
        Ok(())
    }

    /// Fill in whichever default fields the stored document lacks.
    fn seed_singleton<S: Singleton>(&self) -> Result<(), SyncError> {
        let fields = content::to_fields(&S::default_content()).map_err(|source| {
            SyncError::Input { what: format!("{} defaults", S::PATH), source }
        })?;
        if self.store.merge_absent(&S::PATH, fields)? {
            tracing::info!("seeded {}", S::PATH);
        }
        Ok(())
    }

    pub fn load_home(&self) -> Option<HomePageContent> {
        self.load_singleton::<HomePageContent>()
    }

    pub fn update_home(&self, patch: &HomePagePatch) -> Result<(), SyncError> {
        self.update_singleton::<HomePageContent>(patch)
    }

    pub fn load_why_choose_us(&self) -> Option<WhyChooseUsContent> {
        self.load_singleton::<WhyChooseUsContent>()
    }

    pub fn update_why_choose_us(&self, patch: &WhyChooseUsPatch) -> Result<(), SyncError> {
        self.update_singleton::<WhyChooseUsContent>(patch)
    }

    fn invalidate_routes(&self, routes: &[&str]) {
        for route in routes {
            self.invalidator.invalidate(route);
        }
    }
}

fn encode<T: Content>(item: &T) -> Result<folio_core::store::Fields, SyncError> {
    item.encode().map_err(|source| SyncError::Encode { kind: T::KIND, source })
}

/// Decode documents in order, skipping any whose fields do not fit `T`.
fn decode_all<T: Content>(docs: &[Document]) -> Vec<Stored<T>> {
    docs.iter()
        .filter_map(|doc| match content::to_stored::<T>(doc) {
            Ok(stored) => Some(stored),
            Err(err) => {
                tracing::warn!("skipping {} document {}: {err}", T::KIND, doc.id);
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
