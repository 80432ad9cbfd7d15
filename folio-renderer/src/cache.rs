//! Route-keyed page cache and the [`Invalidator`] hook content writes call.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::normalize_route;

/// Drops cached renderings of a route so the next request re-renders it.
///
/// Called synchronously after a successful content write, before the write
/// returns to its caller.
pub trait Invalidator: Send + Sync {
    fn invalidate(&self, route: &str);
}

/// A rendered page plus the SHA-256 hex digest of its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPage {
    pub route: String,
    pub body: String,
    pub etag: String,
    pub rendered_at: DateTime<Utc>,
}

/// SHA-256 hex digest of `body`.
pub fn etag(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Debug, Default)]
struct State {
    pages: HashMap<String, CachedPage>,
    /// Bumped by every invalidation.
    epoch: u64,
}

fn page_for(route: &str, body: String) -> CachedPage {
    CachedPage {
        route: normalize_route(route).to_string(),
        etag: etag(&body),
        body,
        rendered_at: Utc::now(),
    }
}

/// In-memory cache of rendered pages keyed by normalized route.
#[derive(Debug, Default)]
pub struct PageCache {
    state: Mutex<State>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned map is still usable.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, route: &str) -> Option<CachedPage> {
        self.state().pages.get(normalize_route(route)).cloned()
    }

    /// Current invalidation epoch. Read it before loading the content a page
    /// is rendered from and hand it to [`PageCache::insert_at`].
    pub fn epoch(&self) -> u64 {
        self.state().epoch
    }

    /// Cache `body` for `route`, replacing any previous entry.
    pub fn insert(&self, route: &str, body: String) -> CachedPage {
        let page = page_for(route, body);
        self.state().pages.insert(page.route.clone(), page.clone());
        page
    }

    /// Like [`PageCache::insert`], but only stores the page when nothing was
    /// invalidated since `epoch`. The page is returned either way.
    pub fn insert_at(&self, route: &str, body: String, epoch: u64) -> CachedPage {
        let page = page_for(route, body);
        let mut state = self.state();
        if state.epoch == epoch {
            state.pages.insert(page.route.clone(), page.clone());
        } else {
            tracing::debug!("page cache: {} rendered from stale content, not cached", page.route);
        }
        page
    }

    /// Cached routes, sorted.
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.state().pages.keys().cloned().collect();
        routes.sort();
        routes
    }

    pub fn len(&self) -> usize {
        self.state().pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().pages.is_empty()
    }

    pub fn clear(&self) {
        self.state().pages.clear();
    }
}

impl Invalidator for PageCache {
    fn invalidate(&self, route: &str) {
        let mut state = self.state();
        state.epoch += 1;
        if state.pages.remove(normalize_route(route)).is_some() {
            tracing::debug!("page cache: dropped {route}");
        }
    }
}
