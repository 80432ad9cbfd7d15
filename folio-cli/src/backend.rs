//! Where CLI requests go: the running daemon when its socket answers,
//! otherwise the content store directly.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use folio_core::config;
use folio_core::types::{ContentKind, HomePageContent, WhyChooseUsContent};
use folio_daemon::{request, request_status, DaemonRequest};
use folio_renderer::PageCache;
use folio_sync::{form, ContentSync, Site};

pub enum Backend {
    Daemon(PathBuf),
    Direct {
        sync: Arc<ContentSync>,
        site: Site,
    },
}

impl Backend {
    /// Prefer a live daemon so its page cache sees the write.
    pub fn connect(home: &Path) -> Result<Self> {
        if folio_daemon::paths::socket_path(home).exists() && request_status(home).is_ok() {
            tracing::debug!("using daemon at {}", home.display());
            return Ok(Backend::Daemon(home.to_path_buf()));
        }

        let config = config::load_at(home).context("failed to load folio config")?;
        let cache = Arc::new(PageCache::new());
        let sync = Arc::new(ContentSync::open(home, &config, cache.clone()));
        let site = Site::new(sync.clone(), cache, &config).context("failed to load page templates")?;
        Ok(Backend::Direct { sync, site })
    }

    pub fn load(&self, kind: ContentKind) -> Result<Value> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("load");
                req.kind = Some(kind);
                Ok(request(home, &req)?)
            }
            Backend::Direct { sync, .. } => Ok(form::load(sync, kind)?),
        }
    }

    pub fn seed(&self, kind: Option<ContentKind>) -> Result<Value> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("seed");
                req.kind = kind;
                Ok(request(home, &req)?)
            }
            Backend::Direct { sync, .. } => match kind {
                Some(kind) => Ok(json!({ "kind": kind, "seeded": form::seed(sync, kind)? })),
                None => Ok(json!({ "seeded": sync.seed_all()? })),
            },
        }
    }

    pub fn replace(&self, kind: ContentKind, items: Value, dry_run: bool) -> Result<Value> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("replace");
                req.kind = Some(kind);
                req.items = Some(items);
                req.dry_run = dry_run;
                Ok(request(home, &req)?)
            }
            Backend::Direct { sync, .. } if dry_run => Ok(json!(form::preview(sync, kind, items)?)),
            Backend::Direct { sync, .. } => Ok(json!(form::replace(sync, kind, items)?)),
        }
    }

    pub fn home(&self) -> Result<Value> {
        match self {
            Backend::Daemon(home) => Ok(request(home, &DaemonRequest::new("home"))?),
            Backend::Direct { sync, .. } => Ok(json!(sync.try_load_singleton::<HomePageContent>()?)),
        }
    }

    pub fn update_home(&self, patch: Value) -> Result<()> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("home_update");
                req.patch = Some(patch);
                request(home, &req)?;
            }
            Backend::Direct { sync, .. } => form::update_home(sync, patch)?,
        }
        Ok(())
    }

    pub fn why(&self) -> Result<Value> {
        match self {
            Backend::Daemon(home) => Ok(request(home, &DaemonRequest::new("why"))?),
            Backend::Direct { sync, .. } => {
                Ok(json!(sync.try_load_singleton::<WhyChooseUsContent>()?))
            }
        }
    }

    pub fn update_why(&self, patch: Value) -> Result<()> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("why_update");
                req.patch = Some(patch);
                request(home, &req)?;
            }
            Backend::Direct { sync, .. } => form::update_why_choose_us(sync, patch)?,
        }
        Ok(())
    }

    /// The rendered page at `route` as `{route, body, etag, rendered_at}`.
    pub fn page(&self, route: &str) -> Result<Value> {
        match self {
            Backend::Daemon(home) => {
                let mut req = DaemonRequest::new("page");
                req.route = Some(route.to_string());
                Ok(request(home, &req)?)
            }
            Backend::Direct { site, .. } => Ok(json!(site.page(route)?)),
        }
    }
}
