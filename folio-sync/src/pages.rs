//! Public page serving through the page cache.

use std::sync::Arc;

use folio_core::config::FolioConfig;
use folio_core::types::{ContentKind, PortfolioItem, PricingPlan, Service};
use folio_renderer::{CachedPage, Page, PageCache, RenderError, Renderer, TemplateContext};

use crate::service::ContentSync;
use crate::SyncError;

/// Renders public pages from live content, caching each by route.
///
/// The same [`PageCache`] must be the invalidator of `sync`, otherwise
/// writes never evict stale pages.
pub struct Site {
    sync: Arc<ContentSync>,
    cache: Arc<PageCache>,
    renderer: Renderer,
    site_name: String,
    home_services_limit: usize,
}

impl Site {
    pub fn new(
        sync: Arc<ContentSync>,
        cache: Arc<PageCache>,
        config: &FolioConfig,
    ) -> Result<Self, SyncError> {
        Ok(Self::with_renderer(sync, cache, config, Renderer::new()?))
    }

    pub fn with_renderer(
        sync: Arc<ContentSync>,
        cache: Arc<PageCache>,
        config: &FolioConfig,
        renderer: Renderer,
    ) -> Self {
        Site {
            sync,
            cache,
            renderer,
            site_name: config.site_name.clone(),
            home_services_limit: config.home_services_limit,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// The page at `route`: the cached rendering when present, otherwise
    /// freshly rendered from the current content and cached.
    pub fn page(&self, route: &str) -> Result<CachedPage, SyncError> {
        let page = Page::from_route(route)
            .ok_or_else(|| RenderError::UnknownRoute(route.to_string()))?;
        if let Some(hit) = self.cache.get(page.route()) {
            return Ok(hit);
        }

        let epoch = self.cache.epoch();
        let ctx = self.context(page);
        let body = self.renderer.render(&ctx)?;
        tracing::debug!("rendered {page} ({} bytes)", body.len());
        Ok(self.cache.insert_at(page.route(), body, epoch))
    }

    fn context(&self, page: Page) -> TemplateContext {
        let mut ctx = TemplateContext::new(self.site_name.clone(), page);
        for kind in page.shows() {
            ctx = match kind {
                ContentKind::Portfolio => ctx.with_portfolio(&self.sync.load::<PortfolioItem>()),
                ContentKind::Pricing => ctx.with_plans(&self.sync.load::<PricingPlan>()),
                ContentKind::Services => {
                    let limit = (page == Page::Home).then_some(self.home_services_limit);
                    ctx.with_services(&self.sync.load::<Service>(), limit)
                }
            };
        }
        if page == Page::Home {
            if let Some(home) = self.sync.load_home() {
                ctx = ctx.with_hero(&home);
            }
            if let Some(why) = self.sync.load_why_choose_us() {
                ctx = ctx.with_why(&why);
            }
        }
        ctx
    }
}
