//! # folio-renderer
//!
//! Renders the public site pages from stored content and keeps the
//! route-keyed page cache that content writes invalidate.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use folio_renderer::{Page, PageCache, Renderer, TemplateContext};
//!
//! fn serve_pricing(renderer: &Renderer, cache: &PageCache) -> Option<String> {
//!     if let Some(hit) = cache.get("/pricing") {
//!         return Some(hit.body);
//!     }
//!     let ctx = TemplateContext::new("Folio", Page::Pricing);
//!     let body = renderer.render(&ctx).ok()?;
//!     Some(cache.insert("/pricing", body).body)
//! }
//! ```

pub mod cache;
pub mod context;
pub mod engine;
pub mod error;

pub use cache::{etag, CachedPage, Invalidator, PageCache};
pub use context::TemplateContext;
pub use engine::{normalize_route, Page, Renderer};
pub use error::RenderError;
