//! Tera rendering engine: [`Page`] enum and [`Renderer`].
//!
//! # Route mapping
//!
//! | Page      | Route        | Template               |
//! |-----------|--------------|------------------------|
//! | Home      | `/`          | `pages/home.html`      |
//! | Portfolio | `/portfolio` | `pages/portfolio.html` |
//! | Pricing   | `/pricing`   | `pages/pricing.html`   |
//! | Services  | `/services`  | `pages/services.html`  |

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tera::Tera;

use folio_core::types::ContentKind;

use crate::context::TemplateContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("base.html", include_str!("templates/base.html")),
    ("partials/services.html", include_str!("templates/partials/services.html")),
    ("partials/portfolio.html", include_str!("templates/partials/portfolio.html")),
    ("partials/pricing.html", include_str!("templates/partials/pricing.html")),
    ("partials/why.html", include_str!("templates/partials/why.html")),
    ("pages/home.html", include_str!("templates/pages/home.html")),
    ("pages/portfolio.html", include_str!("templates/pages/portfolio.html")),
    ("pages/pricing.html", include_str!("templates/pages/pricing.html")),
    ("pages/services.html", include_str!("templates/pages/services.html")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// `.html` files under `dir`, named by their path relative to `dir`.
fn load_overrides(dir: &Path) -> Result<Vec<(String, String)>, RenderError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("html") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(override_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert((*name).to_string(), (*content).to_string());
    }
    if let Some(dir) = override_dir {
        for (name, content) in load_overrides(dir)? {
            tracing::debug!("template override: {name}");
            templates.insert(name, content);
        }
    }

    // Names end in `.html`, so tera autoescapes every value.
    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// The public pages of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Portfolio,
    Pricing,
    Services,
}

impl Page {
    pub fn all() -> &'static [Page] {
        &[Page::Home, Page::Portfolio, Page::Pricing, Page::Services]
    }

    pub fn route(&self) -> &'static str {
        match self {
            Page::Home => "/",
            Page::Portfolio => "/portfolio",
            Page::Pricing => "/pricing",
            Page::Services => "/services",
        }
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            Page::Home => "pages/home.html",
            Page::Portfolio => "pages/portfolio.html",
            Page::Pricing => "pages/pricing.html",
            Page::Services => "pages/services.html",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Portfolio => "Our Portfolio",
            Page::Pricing => "Pricing Plans",
            Page::Services => "Our Services",
        }
    }

    /// Page served at `route`; trailing slashes are ignored.
    pub fn from_route(route: &str) -> Option<Page> {
        let route = normalize_route(route);
        Page::all().iter().copied().find(|p| p.route() == route)
    }

    /// Collections whose content appears on this page.
    pub fn shows(&self) -> &'static [ContentKind] {
        match self {
            Page::Home => ContentKind::all(),
            Page::Portfolio => &[ContentKind::Portfolio],
            Page::Pricing => &[ContentKind::Pricing],
            Page::Services => &[ContentKind::Services],
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route())
    }
}

/// `/pricing/` → `/pricing`, `` → `/`.
pub fn normalize_route(route: &str) -> &str {
    let trimmed = route.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Tera-based renderer for the public pages.
///
/// `override_dir` may contain `.html` templates that replace embedded ones
/// by relative name (e.g. `partials/pricing.html`). Create once and reuse.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    /// Construct a [`Renderer`] with embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_overrides(None)
    }

    /// Construct a [`Renderer`] with embedded templates plus overrides.
    pub fn with_overrides(override_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(Renderer { tera: build_tera(override_dir)? })
    }

    /// Render the page named by `ctx.page`.
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, RenderError> {
        let page = Page::from_route(&ctx.page.route)
            .ok_or_else(|| RenderError::UnknownRoute(ctx.page.route.clone()))?;
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(page.template_name(), &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::seed;
    use folio_core::types::{DocumentId, Stored};

    fn stored<T>(items: Vec<T>) -> Vec<Stored<T>> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| Stored {
                id: DocumentId::from(format!("doc{i}")),
                created_at: "2024-05-01T10:00:00.000Z".to_string(),
                item,
            })
            .collect()
    }

    #[test]
    fn renderer_new_succeeds() {
        Renderer::new().expect("Renderer::new should succeed with embedded templates");
    }

    #[test]
    fn routes_round_trip_through_from_route() {
        for page in Page::all() {
            assert_eq!(Page::from_route(page.route()), Some(*page));
        }
        assert_eq!(Page::from_route("/pricing/"), Some(Page::Pricing));
        assert_eq!(Page::from_route(""), Some(Page::Home));
        assert_eq!(Page::from_route("/admin"), None);
    }

    #[test]
    fn every_page_renders_with_empty_content() {
        let renderer = Renderer::new().unwrap();
        for page in Page::all() {
            let ctx = TemplateContext::new("Acme", *page);
            let html = renderer
                .render(&ctx)
                .unwrap_or_else(|e| panic!("render failed for {page}: {e}"));
            assert!(html.contains("Acme"), "{page} should contain the site name");
        }
    }

    #[test]
    fn pricing_page_marks_featured_plan() {
        let renderer = Renderer::new().unwrap();
        let ctx = TemplateContext::new("Acme", Page::Pricing).with_plans(&stored(seed::pricing()));
        let html = renderer.render(&ctx).unwrap();
        assert!(html.contains("Business Pro"));
        assert!(html.contains("Most Popular"));
        assert_eq!(html.matches("class=\"plan featured\"").count(), 1);
    }

    #[test]
    fn empty_collection_shows_placeholder_text() {
        let renderer = Renderer::new().unwrap();
        let html = renderer.render(&TemplateContext::new("Acme", Page::Portfolio)).unwrap();
        assert!(html.contains("No projects to show yet."));
    }

    #[test]
    fn content_is_html_escaped() {
        let renderer = Renderer::new().unwrap();
        let mut items = seed::portfolio();
        items[0].title = "<script>alert(1)</script>".to_string();
        let ctx = TemplateContext::new("Acme", Page::Portfolio).with_portfolio(&stored(items));
        let html = renderer.render(&ctx).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn unknown_route_in_context_is_rejected() {
        let renderer = Renderer::new().unwrap();
        let mut ctx = TemplateContext::new("Acme", Page::Home);
        ctx.page.route = "/blog".to_string();
        assert!(matches!(renderer.render(&ctx), Err(RenderError::UnknownRoute(r)) if r == "/blog"));
    }
}
