//! Template context: serializable rendering payload built from stored content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use folio_core::types::{
    HomePageContent, PortfolioItem, PricingPlan, Service, Stored, WhyChooseUsContent,
};

use crate::engine::Page;
use crate::error::RenderError;

/// Everything a page template can read.
///
/// Start from [`TemplateContext::new`] and attach the content the page shows
/// with the `with_*` builders; sections left empty render their placeholder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    pub site: SiteCtx,
    pub page: PageCtx,
    pub hero: Option<HeroCtx>,
    pub why: Option<WhyCtx>,
    pub portfolio: Vec<PortfolioCtx>,
    pub plans: Vec<PlanCtx>,
    pub services: Vec<ServiceCtx>,
    /// Set when the home page shows only the first few services.
    pub services_truncated: bool,
    pub meta: MetaCtx,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteCtx {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageCtx {
    pub route: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroCtx {
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhyCtx {
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    pub features: Vec<WhyFeatureCtx>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhyFeatureCtx {
    pub icon: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioCtx {
    pub id: String,
    pub title: String,
    pub category: String,
    /// `image` or `video`.
    pub media_kind: String,
    pub media_url: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCtx {
    pub id: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub featured: bool,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceCtx {
    pub id: String,
    pub icon: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub image: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaCtx {
    pub folio_version: String,
    pub rendered_at: DateTime<Utc>,
}

impl TemplateContext {
    /// Empty context for `page`.
    pub fn new(site_name: impl Into<String>, page: Page) -> Self {
        TemplateContext {
            site: SiteCtx { name: site_name.into() },
            page: PageCtx {
                route: page.route().to_string(),
                title: page.title().to_string(),
            },
            hero: None,
            why: None,
            portfolio: vec![],
            plans: vec![],
            services: vec![],
            services_truncated: false,
            meta: MetaCtx {
                folio_version: env!("CARGO_PKG_VERSION").to_string(),
                rendered_at: Utc::now(),
            },
        }
    }

    pub fn with_hero(mut self, home: &HomePageContent) -> Self {
        self.hero = Some(HeroCtx { image: home.hero_image.clone() });
        self
    }

    pub fn with_why(mut self, why: &WhyChooseUsContent) -> Self {
        self.why = Some(WhyCtx {
            title: why.title.clone(),
            subtitle: why.subtitle.clone(),
            image: why.image.clone(),
            features: why
                .features
                .iter()
                .map(|f| WhyFeatureCtx {
                    icon: f.icon.clone(),
                    title: f.title.clone(),
                    description: f.description.clone(),
                })
                .collect(),
        });
        self
    }

    pub fn with_portfolio(mut self, items: &[Stored<PortfolioItem>]) -> Self {
        self.portfolio = items
            .iter()
            .map(|s| PortfolioCtx {
                id: s.id.to_string(),
                title: s.item.title.clone(),
                category: s.item.category.clone(),
                media_kind: s.item.media_kind.to_string(),
                media_url: s.item.media_url.clone().filter(|u| !u.is_empty()),
                link: s.item.link.clone().filter(|u| !u.is_empty()),
            })
            .collect();
        self
    }

    pub fn with_plans(mut self, plans: &[Stored<PricingPlan>]) -> Self {
        self.plans = plans
            .iter()
            .map(|s| PlanCtx {
                id: s.id.to_string(),
                title: s.item.title.clone(),
                price: s.item.price.clone(),
                description: s.item.description.clone(),
                featured: s.item.is_featured,
                features: s.item.features.iter().map(|f| f.name.clone()).collect(),
            })
            .collect();
        self
    }

    /// Attach services; `limit` keeps only the first `limit` entries.
    pub fn with_services(mut self, services: &[Stored<Service>], limit: Option<usize>) -> Self {
        let shown = limit.unwrap_or(services.len()).min(services.len());
        self.services_truncated = shown < services.len();
        self.services = services[..shown]
            .iter()
            .map(|s| ServiceCtx {
                id: s.id.to_string(),
                icon: s.item.icon.clone(),
                title: s.item.title.clone(),
                price: s.item.price.clone(),
                description: s.item.description.clone(),
                image: s.item.image.clone(),
                features: s.item.features.iter().map(|f| f.name.clone()).collect(),
            })
            .collect();
        self
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::seed;
    use folio_core::types::{DocumentId, MediaKind};

    fn stored_services(n: usize) -> Vec<Stored<Service>> {
        let template = seed::services().remove(0);
        (0..n)
            .map(|i| Stored {
                id: DocumentId::from(format!("s{i}")),
                created_at: "2024-05-01T10:00:00.000Z".to_string(),
                item: Service { title: format!("Service {i}"), ..template.clone() },
            })
            .collect()
    }

    #[test]
    fn services_limit_keeps_leading_entries() {
        let ctx = TemplateContext::new("Acme", Page::Home).with_services(&stored_services(8), Some(6));
        assert_eq!(ctx.services.len(), 6);
        assert!(ctx.services_truncated);
        assert_eq!(ctx.services[5].title, "Service 5");
    }

    #[test]
    fn services_under_limit_are_not_truncated() {
        let ctx = TemplateContext::new("Acme", Page::Home).with_services(&stored_services(2), Some(6));
        assert_eq!(ctx.services.len(), 2);
        assert!(!ctx.services_truncated);
    }

    #[test]
    fn empty_media_url_is_dropped() {
        let item = PortfolioItem {
            title: "Promo".into(),
            category: "Video".into(),
            media_kind: MediaKind::Video,
            media_url: Some(String::new()),
            link: None,
        };
        let stored = Stored {
            id: DocumentId::from("p1"),
            created_at: "2024-05-01T10:00:00.000Z".to_string(),
            item,
        };
        let ctx = TemplateContext::new("Acme", Page::Portfolio).with_portfolio(&[stored]);
        assert_eq!(ctx.portfolio[0].media_kind, "video");
        assert_eq!(ctx.portfolio[0].media_url, None);
    }

    #[test]
    fn tera_context_exposes_site_and_page() {
        let ctx = TemplateContext::new("Acme", Page::Pricing).to_tera_context().unwrap();
        let json = ctx.into_json();
        assert_eq!(json["site"]["name"], "Acme");
        assert_eq!(json["page"]["route"], "/pricing");
    }
}
