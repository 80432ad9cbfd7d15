//! Domain types for site content.
//!
//! Field names on the wire match the names already used by stored documents
//! (`mediaType`, `mediaUrl`, `is_featured`, `hero_image`, `createdAt`), so records
//! written by earlier versions of the site stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Store-assigned identifier of a document inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    /// A fresh random identifier, as assigned by the store on insert.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Address of a singleton document: `<collection>/<doc>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    pub collection: &'static str,
    pub doc: &'static str,
}

impl DocPath {
    pub const fn new(collection: &'static str, doc: &'static str) -> Self {
        Self { collection, doc }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.doc)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The list-valued content collections that share the load / replace-all contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Portfolio,
    Pricing,
    Services,
}

impl ContentKind {
    /// All kinds in a stable order.
    pub fn all() -> &'static [ContentKind] {
        &[ContentKind::Portfolio, ContentKind::Pricing, ContentKind::Services]
    }

    /// Name of the backing collection in the document store.
    pub fn collection(&self) -> &'static str {
        match self {
            ContentKind::Portfolio => "portfolio_items",
            ContentKind::Pricing => "pricing_plans",
            ContentKind::Services => "services",
        }
    }

    /// Public page dedicated to this collection.
    pub fn detail_route(&self) -> &'static str {
        match self {
            ContentKind::Portfolio => "/portfolio",
            ContentKind::Pricing => "/pricing",
            ContentKind::Services => "/services",
        }
    }

    /// Every public route whose rendering shows this collection.
    pub fn routes(&self) -> [&'static str; 2] {
        [self.detail_route(), "/"]
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Portfolio => write!(f, "portfolio"),
            ContentKind::Pricing => write!(f, "pricing"),
            ContentKind::Services => write!(f, "services"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "portfolio" => Ok(ContentKind::Portfolio),
            "pricing" => Ok(ContentKind::Pricing),
            "services" => Ok(ContentKind::Services),
            other => Err(format!(
                "unknown content kind '{other}'; expected: portfolio, pricing, services"
            )),
        }
    }
}

/// Kind of media shown for a portfolio item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

// ---------------------------------------------------------------------------
// Collection records
// ---------------------------------------------------------------------------

/// One line of a plan or service feature list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
}

impl From<&str> for Feature {
    fn from(name: &str) -> Self {
        Self { name: name.to_owned() }
    }
}

/// A showcased project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub title: String,
    pub category: String,
    #[serde(rename = "mediaType", default)]
    pub media_kind: MediaKind,
    #[serde(rename = "mediaUrl", default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A pricing tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPlan {
    pub title: String,
    /// Display text, currency included (e.g. `₹4999`).
    pub price: String,
    pub description: String,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// An offered service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Symbol name from the site's icon set.
    pub icon: String,
    pub title: String,
    pub price: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// A record as returned by a load: the item plus its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: DocumentId,
    /// RFC 3339 UTC timestamp with millisecond precision.
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(flatten)]
    pub item: T,
}

// ---------------------------------------------------------------------------
// Singletons
// ---------------------------------------------------------------------------

/// Home page hero content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePageContent {
    pub hero_image: String,
}

/// Partial update for [`HomePageContent`]; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HomePagePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image: Option<String>,
}

/// One selling point of the "why choose us" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhyChooseUsFeature {
    pub icon: String,
    pub title: String,
    pub description: String,
}

/// The "why choose us" section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhyChooseUsContent {
    pub title: String,
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub features: Vec<WhyChooseUsFeature>,
}

/// Partial update for [`WhyChooseUsContent`]. A supplied `features` list
/// replaces the stored list as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WhyChooseUsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<WhyChooseUsFeature>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("Pricing".parse::<ContentKind>(), Ok(ContentKind::Pricing));
        assert!("blog".parse::<ContentKind>().unwrap_err().contains("blog"));
    }

    #[test]
    fn every_kind_invalidates_its_page_and_home() {
        for kind in ContentKind::all() {
            let routes = kind.routes();
            assert!(routes.contains(&"/"));
            assert_eq!(routes[0], kind.detail_route());
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }

    #[test]
    fn stored_record_flattens_item_fields() {
        let stored = Stored {
            id: DocumentId::from("abc"),
            created_at: "2024-05-01T10:00:00.000Z".to_string(),
            item: Feature::from("Custom Design"),
        };
        let json = serde_json::to_value(&stored).expect("serialize");
        assert_eq!(json["id"], "abc");
        assert_eq!(json["createdAt"], "2024-05-01T10:00:00.000Z");
        assert_eq!(json["name"], "Custom Design");
    }

    #[test]
    fn portfolio_item_uses_stored_field_names() {
        let item = PortfolioItem {
            title: "Shop".into(),
            category: "Web App".into(),
            media_kind: MediaKind::Video,
            media_url: Some("https://cdn.example.com/a.mp4".into()),
            link: None,
        };
        let json = serde_json::to_value(&item).expect("serialize");
        assert_eq!(json["mediaType"], "video");
        assert_eq!(json["mediaUrl"], "https://cdn.example.com/a.mp4");
        assert!(json.get("link").is_none());
    }
}
