//! Mapping between typed content and stored documents.
//!
//! [`Content`] is implemented by the three list-valued record types and
//! [`Singleton`] by the two single-document sections. Decoding is where the
//! read-side compatibility rules live:
//!
//! | Type          | Rule                                                              |
//! |---------------|-------------------------------------------------------------------|
//! | PortfolioItem | missing `mediaType` → `image`; empty `mediaUrl` → legacy `image`  |
//! | PricingPlan   | `is_featured` coerced to bool by truthiness                       |
//! | plan/service  | feature entries keep only `name`                                  |
//! | all records   | unparseable `createdAt` → now                                     |
//! | HomePage      | missing/empty `hero_image` → placeholder                          |

use chrono::{SecondsFormat, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::seed;
use crate::store::{parse_timestamp, Document, Fields, CREATED_AT};
use crate::types::{
    ContentKind, DocPath, Feature, HomePageContent, HomePagePatch, MediaKind, PortfolioItem,
    PricingPlan, Service, Stored, WhyChooseUsContent, WhyChooseUsFeature, WhyChooseUsPatch,
};

/// A record type stored as one document per item in a collection.
pub trait Content: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ContentKind;

    /// Records written into an empty collection.
    fn defaults() -> Vec<Self>;

    /// Decode stored fields, applying compatibility coercions.
    fn decode(fields: &Fields) -> Result<Self, serde_json::Error>;

    /// Fields to store for this record (without `createdAt`).
    fn encode(&self) -> Result<Fields, serde_json::Error> {
        to_fields(self)
    }
}

/// A section stored as a single document that is patched field by field.
pub trait Singleton: Serialize + Clone + Send + Sync + 'static {
    type Patch: Serialize + DeserializeOwned + Send + Sync;

    const PATH: DocPath;
    /// Public routes that render this section.
    const ROUTES: &'static [&'static str];

    fn default_content() -> Self;

    /// Decode the stored document; absent or malformed fields fall back to defaults.
    fn decode(fields: &Fields) -> Self;

    /// Only the fields the patch supplies.
    fn patch_fields(patch: &Self::Patch) -> Result<Fields, serde_json::Error> {
        to_fields(patch)
    }
}

/// Convert a stored document to its public shape.
pub fn to_stored<T: Content>(doc: &Document) -> Result<Stored<T>, serde_json::Error> {
    Ok(Stored {
        id: doc.id.clone(),
        created_at: normalize_created_at(doc.fields.get(CREATED_AT)),
        item: T::decode(&doc.fields)?,
    })
}

/// Portable text form of a stored timestamp: RFC 3339, UTC, milliseconds.
/// Anything unparseable becomes the current time.
pub fn normalize_created_at(raw: Option<&Value>) -> String {
    raw.and_then(parse_timestamp)
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Serialize `value` into a document field map; it must serialize as an object.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// JavaScript-style truthiness, matching how older writers stored flags.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
struct RawFeature {
    #[serde(default)]
    name: String,
}

fn clean_features(raw: Vec<RawFeature>) -> Vec<Feature> {
    raw.into_iter().map(|f| Feature { name: f.name }).collect()
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawPortfolioItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    category: String,
    #[serde(rename = "mediaType", default)]
    media_kind: Option<MediaKind>,
    #[serde(rename = "mediaUrl", default)]
    media_url: Option<String>,
    /// Field name used before media could be a video.
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

impl Content for PortfolioItem {
    const KIND: ContentKind = ContentKind::Portfolio;

    fn defaults() -> Vec<Self> {
        seed::portfolio()
    }

    fn decode(fields: &Fields) -> Result<Self, serde_json::Error> {
        let raw: RawPortfolioItem = serde_json::from_value(Value::Object(fields.clone()))?;
        Ok(PortfolioItem {
            title: raw.title,
            category: raw.category,
            media_kind: raw.media_kind.unwrap_or_default(),
            media_url: non_empty(raw.media_url).or_else(|| non_empty(raw.image)),
            link: raw.link,
        })
    }
}

#[derive(Deserialize)]
struct RawPricingPlan {
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_featured: Value,
    #[serde(default)]
    features: Vec<RawFeature>,
}

impl Content for PricingPlan {
    const KIND: ContentKind = ContentKind::Pricing;

    fn defaults() -> Vec<Self> {
        seed::pricing()
    }

    fn decode(fields: &Fields) -> Result<Self, serde_json::Error> {
        let raw: RawPricingPlan = serde_json::from_value(Value::Object(fields.clone()))?;
        Ok(PricingPlan {
            title: raw.title,
            price: raw.price,
            description: raw.description,
            is_featured: truthy(&raw.is_featured),
            features: clean_features(raw.features),
        })
    }
}

#[derive(Deserialize)]
struct RawService {
    #[serde(default)]
    icon: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

impl Content for Service {
    const KIND: ContentKind = ContentKind::Services;

    fn defaults() -> Vec<Self> {
        seed::services()
    }

    fn decode(fields: &Fields) -> Result<Self, serde_json::Error> {
        let raw: RawService = serde_json::from_value(Value::Object(fields.clone()))?;
        Ok(Service {
            icon: raw.icon,
            title: raw.title,
            price: raw.price,
            description: raw.description,
            image: raw.image,
            features: clean_features(raw.features),
        })
    }
}

// ---------------------------------------------------------------------------
// Singletons
// ---------------------------------------------------------------------------

impl Singleton for HomePageContent {
    type Patch = HomePagePatch;

    const PATH: DocPath = DocPath::new("pages", "home");
    const ROUTES: &'static [&'static str] = &["/"];

    fn default_content() -> Self {
        seed::home()
    }

    fn decode(fields: &Fields) -> Self {
        let hero_image = fields
            .get("hero_image")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| seed::PLACEHOLDER_HERO.to_string());
        HomePageContent { hero_image }
    }
}

impl Singleton for WhyChooseUsContent {
    type Patch = WhyChooseUsPatch;

    const PATH: DocPath = DocPath::new("pages", "why-choose-us");
    const ROUTES: &'static [&'static str] = &["/"];

    fn default_content() -> Self {
        seed::why_choose_us()
    }

    fn decode(fields: &Fields) -> Self {
        let defaults = seed::why_choose_us();
        let text = |key: &str| {
            fields
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        let features = fields
            .get("features")
            .cloned()
            .and_then(|v| serde_json::from_value::<Vec<WhyChooseUsFeature>>(v).ok());

        WhyChooseUsContent {
            title: text("title").unwrap_or(defaults.title),
            subtitle: text("subtitle").unwrap_or(defaults.subtitle),
            image: text("image").or(defaults.image),
            features: features.unwrap_or(defaults.features),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
