//! Form layer: untyped submitted input → validated records → sync service.
//!
//! The CLI and the daemon both receive content as JSON values. These helpers
//! pick the record type from a [`ContentKind`], reject input that does not
//! parse or validate, and only then call the service.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use folio_core::content::Content;
use folio_core::types::{ContentKind, HomePagePatch, PortfolioItem, PricingPlan, Service, WhyChooseUsPatch};
use folio_core::validate::{validate_list, Validate};

use crate::diff::{preview_replace, ReplacePreview};
use crate::service::{ContentSync, ReplaceOutcome};
use crate::SyncError;

/// Name of the list field in the admin form for `kind`; validation issues are
/// reported under it (`plans[1].title`).
pub fn form_name(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Portfolio => "items",
        ContentKind::Pricing => "plans",
        ContentKind::Services => "services",
    }
}

/// Parse and validate a submitted list of records.
///
/// Extra keys such as `id` and `createdAt` from an earlier `show` are ignored.
pub fn parse_items<T: Content + Validate>(items: Value) -> Result<Vec<T>, SyncError> {
    let parsed: Vec<T> = serde_json::from_value(items).map_err(|source| SyncError::Input {
        what: format!("{} input", T::KIND),
        source,
    })?;
    validate_list(form_name(T::KIND), &parsed)?;
    Ok(parsed)
}

/// Parse and validate a submitted singleton patch.
pub fn parse_patch<P: DeserializeOwned + Validate>(what: &str, patch: Value) -> Result<P, SyncError> {
    let parsed: P = serde_json::from_value(patch).map_err(|source| SyncError::Input {
        what: what.to_string(),
        source,
    })?;
    parsed.validate()?;
    Ok(parsed)
}

fn to_json<T: Serialize>(kind: ContentKind, value: &T) -> Result<Value, SyncError> {
    serde_json::to_value(value).map_err(|source| SyncError::Encode { kind, source })
}

/// `load` for `kind`, as JSON.
pub fn load(sync: &ContentSync, kind: ContentKind) -> Result<Value, SyncError> {
    match kind {
        ContentKind::Portfolio => to_json(kind, &sync.load::<PortfolioItem>()),
        ContentKind::Pricing => to_json(kind, &sync.load::<PricingPlan>()),
        ContentKind::Services => to_json(kind, &sync.load::<Service>()),
    }
}

/// Explicit seed for `kind`; `true` if defaults were written.
pub fn seed(sync: &ContentSync, kind: ContentKind) -> Result<bool, SyncError> {
    match kind {
        ContentKind::Portfolio => sync.seed::<PortfolioItem>(),
        ContentKind::Pricing => sync.seed::<PricingPlan>(),
        ContentKind::Services => sync.seed::<Service>(),
    }
}

/// Validate `items` and replace the whole `kind` collection with them.
pub fn replace(sync: &ContentSync, kind: ContentKind, items: Value) -> Result<ReplaceOutcome, SyncError> {
    match kind {
        ContentKind::Portfolio => sync.replace_all(&parse_items::<PortfolioItem>(items)?),
        ContentKind::Pricing => sync.replace_all(&parse_items::<PricingPlan>(items)?),
        ContentKind::Services => sync.replace_all(&parse_items::<Service>(items)?),
    }
}

/// Validate `items` and describe what replacing `kind` with them would change.
pub fn preview(sync: &ContentSync, kind: ContentKind, items: Value) -> Result<ReplacePreview, SyncError> {
    match kind {
        ContentKind::Portfolio => preview_replace(sync, &parse_items::<PortfolioItem>(items)?),
        ContentKind::Pricing => preview_replace(sync, &parse_items::<PricingPlan>(items)?),
        ContentKind::Services => preview_replace(sync, &parse_items::<Service>(items)?),
    }
}

pub fn update_home(sync: &ContentSync, patch: Value) -> Result<(), SyncError> {
    let patch: HomePagePatch = parse_patch("home page patch", patch)?;
    sync.update_home(&patch)
}

pub fn update_why_choose_us(sync: &ContentSync, patch: Value) -> Result<(), SyncError> {
    let patch: WhyChooseUsPatch = parse_patch("why-choose-us patch", patch)?;
    sync.update_why_choose_us(&patch)
}
