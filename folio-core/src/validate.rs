//! Form-layer validation.
//!
//! The sync service stores whatever it is given; callers run these checks on
//! submitted input first. Messages match the ones the admin forms show.

use crate::error::{FieldIssue, ValidationError};
use crate::types::{
    Feature, HomePagePatch, PortfolioItem, PricingPlan, Service, WhyChooseUsFeature,
    WhyChooseUsPatch,
};

/// Checks a submitted value, collecting issues under `prefix`.
pub trait Validate {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>);

    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        self.check("", &mut issues);
        finish(issues)
    }
}

/// Validate every record of a list form. `form` names the list field,
/// e.g. `plans`, so issues read `plans[1].title`.
pub fn validate_list<T: Validate>(form: &str, items: &[T]) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    for (i, item) in items.iter().enumerate() {
        item.check(&format!("{form}[{i}]"), &mut issues);
    }
    finish(issues)
}

fn finish(issues: Vec<FieldIssue>) -> Result<(), ValidationError> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn field(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn require(value: &str, prefix: &str, name: &str, message: &str, issues: &mut Vec<FieldIssue>) {
    min_len(value, 1, prefix, name, message, issues);
}

fn min_len(
    value: &str,
    min: usize,
    prefix: &str,
    name: &str,
    message: &str,
    issues: &mut Vec<FieldIssue>,
) {
    if value.chars().count() < min {
        issues.push(FieldIssue {
            field: field(prefix, name),
            message: message.to_string(),
        });
    }
}

fn check_features(features: &[Feature], prefix: &str, message: &str, issues: &mut Vec<FieldIssue>) {
    for (i, feature) in features.iter().enumerate() {
        require(
            &feature.name,
            &field(prefix, &format!("features[{i}]")),
            "name",
            message,
            issues,
        );
    }
}

impl Validate for PortfolioItem {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>) {
        require(&self.title, prefix, "title", "Title is required", issues);
        require(&self.category, prefix, "category", "Category is required", issues);
    }
}

impl Validate for PricingPlan {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>) {
        require(&self.title, prefix, "title", "Title is required.", issues);
        require(&self.price, prefix, "price", "Price is required.", issues);
        require(&self.description, prefix, "description", "Description is required.", issues);
        check_features(&self.features, prefix, "Feature name cannot be empty.", issues);
    }
}

impl Validate for Service {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>) {
        require(&self.icon, prefix, "icon", "Icon name is required", issues);
        require(&self.title, prefix, "title", "Title is required", issues);
        require(&self.price, prefix, "price", "Price is required", issues);
        require(&self.description, prefix, "description", "Description is required", issues);
        check_features(&self.features, prefix, "Feature name is required", issues);
    }
}

/// Every field of the home form is optional.
impl Validate for HomePagePatch {
    fn check(&self, _prefix: &str, _issues: &mut Vec<FieldIssue>) {}
}

impl Validate for WhyChooseUsFeature {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>) {
        require(&self.icon, prefix, "icon", "Icon name is required", issues);
        require(&self.title, prefix, "title", "Title is required", issues);
        require(&self.description, prefix, "description", "Description is required", issues);
    }
}

impl Validate for WhyChooseUsPatch {
    fn check(&self, prefix: &str, issues: &mut Vec<FieldIssue>) {
        if let Some(title) = &self.title {
            min_len(title, 5, prefix, "title", "Title must be at least 5 characters", issues);
        }
        if let Some(subtitle) = &self.subtitle {
            min_len(
                subtitle,
                10,
                prefix,
                "subtitle",
                "Subtitle must be at least 10 characters",
                issues,
            );
        }
        if let Some(features) = &self.features {
            for (i, feature) in features.iter().enumerate() {
                feature.check(&field(prefix, &format!("features[{i}]")), issues);
            }
        }
    }
}
