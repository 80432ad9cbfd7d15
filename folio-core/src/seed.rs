//! Built-in default content written into an empty store.

use crate::types::{
    Feature, HomePageContent, MediaKind, PortfolioItem, PricingPlan, Service,
    WhyChooseUsContent, WhyChooseUsFeature,
};

/// Placeholder used for portfolio and service media.
pub const PLACEHOLDER_MEDIA: &str = "https://placehold.co/600x400.png";
/// Placeholder used for the home page hero.
pub const PLACEHOLDER_HERO: &str = "https://placehold.co/800x600.png";

pub fn portfolio() -> Vec<PortfolioItem> {
    [("E-commerce Platform", "Web App"), ("Corporate Landing Page", "Website")]
        .into_iter()
        .map(|(title, category)| PortfolioItem {
            title: title.to_string(),
            category: category.to_string(),
            media_kind: MediaKind::Image,
            media_url: Some(PLACEHOLDER_MEDIA.to_string()),
            link: Some("https://example.com".to_string()),
        })
        .collect()
}

pub fn pricing() -> Vec<PricingPlan> {
    vec![
        PricingPlan {
            title: "Basic".to_string(),
            price: "₹4999".to_string(),
            description: "Perfect for personal sites or small businesses.".to_string(),
            is_featured: false,
            features: vec![Feature::from("Up to 5 Pages"), Feature::from("Responsive Design")],
        },
        PricingPlan {
            title: "Business Pro".to_string(),
            price: "₹9999".to_string(),
            description: "Ideal for growing businesses and professionals.".to_string(),
            is_featured: true,
            features: vec![Feature::from("Up to 10 Pages"), Feature::from("Blog Integration")],
        },
    ]
}

pub fn services() -> Vec<Service> {
    vec![Service {
        icon: "Briefcase".to_string(),
        title: "Business Websites".to_string(),
        price: "Starting at ₹4999".to_string(),
        description: "A professional online presence is crucial. We build beautiful, fast, \
                      and secure websites that represent your brand and attract customers."
            .to_string(),
        image: PLACEHOLDER_MEDIA.to_string(),
        features: vec![Feature::from("Custom Design"), Feature::from("Mobile-Friendly")],
    }]
}

pub fn home() -> HomePageContent {
    HomePageContent {
        hero_image: PLACEHOLDER_HERO.to_string(),
    }
}

pub fn why_choose_us() -> WhyChooseUsContent {
    let feature = |icon: &str, title: &str, description: &str| WhyChooseUsFeature {
        icon: icon.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    };
    WhyChooseUsContent {
        title: "Why Choose Us?".to_string(),
        subtitle: "We combine craft and speed to ship websites that grow your business."
            .to_string(),
        image: Some(PLACEHOLDER_MEDIA.to_string()),
        features: vec![
            feature("Zap", "Fast Delivery", "Most sites go live within two weeks."),
            feature("ShieldCheck", "Secure by Default", "HTTPS, backups and updates included."),
            feature("Headphones", "Dedicated Support", "A real person answers every request."),
        ],
    }
}
