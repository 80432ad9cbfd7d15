//! Documents written by older versions of the site must keep loading.
//!
//! Each `#[case]` writes one raw collection file into a fresh store and checks
//! the decoded public shape.

use folio_core::{
    content::{to_stored, Content},
    store::DocumentStore,
    FileStore, MediaKind, PortfolioItem, PricingPlan, Service,
};
use rstest::rstest;
use serde_json::{json, Value};
use tempfile::TempDir;

fn store_with(collection: &str, docs: Value) -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::open(dir.path());
    let path = store.collection_path(collection);
    std::fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    std::fs::write(&path, serde_json::to_string(&docs).expect("json")).expect("write");
    (dir, store)
}

fn load<T: Content>(store: &FileStore) -> Vec<T> {
    store
        .query_ordered(T::KIND.collection())
        .expect("query")
        .iter()
        .map(|doc| to_stored::<T>(doc).expect("decode").item)
        .collect()
}

#[rstest]
#[case::legacy_image_field(
    json!({"title": "Old", "category": "Web", "image": "https://x/old.png"}),
    MediaKind::Image,
    Some("https://x/old.png")
)]
#[case::video_item(
    json!({"title": "Reel", "category": "Film", "mediaType": "video", "mediaUrl": "https://x/a.mp4"}),
    MediaKind::Video,
    Some("https://x/a.mp4")
)]
#[case::no_media_at_all(
    json!({"title": "Bare", "category": "Misc"}),
    MediaKind::Image,
    None
)]
fn portfolio_media_coercions(
    #[case] fields: Value,
    #[case] kind: MediaKind,
    #[case] url: Option<&str>,
) {
    let docs = json!([{"id": "p1", "fields": fields}]);
    let (_dir, store) = store_with("portfolio_items", docs);
    let items = load::<PortfolioItem>(&store);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].media_kind, kind);
    assert_eq!(items[0].media_url.as_deref(), url);
}

#[rstest]
#[case::string_flag(json!("true"), true)]
#[case::numeric_flag(json!(1), true)]
#[case::missing_flag(Value::Null, false)]
fn pricing_flag_coercions(#[case] flag: Value, #[case] expected: bool) {
    let docs = json!([{"id": "p1", "fields": {
        "title": "Pro", "price": "₹1", "description": "d", "is_featured": flag,
        "features": [{"id": "legacy-1", "name": "SEO"}],
    }}]);
    let (_dir, store) = store_with("pricing_plans", docs);
    let plans = load::<PricingPlan>(&store);
    assert_eq!(plans[0].is_featured, expected);
    assert_eq!(plans[0].features[0].name, "SEO");
}

#[test]
fn ordering_follows_created_at_not_file_order() {
    let docs = json!([
        {"id": "late", "fields": {"icon": "A", "title": "Late", "price": "1", "description": "d",
                                  "createdAt": "2024-03-01T00:00:00Z"}},
        {"id": "early", "fields": {"icon": "B", "title": "Early", "price": "1", "description": "d",
                                   "createdAt": {"seconds": 1_700_000_000, "nanoseconds": 0}}},
    ]);
    let (_dir, store) = store_with("services", docs);
    let titles: Vec<_> = load::<Service>(&store).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Early", "Late"]);
}
