use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, Instant};

use folio_core::types::ContentKind;
use folio_daemon::paths::socket_path;
use folio_daemon::{request, request_status, request_stop, DaemonError, DaemonRequest};
use serde_json::{json, Value};
use tempfile::TempDir;

fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(50));
    }
    false
}

/// Run the blocking client calls off the runtime threads.
async fn client<T, F>(home: &Path, f: F) -> T
where
    F: FnOnce(PathBuf) -> T + Send + 'static,
    T: Send + 'static,
{
    let home = home.to_path_buf();
    tokio::task::spawn_blocking(move || f(home))
        .await
        .expect("client task")
}

async fn start_daemon(home: &Path) -> tokio::task::JoinHandle<Result<(), DaemonError>> {
    let handle = tokio::spawn(folio_daemon::run(home.to_path_buf()));
    let started = client(home, |home| {
        wait_until(Duration::from_secs(5), || request_status(&home).is_ok())
    })
    .await;
    assert!(started, "daemon did not come up");
    handle
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn replace_through_socket_is_visible_to_load_and_pages() {
    let home = TempDir::new().expect("home");
    let daemon = start_daemon(home.path()).await;

    let rendered: Value = client(home.path(), |home| {
        let mut page = DaemonRequest::new("page");
        page.route = Some("/services".to_string());
        request(&home, &page).expect("page")
    })
    .await;
    assert!(rendered["body"].as_str().unwrap().contains("Our Services"));

    let outcome: Value = client(home.path(), |home| {
        let mut replace = DaemonRequest::new("replace");
        replace.kind = Some(ContentKind::Services);
        replace.items = Some(json!([
            { "title": "Brand Strategy", "price": "₹2999", "description": "Positioning workshops", "icon": "compass" }
        ]));
        request(&home, &replace).expect("replace")
    })
    .await;
    assert_eq!(outcome["inserted"], json!(1));

    let (loaded, page, status): (Value, Value, Value) = client(home.path(), |home| {
        let mut load = DaemonRequest::new("load");
        load.kind = Some(ContentKind::Services);
        let loaded = request(&home, &load).expect("load");

        let mut page = DaemonRequest::new("page");
        page.route = Some("/services".to_string());
        let page = request(&home, &page).expect("page");

        (loaded, page, request_status(&home).expect("status"))
    })
    .await;

    assert_eq!(loaded.as_array().map(Vec::len), Some(1));
    assert_eq!(loaded[0]["title"], json!("Brand Strategy"));
    assert!(page["body"].as_str().unwrap().contains("Brand Strategy"));
    assert_eq!(status["writes"], json!(1u64));

    client(home.path(), |home| request_stop(&home).expect("stop")).await;
    let result = tokio::time::timeout(Duration::from_secs(5), daemon)
        .await
        .expect("daemon exits after stop")
        .expect("join");
    assert!(result.is_ok());
    assert!(!socket_path(home.path()).exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_input_leaves_content_untouched() {
    let home = TempDir::new().expect("home");
    let daemon = start_daemon(home.path()).await;

    let (err, plans) = client(home.path(), |home| {
        let mut load = DaemonRequest::new("load");
        load.kind = Some(ContentKind::Pricing);
        let before = request(&home, &load).expect("load");

        let mut replace = DaemonRequest::new("replace");
        replace.kind = Some(ContentKind::Pricing);
        replace.items = Some(json!([{ "title": "", "price": "", "description": "" }]));
        let err = request(&home, &replace).expect_err("invalid plans");

        let after = request(&home, &load).expect("load");
        assert_eq!(before, after);
        (err, after)
    })
    .await;

    assert!(err.to_string().contains("plans[0].title"));
    assert_eq!(plans.as_array().map(Vec::len), Some(2));

    client(home.path(), |home| request_stop(&home).expect("stop")).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), daemon).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn home_patch_round_trips_over_socket() {
    let home = TempDir::new().expect("home");
    let daemon = start_daemon(home.path()).await;

    let stored: Value = client(home.path(), |home| {
        let mut update = DaemonRequest::new("home_update");
        update.patch = Some(json!({ "hero_image": "https://cdn.example.com/hero.webp" }));
        request(&home, &update).expect("home_update");
        request(&home, &DaemonRequest::new("home")).expect("home")
    })
    .await;
    assert_eq!(stored["hero_image"], json!("https://cdn.example.com/hero.webp"));

    client(home.path(), |home| request_stop(&home).expect("stop")).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), daemon).await;
}
