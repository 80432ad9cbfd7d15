//! Config error-message, atomic-write-safety, and init integration tests.

use assert_fs::prelude::*;
use folio_core::{
    config::{self, FolioConfig, SeedPolicy},
    ConfigError,
};
use predicates::prelude::predicate;
use std::fs;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".folio/config.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("config.yaml"), "must contain file path, got: {err}");
}

#[test]
fn unknown_seed_policy_is_rejected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".folio/config.yaml")
        .write_str("seed_policy: sometimes\n")
        .expect("write");

    let err = config::load_at(home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let saved = FolioConfig {
        site_name: "Acme Studio".to_string(),
        ..FolioConfig::default()
    };
    config::save_at(home.path(), &saved).expect("save");

    let path = config::config_path_at(home.path());
    let original_bytes = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("config.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write crash tmp");

    assert_eq!(original_bytes, fs::read(&path).expect("read after crash"));
    assert_eq!(config::load_at(home.path()).expect("load"), saved);
}

// ---------------------------------------------------------------------------
// 3. Init integration test
// ---------------------------------------------------------------------------

#[test]
fn init_writes_config_with_defaults() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let config = config::init_at(home.path(), None).expect("init");

    home.child(".folio/config.yaml").assert(predicate::path::exists());
    home.child(".folio/config.yaml")
        .assert(predicate::str::contains("seed_policy: on_empty_read"));
    assert_eq!(config.home_services_limit, 6);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(home.child(".folio").path())
            .expect("meta")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o700, "expected 0700, got {mode:o}");
    }
}

#[test]
fn explicit_store_dir_is_respected() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let elsewhere = assert_fs::TempDir::new().expect("tempdir");
    let config = FolioConfig {
        store_dir: Some(elsewhere.path().to_path_buf()),
        seed_policy: SeedPolicy::Explicit,
        ..FolioConfig::default()
    };
    config::save_at(home.path(), &config).expect("save");

    let loaded = config::load_at(home.path()).expect("load");
    assert_eq!(loaded.store_dir_at(home.path()), elsewhere.path());
    assert_eq!(loaded.seed_policy, SeedPolicy::Explicit);
}
