//! Site configuration at `<home>/.folio/config.yaml`.
//!
//! # Storage layout
//!
//! ```text
//! <home>/.folio/
//!   config.yaml    (mode 0600, written by `folio init`)
//!   store/         (default FileStore root)
//!   daemon.sock
//! ```
//!
//! # API pattern
//!
//! Every I/O function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: resolves home via [`home`], delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable that overrides the home directory.
pub const HOME_ENV: &str = "FOLIO_HOME";

/// When default content is written into an empty collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// A load that finds the collection empty seeds it first.
    #[default]
    OnEmptyRead,
    /// Loads never write; seeding happens only through an explicit seed call.
    Explicit,
}

/// Contents of `config.yaml`. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub site_name: String,
    /// FileStore root; `<home>/.folio/store` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    pub seed_policy: SeedPolicy,
    /// How many services the home page shows.
    pub home_services_limit: usize,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            site_name: "Folio".to_string(),
            store_dir: None,
            seed_policy: SeedPolicy::default(),
            home_services_limit: 6,
        }
    }
}

impl FolioConfig {
    /// Resolved FileStore root for this config.
    pub fn store_dir_at(&self, home: &Path) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| folio_root(home).join("store"))
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.folio`
pub fn folio_root(home: &Path) -> PathBuf {
    home.join(".folio")
}

/// `<home>/.folio/config.yaml` (pure, no I/O).
pub fn config_path_at(home: &Path) -> PathBuf {
    folio_root(home).join("config.yaml")
}

/// The home directory: `$FOLIO_HOME` if set, else the user's home.
pub fn home() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

/// Load `config.yaml`; a missing file yields [`FolioConfig::default`].
pub fn load_at(home: &Path) -> Result<FolioConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(FolioConfig::default());
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<FolioConfig, ConfigError> {
    load_at(&home()?)
}

/// Atomically save `config.yaml`.
///
/// Write flow: serialize → `config.yaml.tmp` → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, config: &FolioConfig) -> Result<(), ConfigError> {
    let root = folio_root(home);
    if !root.exists() {
        std::fs::create_dir_all(&root)?;
        set_dir_permissions(&root)?;
    }
    let path = config_path_at(home);
    let tmp = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// Write a default config unless one exists. Idempotent: returns the existing
/// config unchanged when `config.yaml` is already present.
pub fn init_at(home: &Path, site_name: Option<String>) -> Result<FolioConfig, ConfigError> {
    if config_path_at(home).exists() {
        return load_at(home);
    }
    let mut config = FolioConfig::default();
    if let Some(name) = site_name {
        config.site_name = name;
    }
    save_at(home, &config)?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_config_loads_defaults() {
        let home = TempDir::new().expect("tempdir");
        let config = load_at(home.path()).expect("load");
        assert_eq!(config, FolioConfig::default());
        assert_eq!(config.home_services_limit, 6);
    }

    #[test]
    fn store_dir_defaults_under_folio_root() {
        let home = TempDir::new().expect("tempdir");
        let dir = FolioConfig::default().store_dir_at(home.path());
        assert!(dir.ends_with(".folio/store"));
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let home = TempDir::new().expect("tempdir");
        std::fs::create_dir_all(folio_root(home.path())).unwrap();
        std::fs::write(config_path_at(home.path()), "seed_policy: explicit\n").unwrap();

        let config = load_at(home.path()).expect("load");
        assert_eq!(config.seed_policy, SeedPolicy::Explicit);
        assert_eq!(config.site_name, "Folio");
    }

    #[test]
    fn save_sets_file_permissions_and_cleans_tmp() {
        let home = TempDir::new().expect("tempdir");
        save_at(home.path(), &FolioConfig::default()).expect("save");
        let path = config_path_at(home.path());
        assert!(!path.with_file_name("config.yaml.tmp").exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o600);
        }
    }

    #[test]
    fn init_is_idempotent() {
        let home = TempDir::new().expect("tempdir");
        let first = init_at(home.path(), Some("Acme Studio".into())).expect("init");
        let second = init_at(home.path(), Some("Other".into())).expect("init again");
        assert_eq!(first, second);
        assert_eq!(second.site_name, "Acme Studio");
    }
}
