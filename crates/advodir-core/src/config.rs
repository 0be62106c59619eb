//! Configuration types for advodir.
//!
//! [`Config::load`] reads `~/.config/advodir/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `ADVODIR__*`
//! environment overrides. [`Config::defaults`] returns the same defaults
//! without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
bind = "127.0.0.1:3000"

[store]
backend    = "sqlite"
path       = "advodir.db"
seed       = ""
pool_size  = 4
timeout_ms = 5000

[search]
default_page_size = 10
max_page_size     = 100
"#;

const ENV_PREFIX: &str = "ADVODIR";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// `[server]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// Which [`AdvocateStore`](crate::store::AdvocateStore) implementation backs
/// the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Sqlite,
    Memory,
}

/// `[store]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_backend")]
    pub backend: Backend,
    /// SQLite database file. `:memory:` opens a private single-connection
    /// database.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Optional JSON roster loaded into the memory backend at startup.
    /// Empty means none.
    #[serde(default)]
    pub seed: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    /// Upper bound on each store round-trip.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_backend() -> Backend { Backend::Sqlite }
fn default_path() -> PathBuf { PathBuf::from("advodir.db") }
fn default_pool_size() -> usize { 4 }
fn default_timeout_ms() -> u64 { 5000 }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_path(),
            seed: String::new(),
            pool_size: default_pool_size(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The seed roster path, if one is configured.
    pub fn seed_path(&self) -> Option<&Path> {
        let seed = self.seed.trim();
        (!seed.is_empty()).then(|| Path::new(seed))
    }
}

/// `[search]` section of `config.toml`: pagination limits applied when
/// parsing untrusted request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
}

fn default_page_size() -> u32 { 10 }
fn default_max_page_size() -> u32 { 100 }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/advodir/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::load_from(&path)
    }

    /// Load from an explicit file, layered on top of the built-in defaults
    /// and under the environment overrides. A missing file is not an error.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.store.pool_size >= 1, "store.pool_size must be at least 1");
        anyhow::ensure!(self.store.timeout_ms >= 1, "store.timeout_ms must be at least 1");
        anyhow::ensure!(
            self.search.default_page_size >= 1,
            "search.default_page_size must be at least 1"
        );
        anyhow::ensure!(
            self.search.max_page_size >= self.search.default_page_size,
            "search.max_page_size ({}) must not be below search.default_page_size ({})",
            self.search.max_page_size,
            self.search.default_page_size
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("advodir")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
