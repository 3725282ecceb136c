//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (KITESHELL_*)
//! 2. TOML config file (if KITESHELL_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Ordered URL-path substring patterns, one list per policy category.
///
/// Categories are consulted static, then network, then stale; a path that
/// matches none of them falls back to network-first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStrategies {
    /// Cache-first patterns (asset path prefixes).
    #[serde(rename = "static", default = "default_static_patterns")]
    pub static_assets: Vec<String>,

    /// Network-first patterns (API and data endpoints).
    #[serde(default = "default_network_patterns")]
    pub network: Vec<String>,

    /// Stale-while-revalidate patterns (content endpoints).
    #[serde(default = "default_stale_patterns")]
    pub stale: Vec<String>,
}

impl Default for CacheStrategies {
    fn default() -> Self {
        Self {
            static_assets: default_static_patterns(),
            network: default_network_patterns(),
            stale: default_stale_patterns(),
        }
    }
}

fn default_static_patterns() -> Vec<String> {
    vec!["/img/".into(), "/fonts/".into(), "/static/".into()]
}

fn default_network_patterns() -> Vec<String> {
    vec!["/api/".into(), "/reviews/".into()]
}

fn default_stale_patterns() -> Vec<String> {
    vec!["/content/".into()]
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (KITESHELL_*)
/// 2. TOML config file (if KITESHELL_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to SQLite cache database.
    ///
    /// Set via KITESHELL_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Origin the install manifest and relative request URLs resolve against.
    ///
    /// Set via KITESHELL_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Optional HTTP request timeout in milliseconds.
    ///
    /// Unset means fetches wait until the transport gives up.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Name of the static partition; bump on deploy to invalidate assets.
    #[serde(default = "default_static_cache")]
    pub static_cache: String,

    /// Name of the dynamic partition.
    #[serde(default = "default_dynamic_cache")]
    pub dynamic_cache: String,

    /// Paths precached into the static partition at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// URL classification table.
    #[serde(default)]
    pub strategies: CacheStrategies,

    /// Base URL of the review store (PostgREST).
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Anonymous API key for the review store.
    #[serde(default)]
    pub supabase_key: Option<String>,

    /// Shared admin password for moderation tools. Unset disables them.
    #[serde(default)]
    pub admin_password: Option<String>,

    /// Whether newly submitted reviews are published without moderation.
    #[serde(default = "default_true")]
    pub auto_approve_reviews: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./kiteshell-cache.sqlite")
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_user_agent() -> String {
    "kiteshell/0.1".into()
}

fn default_max_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_static_cache() -> String {
    "static-v1".into()
}

fn default_dynamic_cache() -> String {
    "dynamic-v1".into()
}

fn default_precache() -> Vec<String> {
    [
        "/",
        "/img/Bakar.jpeg",
        "/fonts/Motiva-Sans-Bold.ttf",
        "/fonts/Motiva-Sans-Light.ttf",
        "/favicon.svg",
        "/manifest.json",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            origin: default_origin(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: None,
            static_cache: default_static_cache(),
            dynamic_cache: default_dynamic_cache(),
            precache: default_precache(),
            strategies: CacheStrategies::default(),
            supabase_url: None,
            supabase_key: None,
            admin_password: None,
            auto_approve_reviews: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("KITESHELL_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("KITESHELL_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Review store URL and key, required only by the review tools.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` naming the first absent setting.
    pub fn require_supabase(&self) -> Result<(&str, &str), ConfigError> {
        let url = self.supabase_url.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "supabase_url".into(),
            hint: "Set KITESHELL_SUPABASE_URL environment variable".into(),
        })?;
        let key = self.supabase_key.as_deref().ok_or_else(|| ConfigError::Missing {
            field: "supabase_key".into(),
            hint: "Set KITESHELL_SUPABASE_KEY environment variable".into(),
        })?;
        Ok((url, key))
    }
}
