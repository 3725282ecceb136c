//! Request interceptor and cache strategy dispatcher.
//!
//! Every outbound GET to an http(s) URL is classified by path and served by
//! one of three policies over two version-tagged partitions:
//!
//! | category | policy                 | partition |
//! |----------|------------------------|-----------|
//! | static   | cache-first            | static    |
//! | network  | network-first          | dynamic   |
//! | stale    | stale-while-revalidate | dynamic   |
//! | other    | network-first          | dynamic   |
//!
//! Install precaches the manifest into the static partition; activation
//! deletes partitions that belong to other versions. Other requests pass
//! through untouched.

pub mod classify;
pub mod lifecycle;
pub mod registration;
pub mod response;
pub mod strategy;

pub use classify::{Classifier, PartitionKind, Policy, Route};
pub use lifecycle::{ActivationReport, Disposition, InstallReport, Interceptor, LifecycleHandler, WorkerState};
pub use registration::{Registration, RegistrationReport};
pub use response::{OFFLINE_BODY, Outcome, ResponseSource, ShellResponse};
pub use strategy::WriteTarget;

use kiteshell_core::{AppConfig, Error};

use crate::fetch::{Url, parse_origin};

/// Fixed configuration of one worker version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub origin: Url,
    pub static_cache: String,
    pub dynamic_cache: String,
    /// Absolute URLs precached at install.
    pub precache: Vec<Url>,
    pub classifier: Classifier,
}

impl ShellConfig {
    /// Resolve the manifest against the origin and freeze the classification table.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = parse_origin(&config.origin)?;
        let precache = config
            .precache
            .iter()
            .map(|path| crate::fetch::resolve(&origin, path))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            origin,
            static_cache: config.static_cache.clone(),
            dynamic_cache: config.dynamic_cache.clone(),
            precache,
            classifier: Classifier::new(config.strategies.clone()),
        })
    }

    /// Same configuration under new partition tags.
    pub fn with_version(mut self, static_cache: Option<String>, dynamic_cache: Option<String>) -> Self {
        if let Some(tag) = static_cache {
            self.static_cache = tag;
        }
        if let Some(tag) = dynamic_cache {
            self.dynamic_cache = tag;
        }
        self
    }

    pub fn partition(&self, kind: PartitionKind) -> &str {
        match kind {
            PartitionKind::Static => &self.static_cache,
            PartitionKind::Dynamic => &self.dynamic_cache,
        }
    }
}
