//! Worker lifecycle: install, activate, fetch.
//!
//! ```text
//! new --install--> installing --ok--> installed --activate--> active
//!                      |                                        |
//!                      +--fail--> redundant <------retire-------+
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use kiteshell_core::{CacheDb, Error};
use serde::Serialize;
use tokio::sync::RwLock;

use super::ShellConfig;
use super::classify::Policy;
use super::response::{Outcome, ShellResponse};
use super::strategy::{self, WriteTarget};
use crate::fetch::{Network, Request};

/// Lifecycle state of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    New,
    Installing,
    Installed,
    Active,
    /// Failed to install, or superseded by a newer version.
    Redundant,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::New => "new",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Active => "active",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub partition: String,
    pub cached: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub kept: Vec<String>,
}

/// What the host should do with an intercepted request.
#[derive(Debug)]
pub enum Disposition {
    /// Not handled; the host performs its default fetch.
    Passthrough,
    Respond(Outcome),
}

/// One method per lifecycle trigger, called by the hosting runtime.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    async fn install(&self) -> Result<InstallReport, Error>;
    async fn activate(&self) -> Result<ActivationReport, Error>;
    async fn fetch(&self, request: Request) -> Result<Disposition, Error>;
}

/// A worker version: fixed configuration plus lifecycle state.
pub struct Interceptor {
    config: ShellConfig,
    cache: CacheDb,
    network: Arc<dyn Network>,
    state: Arc<RwLock<WorkerState>>,
}

impl Interceptor {
    pub fn new(config: ShellConfig, cache: CacheDb, network: Arc<dyn Network>) -> Self {
        Self { config, cache, network, state: Arc::new(RwLock::new(WorkerState::New)) }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Mark this version superseded. It stops handling fetches and its
    /// policies stop writing; returns once writes in flight have landed.
    pub async fn retire(&self) {
        *self.state.write().await = WorkerState::Redundant;
        tracing::info!(static_cache = %self.config.static_cache, "worker retired");
    }

    async fn transition(&self, from: WorkerState, to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if *state != from {
            return Err(Error::InvalidState(format!("cannot enter {to} from {state}")));
        }
        *state = to;
        Ok(())
    }

    /// Fetch every manifest asset, then store them all in one transaction.
    async fn precache(&self) -> Result<usize, Error> {
        let fetches = self.config.precache.iter().map(|url| {
            let request = Request::get(url.clone());
            async move {
                let fetched = self
                    .network
                    .fetch(&request)
                    .await
                    .map_err(|e| Error::InstallFailed { url: request.url.to_string(), reason: e.to_string() })?;
                if !fetched.is_ok() {
                    return Err(Error::InstallFailed {
                        url: request.url.to_string(),
                        reason: format!("status {}", fetched.status.as_u16()),
                    });
                }
                Ok::<_, Error>(ShellResponse::from(fetched).to_entry(&request))
            }
        });

        let entries = try_join_all(fetches).await?;
        self.cache.put_entries(&self.config.static_cache, entries).await
    }
}

#[async_trait]
impl LifecycleHandler for Interceptor {
    /// Precache the manifest. Any failure leaves the worker redundant and
    /// stores nothing.
    async fn install(&self) -> Result<InstallReport, Error> {
        self.transition(WorkerState::New, WorkerState::Installing).await?;
        tracing::info!(
            partition = %self.config.static_cache,
            assets = self.config.precache.len(),
            "installing worker"
        );

        match self.precache().await {
            Ok(cached) => {
                self.transition(WorkerState::Installing, WorkerState::Installed).await?;
                Ok(InstallReport { partition: self.config.static_cache.clone(), cached })
            }
            Err(e) => {
                tracing::error!(error = %e, "install failed");
                *self.state.write().await = WorkerState::Redundant;
                Err(e)
            }
        }
    }

    /// Sweep partitions that belong to other versions, then take control.
    async fn activate(&self) -> Result<ActivationReport, Error> {
        let state = self.state().await;
        if state != WorkerState::Installed {
            return Err(Error::InvalidState(format!("cannot enter active from {state}")));
        }
        tracing::info!("activating worker");

        let mut report = ActivationReport::default();
        for name in self.cache.partition_names().await? {
            if name == self.config.static_cache || name == self.config.dynamic_cache {
                report.kept.push(name);
            } else {
                self.cache.delete_partition(&name).await?;
                tracing::info!(partition = %name, "deleted outdated partition");
                report.deleted.push(name);
            }
        }

        self.transition(WorkerState::Installed, WorkerState::Active).await?;
        Ok(report)
    }

    async fn fetch(&self, request: Request) -> Result<Disposition, Error> {
        if !request.is_get() || !request.is_http() {
            return Ok(Disposition::Passthrough);
        }
        if self.state().await != WorkerState::Active {
            return Ok(Disposition::Passthrough);
        }

        let route = self.config.classifier.classify(request.url.path());
        let target = WriteTarget::owned(self.config.partition(route.partition), Arc::clone(&self.state));
        tracing::debug!(url = %request.url, policy = ?route.policy, partition = target.partition(), "dispatching");

        let outcome = match route.policy {
            Policy::CacheFirst => strategy::cache_first(&self.cache, &self.network, &request, &target).await,
            Policy::NetworkFirst => strategy::network_first(&self.cache, &self.network, &request, &target).await,
            Policy::StaleWhileRevalidate => {
                strategy::stale_while_revalidate(&self.cache, &self.network, &request, &target).await?
            }
        };
        Ok(Disposition::Respond(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{Method, Url};
    use crate::intercept::response::ResponseSource;
    use crate::testing::ScriptedNetwork;
    use kiteshell_core::AppConfig;

    const ORIGIN: &str = "https://bakardykite.com";

    fn shell_config() -> ShellConfig {
        ShellConfig::from_app(&AppConfig { origin: ORIGIN.into(), ..Default::default() }).unwrap()
    }

    fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    fn script_manifest(scripted: &ScriptedNetwork, config: &ShellConfig) {
        for asset in &config.precache {
            scripted.respond(asset.as_str(), 200, asset.path());
        }
    }

    async fn setup() -> (CacheDb, Arc<ScriptedNetwork>, Interceptor) {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let scripted = ScriptedNetwork::new();
        let config = shell_config();
        script_manifest(&scripted, &config);
        let worker = Interceptor::new(config, cache.clone(), scripted.clone());
        (cache, scripted, worker)
    }

    async fn respond(worker: &Interceptor, request: Request) -> Outcome {
        match worker.fetch(request).await.unwrap() {
            Disposition::Respond(outcome) => outcome,
            Disposition::Passthrough => panic!("expected the worker to respond"),
        }
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let (cache, _scripted, worker) = setup().await;

        let report = worker.install().await.unwrap();
        assert_eq!(report.cached, 6);
        assert_eq!(report.partition, "static-v1");
        assert_eq!(worker.state().await, WorkerState::Installed);
        assert_eq!(cache.entry_count("static-v1").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_install_failure_stores_nothing() {
        let (cache, scripted, worker) = setup().await;
        scripted.respond(url("/favicon.svg").as_str(), 404, "missing");

        let err = worker.install().await.unwrap_err();
        assert!(matches!(err, Error::InstallFailed { ref url, .. } if url.ends_with("/favicon.svg")));
        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert_eq!(cache.entry_count("static-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_install_network_failure() {
        let (_cache, scripted, worker) = setup().await;
        scripted.fail(url("/fonts/Motiva-Sans-Bold.ttf").as_str());

        assert!(matches!(worker.install().await, Err(Error::InstallFailed { .. })));
        assert!(matches!(worker.activate().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_install_twice_is_invalid() {
        let (_cache, _scripted, worker) = setup().await;
        worker.install().await.unwrap();
        assert!(matches!(worker.install().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_before_install_is_invalid() {
        let (_cache, _scripted, worker) = setup().await;
        assert!(matches!(worker.activate().await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_sweeps_old_partitions() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        cache.open_partition("static-v1").await.unwrap();
        cache.open_partition("dynamic-v1").await.unwrap();
        cache.open_partition("bakardy-kite-v1").await.unwrap();

        let scripted = ScriptedNetwork::new();
        let config = shell_config().with_version(Some("static-v2".into()), None);
        script_manifest(&scripted, &config);
        let worker = Interceptor::new(config, cache.clone(), scripted.clone());

        worker.install().await.unwrap();
        let report = worker.activate().await.unwrap();

        assert_eq!(report.deleted, vec!["static-v1", "bakardy-kite-v1"]);
        assert_eq!(report.kept, vec!["dynamic-v1", "static-v2"]);
        assert_eq!(cache.partition_names().await.unwrap(), vec!["dynamic-v1", "static-v2"]);
        assert_eq!(worker.state().await, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_fetch_passes_through_until_active() {
        let (_cache, scripted, worker) = setup().await;
        let request = Request::get(url("/img/Bakar.jpeg"));

        assert!(matches!(worker.fetch(request.clone()).await.unwrap(), Disposition::Passthrough));
        worker.install().await.unwrap();
        assert!(matches!(worker.fetch(request).await.unwrap(), Disposition::Passthrough));
        assert_eq!(scripted.total_calls(), 6);
    }

    #[tokio::test]
    async fn test_fetch_passes_through_non_get_and_non_http() {
        let (_cache, scripted, worker) = setup().await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        let before = scripted.total_calls();

        let post = Request::new(Method::POST, url("/api/reviews"));
        assert!(matches!(worker.fetch(post).await.unwrap(), Disposition::Passthrough));

        let extension = Request::get(Url::parse("chrome-extension://abcdef/inject.js").unwrap());
        assert!(matches!(worker.fetch(extension).await.unwrap(), Disposition::Passthrough));

        assert_eq!(scripted.total_calls(), before);
    }

    #[tokio::test]
    async fn test_static_request_end_to_end() {
        let cache = CacheDb::open_in_memory().await.unwrap();
        let scripted = ScriptedNetwork::new();
        let config = ShellConfig { precache: Vec::new(), ..shell_config() };
        let worker = Interceptor::new(config, cache.clone(), scripted.clone());
        worker.install().await.unwrap();
        worker.activate().await.unwrap();

        let hero = url("/img/Bakar.jpeg");
        scripted.respond(hero.as_str(), 200, "jpeg bytes");

        let first = respond(&worker, Request::get(hero.clone())).await;
        assert_eq!(first.source, ResponseSource::Network);
        assert!(first.response.is_ok());
        assert_eq!(scripted.calls(hero.as_str()), 1);
        assert!(cache.match_entry("static-v1", &Request::get(hero.clone()).cache_key()).await.unwrap().is_some());

        let second = respond(&worker, Request::get(hero.clone())).await;
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(second.response.body_text(), "jpeg bytes");
        assert_eq!(scripted.calls(hero.as_str()), 1);
    }

    #[tokio::test]
    async fn test_precached_shell_served_offline() {
        let (_cache, scripted, worker) = setup().await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        scripted.fail(url("/").as_str());

        let outcome = respond(&worker, Request::get(url("/"))).await;
        assert_eq!(outcome.policy, Some(Policy::NetworkFirst));
        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(outcome.response.body_text(), "/");
    }

    #[tokio::test]
    async fn test_content_routed_to_dynamic_partition() {
        let (cache, scripted, worker) = setup().await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        let content = url("/content/services");
        scripted.respond(content.as_str(), 200, "services");

        let outcome = respond(&worker, Request::get(content.clone())).await;
        assert_eq!(outcome.policy, Some(Policy::StaleWhileRevalidate));
        assert!(cache.match_entry("dynamic-v1", &Request::get(content).cache_key()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_retired_worker_passes_through() {
        let (_cache, _scripted, worker) = setup().await;
        worker.install().await.unwrap();
        worker.activate().await.unwrap();
        worker.retire().await;

        assert_eq!(worker.state().await, WorkerState::Redundant);
        assert!(matches!(worker.fetch(Request::get(url("/"))).await.unwrap(), Disposition::Passthrough));
    }
}
