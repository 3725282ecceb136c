//! Host-side registration of worker versions.
//!
//! A registration owns the active worker. Registering a new version installs
//! it, and on success puts it in control at once (no waiting for old
//! clients): the previous version is retired first, then the new one
//! activates and sweeps outdated partitions. A failed install leaves the
//! previous version in control. Registrations run one at a time.

use std::sync::Arc;

use kiteshell_core::{CacheDb, Error};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use super::ShellConfig;
use super::lifecycle::{ActivationReport, Disposition, InstallReport, Interceptor, LifecycleHandler};
use super::response::{Outcome, ResponseSource, ShellResponse};
use crate::fetch::{Network, Request};

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
    pub static_cache: String,
    pub dynamic_cache: String,
    pub install: InstallReport,
    pub activation: ActivationReport,
    /// Whether an older version was retired.
    pub replaced: bool,
}

pub struct Registration {
    cache: CacheDb,
    network: Arc<dyn Network>,
    active: RwLock<Option<Arc<Interceptor>>>,
    registering: Mutex<()>,
}

impl Registration {
    pub fn new(cache: CacheDb, network: Arc<dyn Network>) -> Self {
        Self { cache, network, active: RwLock::new(None), registering: Mutex::new(()) }
    }

    pub fn cache(&self) -> &CacheDb {
        &self.cache
    }

    /// The worker currently in control, if any.
    pub async fn active(&self) -> Option<Arc<Interceptor>> {
        self.active.read().await.clone()
    }

    /// Install and activate a new worker version.
    ///
    /// The previous worker is retired before the sweep, so none of its
    /// writes can land in a partition the sweep deletes. Fetches wait for the
    /// handover to finish. If activation itself fails, no worker is active
    /// and requests pass through until the next registration.
    pub async fn register(&self, config: ShellConfig) -> Result<RegistrationReport, Error> {
        let _registering = self.registering.lock().await;
        let worker = Arc::new(Interceptor::new(config, self.cache.clone(), Arc::clone(&self.network)));

        let install = worker.install().await?;

        let mut active = self.active.write().await;
        let previous = active.take();
        if let Some(previous) = &previous {
            previous.retire().await;
        }
        let activation = worker.activate().await.inspect_err(|e| {
            tracing::error!(error = %e, "activation failed; no worker in control");
        })?;
        *active = Some(Arc::clone(&worker));
        drop(active);

        tracing::info!(
            static_cache = %worker.config().static_cache,
            dynamic_cache = %worker.config().dynamic_cache,
            deleted = activation.deleted.len(),
            "worker registered"
        );

        Ok(RegistrationReport {
            static_cache: worker.config().static_cache.clone(),
            dynamic_cache: worker.config().dynamic_cache.clone(),
            install,
            activation,
            replaced: previous.is_some(),
        })
    }

    /// Route a request through the active worker.
    pub async fn fetch(&self, request: Request) -> Result<Disposition, Error> {
        match self.active().await {
            Some(worker) => worker.fetch(request).await,
            None => Ok(Disposition::Passthrough),
        }
    }

    /// Route a request and perform the default network fetch for anything
    /// the worker declines. Pass-through network errors are returned as is.
    pub async fn handle(&self, request: Request) -> Result<Outcome, Error> {
        match self.fetch(request.clone()).await? {
            Disposition::Respond(outcome) => Ok(outcome),
            Disposition::Passthrough => {
                let response = ShellResponse::from(self.network.fetch(&request).await?);
                Ok(Outcome { response, source: ResponseSource::Passthrough, policy: None, revalidation: None })
            }
        }
    }
}
