//! The three caching policies.
//!
//! Each policy is a linear sequence of fallible async steps. Network errors
//! are recovered here (cache fallback or a synthetic 503), with one
//! exception: stale-while-revalidate with an empty cache has nothing to
//! fall back to and returns the network error.
//!
//! Lookups search every partition in creation order; writes go to the
//! partition the route names, and only while the owning worker is active.
//! Cache failures are logged and behave like a miss or a skipped write.

use std::sync::Arc;

use kiteshell_core::{CacheDb, CachedEntry, Error};
use tokio::sync::RwLock;

use super::classify::Policy;
use super::lifecycle::WorkerState;
use super::response::{Outcome, ResponseSource, ShellResponse};
use crate::fetch::{Network, Request};

/// The partition a policy writes to.
///
/// An owned target belongs to a worker version: its writes are dropped once
/// that worker leaves the active state. The state is read-locked for the
/// duration of each write, so retiring a worker waits for writes in flight.
#[derive(Debug, Clone)]
pub struct WriteTarget {
    partition: String,
    owner: Option<Arc<RwLock<WorkerState>>>,
}

impl WriteTarget {
    /// A target with no owning worker; writes always go through.
    pub fn new(partition: impl Into<String>) -> Self {
        Self { partition: partition.into(), owner: None }
    }

    pub(crate) fn owned(partition: impl Into<String>, owner: Arc<RwLock<WorkerState>>) -> Self {
        Self { partition: partition.into(), owner: Some(owner) }
    }

    pub fn partition(&self) -> &str {
        &self.partition
    }
}

async fn lookup(cache: &CacheDb, request: &Request) -> Option<CachedEntry> {
    match cache.match_any(&request.cache_key()).await {
        Ok(found) => found,
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "cache lookup failed; treating as miss");
            None
        }
    }
}

async fn store(cache: &CacheDb, target: &WriteTarget, request: &Request, response: &ShellResponse) {
    let _live = match &target.owner {
        Some(owner) => {
            let state = owner.read().await;
            let current = *state;
            if current != WorkerState::Active {
                tracing::debug!(url = %request.url, partition = %target.partition, state = %current, "worker not active; write dropped");
                return;
            }
            Some(state)
        }
        None => None,
    };

    if let Err(e) = cache.put_entry(&target.partition, &response.to_entry(request)).await {
        tracing::warn!(url = %request.url, partition = %target.partition, error = %e, "cache write failed");
    }
}

/// Serve from cache; on a miss fetch, store if ok, and return.
pub async fn cache_first(
    cache: &CacheDb, network: &Arc<dyn Network>, request: &Request, target: &WriteTarget,
) -> Outcome {
    if let Some(entry) = lookup(cache, request).await {
        tracing::debug!(url = %request.url, "cache-first hit");
        return Outcome::new(entry.into(), ResponseSource::Cache, Policy::CacheFirst);
    }

    match network.fetch(request).await {
        Ok(fetched) => {
            let response = ShellResponse::from(fetched);
            if response.is_ok() {
                store(cache, target, request, &response).await;
            }
            Outcome::new(response, ResponseSource::Network, Policy::CacheFirst)
        }
        Err(e) => {
            tracing::warn!(url = %request.url, error = %e, "cache-first miss and network failed");
            Outcome::offline(request, Policy::CacheFirst)
        }
    }
}

/// Fetch first; store ok responses; fall back to cache, then to 503.
pub async fn network_first(
    cache: &CacheDb, network: &Arc<dyn Network>, request: &Request, target: &WriteTarget,
) -> Outcome {
    match network.fetch(request).await {
        Ok(fetched) => {
            let response = ShellResponse::from(fetched);
            if response.is_ok() {
                store(cache, target, request, &response).await;
            }
            Outcome::new(response, ResponseSource::Network, Policy::NetworkFirst)
        }
        Err(e) => match lookup(cache, request).await {
            Some(entry) => {
                tracing::debug!(url = %request.url, error = %e, "network failed; serving cached copy");
                Outcome::new(entry.into(), ResponseSource::Cache, Policy::NetworkFirst)
            }
            None => {
                tracing::debug!(url = %request.url, error = %e, "network failed with no cached copy");
                Outcome::offline(request, Policy::NetworkFirst)
            }
        },
    }
}

/// Serve the cached copy immediately and refresh it in the background.
///
/// With nothing cached, the caller waits for the network instead, and a
/// network failure is returned as an error.
pub async fn stale_while_revalidate(
    cache: &CacheDb, network: &Arc<dyn Network>, request: &Request, target: &WriteTarget,
) -> Result<Outcome, Error> {
    if let Some(entry) = lookup(cache, request).await {
        tracing::debug!(url = %request.url, "serving stale copy; revalidating");
        let refresh = tokio::spawn(revalidate(cache.clone(), Arc::clone(network), request.clone(), target.clone()));
        let mut outcome = Outcome::new(entry.into(), ResponseSource::Cache, Policy::StaleWhileRevalidate);
        outcome.revalidation = Some(refresh);
        return Ok(outcome);
    }

    let response = ShellResponse::from(network.fetch(request).await?);
    if response.is_ok() {
        store(cache, target, request, &response).await;
    }
    Ok(Outcome::new(response, ResponseSource::Network, Policy::StaleWhileRevalidate))
}

async fn revalidate(cache: CacheDb, network: Arc<dyn Network>, request: Request, target: WriteTarget) {
    match network.fetch(&request).await {
        Ok(fetched) if fetched.is_ok() => {
            store(&cache, &target, &request, &ShellResponse::from(fetched)).await;
        }
        Ok(fetched) => {
            tracing::debug!(url = %request.url, status = fetched.status.as_u16(), "revalidation not ok; keeping cached copy");
        }
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "revalidation failed; keeping cached copy");
        }
    }
}
