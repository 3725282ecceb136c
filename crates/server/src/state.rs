//! Shared state behind every tool call.

use std::sync::Arc;

use kiteshell_client::{AdminGate, Network, Registration, ReviewsClient, StoreClient, VisitorCounter};
use kiteshell_core::{AppConfig, CacheDb};

use crate::error::ToolError;

pub struct AppState {
    pub config: AppConfig,
    pub registration: Registration,
    reviews: Result<ReviewsClient, String>,
    visitors: Result<VisitorCounter, String>,
    pub admin: AdminGate,
}

impl AppState {
    pub fn new(config: AppConfig, cache: CacheDb, network: Arc<dyn Network>) -> Self {
        let store = StoreClient::from_app(&config).map_err(|e| {
            tracing::info!(error = %e, "review and visitor tools disabled");
            e.to_string()
        });
        let reviews = store.clone().map(|store| ReviewsClient::new(store, config.auto_approve_reviews));
        let visitors = store.map(VisitorCounter::new);
        let admin = AdminGate::new(config.admin_password.clone());
        if !admin.is_enabled() {
            tracing::info!("no admin password configured, moderation tools disabled");
        }

        Self { config, registration: Registration::new(cache, network), reviews, visitors, admin }
    }

    /// The review store client, or why it is unavailable.
    pub fn reviews(&self) -> Result<&ReviewsClient, ToolError> {
        self.reviews
            .as_ref()
            .map_err(|reason| ToolError::StoreUnavailable(reason.clone()))
    }

    /// The visitor counter, or why it is unavailable.
    pub fn visitors(&self) -> Result<&VisitorCounter, ToolError> {
        self.visitors
            .as_ref()
            .map_err(|reason| ToolError::StoreUnavailable(reason.clone()))
    }
}
