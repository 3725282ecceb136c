//! Review store client.
//!
//! Typed access to the `reviews` table. Visitors see approved rows only;
//! moderation reads everything and flips approval or deletes rows.

pub mod admin;
pub mod types;

pub use admin::AdminGate;
pub use types::{DEFAULT_RATING, NewReview, Review};

use kiteshell_core::AppConfig;
use reqwest::Method;

use crate::store::{StoreClient, StoreError, id_filter};

const TABLE: &str = "reviews";

/// PostgREST client for the `reviews` table.
#[derive(Debug, Clone)]
pub struct ReviewsClient {
    store: StoreClient,
    /// Approval state given to new submissions.
    auto_approve: bool,
}

impl ReviewsClient {
    pub fn new(store: StoreClient, auto_approve: bool) -> Self {
        Self { store, auto_approve }
    }

    pub fn from_app(app: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self::new(StoreClient::from_app(app)?, app.auto_approve_reviews))
    }

    pub fn auto_approve(&self) -> bool {
        self.auto_approve
    }

    /// Approved reviews, newest first.
    pub async fn list_approved(&self) -> Result<Vec<Review>, StoreError> {
        let query = [("select", "*".to_string()), ("approved", "eq.true".to_string()), order_newest()];
        self.store.send_json(self.store.request(TABLE, Method::GET, &query)).await
    }

    /// Every review including unapproved ones, newest first.
    pub async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        let query = [("select", "*".to_string()), order_newest()];
        self.store.send_json(self.store.request(TABLE, Method::GET, &query)).await
    }

    /// Validate and insert a review, returning the stored row.
    pub async fn submit(&self, review: NewReview) -> Result<Review, StoreError> {
        review.validate()?;
        let insert = review.into_insert(self.auto_approve);

        let builder = self
            .store
            .request(TABLE, Method::POST, &[])
            .header("Prefer", "return=representation")
            .json(&[insert]);
        let rows: Vec<Review> = self.store.send_json(builder).await?;

        let stored = rows
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Parse("insert returned no rows".into()))?;
        tracing::info!(id = stored.id, approved = stored.approved, "review submitted");
        Ok(stored)
    }

    /// Publish or hide a review.
    pub async fn set_approved(&self, id: i64, approved: bool) -> Result<Review, StoreError> {
        let builder = self
            .store
            .request(TABLE, Method::PATCH, &[id_filter(id)])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "approved": approved }));
        let rows: Vec<Review> = self.store.send_json(builder).await?;

        let updated = rows.into_iter().next().ok_or(StoreError::NotFound(id))?;
        tracing::info!(id, approved, "review moderated");
        Ok(updated)
    }

    /// Delete a review, returning the removed row.
    pub async fn delete(&self, id: i64) -> Result<Review, StoreError> {
        let builder = self
            .store
            .request(TABLE, Method::DELETE, &[id_filter(id)])
            .header("Prefer", "return=representation");
        let rows: Vec<Review> = self.store.send_json(builder).await?;

        let deleted = rows.into_iter().next().ok_or(StoreError::NotFound(id))?;
        tracing::info!(id, "review deleted");
        Ok(deleted)
    }
}

fn order_newest() -> (&'static str, String) {
    ("order", "created_at.desc".to_string())
}
