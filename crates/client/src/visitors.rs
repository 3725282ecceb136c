//! Site visitor counter.
//!
//! The `visitor_count` table holds a single row. Tracking a visit reads it,
//! then writes `count + 1` back by id; an empty table is seeded with a count
//! of one.

use kiteshell_core::AppConfig;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::store::{StoreClient, StoreError, id_filter};

const TABLE: &str = "visitor_count";

/// The counter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VisitorCount {
    pub id: i64,
    pub count: i64,
}

#[derive(Debug, Deserialize)]
struct CounterRow {
    id: i64,
    #[serde(default)]
    count: Option<i64>,
}

impl From<CounterRow> for VisitorCount {
    fn from(row: CounterRow) -> Self {
        Self { id: row.id, count: row.count.unwrap_or(0) }
    }
}

/// PostgREST client for the `visitor_count` table.
#[derive(Debug, Clone)]
pub struct VisitorCounter {
    store: StoreClient,
}

impl VisitorCounter {
    pub fn new(store: StoreClient) -> Self {
        Self { store }
    }

    pub fn from_app(app: &AppConfig) -> Result<Self, StoreError> {
        Ok(Self::new(StoreClient::from_app(app)?))
    }

    /// The counter row, or `None` while the table is empty.
    pub async fn current(&self) -> Result<Option<VisitorCount>, StoreError> {
        let query = [("select", "*".to_string()), ("order", "id.asc".to_string()), ("limit", "1".to_string())];
        let rows: Vec<CounterRow> = self.store.send_json(self.store.request(TABLE, Method::GET, &query)).await?;
        Ok(rows.into_iter().next().map(VisitorCount::from))
    }

    /// Count one visit and return the new total.
    ///
    /// Read then write: two visits tracked at the same moment may both
    /// write the same total.
    pub async fn track(&self) -> Result<VisitorCount, StoreError> {
        let tracked = match self.current().await? {
            None => self.seed().await?,
            Some(current) => self.write(current.id, current.count + 1).await?,
        };
        tracing::info!(id = tracked.id, count = tracked.count, "visit tracked");
        Ok(tracked)
    }

    async fn seed(&self) -> Result<VisitorCount, StoreError> {
        let builder = self
            .store
            .request(TABLE, Method::POST, &[])
            .header("Prefer", "return=representation")
            .json(&[serde_json::json!({ "count": 1 })]);
        let rows: Vec<CounterRow> = self.store.send_json(builder).await?;

        rows.into_iter()
            .next()
            .map(VisitorCount::from)
            .ok_or_else(|| StoreError::Parse("insert returned no rows".into()))
    }

    async fn write(&self, id: i64, count: i64) -> Result<VisitorCount, StoreError> {
        let builder = self
            .store
            .request(TABLE, Method::PATCH, &[id_filter(id)])
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "count": count }));
        let rows: Vec<CounterRow> = self.store.send_json(builder).await?;

        rows.into_iter().next().map(VisitorCount::from).ok_or(StoreError::NotFound(id))
    }
}
