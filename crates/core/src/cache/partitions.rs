//! Partition lifecycle operations.
//!
//! Partitions are created lazily on first open or first write, enumerated in
//! creation order, and deleted wholesale when a new worker version activates.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Summary of a live partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PartitionInfo {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

/// Look up a partition id, creating the partition when it does not exist.
pub(crate) fn ensure_partition(conn: &rusqlite::Connection, name: &str) -> Result<i64, rusqlite::Error> {
    conn.execute(
        "INSERT OR IGNORE INTO partitions (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    conn.query_row("SELECT id FROM partitions WHERE name = ?1", params![name], |row| row.get(0))
}

impl CacheDb {
    /// Open a partition by name, creating it if needed.
    pub async fn open_partition(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_partition(conn, &name)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a partition exists.
    pub async fn has_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let id: Option<i64> = conn
                    .query_row("SELECT id FROM partitions WHERE name = ?1", params![name], |row| row.get(0))
                    .optional()?;
                Ok(id.is_some())
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all partitions in creation order.
    pub async fn partition_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM partitions ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// All partitions with their entry counts, in creation order.
    pub async fn list_partitions(&self) -> Result<Vec<PartitionInfo>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<PartitionInfo>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT p.name, p.created_at, COUNT(e.key)
                     FROM partitions p LEFT JOIN entries e ON e.partition_id = p.id
                     GROUP BY p.id ORDER BY p.id ASC",
                )?;
                let partitions = stmt
                    .query_map([], |row| {
                        Ok(PartitionInfo {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(partitions)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a partition and every entry it holds.
    ///
    /// Returns false if no partition had that name.
    pub async fn delete_partition(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM partitions WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("static-v1").await.unwrap();
        db.open_partition("static-v1").await.unwrap();

        assert_eq!(db.partition_names().await.unwrap(), vec!["static-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_names_in_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("static-v1").await.unwrap();
        db.open_partition("dynamic-v1").await.unwrap();
        db.open_partition("bakardy-kite-v1").await.unwrap();

        let names = db.partition_names().await.unwrap();
        assert_eq!(names, vec!["static-v1", "dynamic-v1", "bakardy-kite-v1"]);
    }

    #[tokio::test]
    async fn test_delete_partition() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("static-v1").await.unwrap();

        assert!(db.delete_partition("static-v1").await.unwrap());
        assert!(!db.has_partition("static-v1").await.unwrap());
        assert!(!db.delete_partition("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_partitions_counts_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_partition("static-v1").await.unwrap();
        db.open_partition("dynamic-v1").await.unwrap();

        let partitions = db.list_partitions().await.unwrap();
        assert_eq!(partitions.len(), 2);
        assert!(partitions.iter().all(|p| p.entries == 0));
    }
}
