//! Cached response entries.
//!
//! Entries are response snapshots keyed by request identity inside a
//! partition. Writes are upserts, so concurrent writers for the same key
//! resolve as last-write-wins.

use super::connection::CacheDb;
use super::partitions::ensure_partition;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// A stored response snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// Request identity, see [`super::hash::request_key`].
    pub key: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    /// Header pairs in response order.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// RFC 3339 insertion time.
    pub stored_at: String,
}

const SELECT_COLUMNS: &str = "e.key, e.method, e.url, e.status, e.headers_json, e.body, e.stored_at";

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<(CachedEntry, String)> {
    let headers_json: String = row.get(4)?;
    Ok((
        CachedEntry {
            key: row.get(0)?,
            method: row.get(1)?,
            url: row.get(2)?,
            status: row.get(3)?,
            headers: Vec::new(),
            body: row.get(5)?,
            stored_at: row.get(6)?,
        },
        headers_json,
    ))
}

fn decode(found: Option<(CachedEntry, String)>) -> Result<Option<CachedEntry>, Error> {
    match found {
        Some((mut entry, headers_json)) => {
            entry.headers = serde_json::from_str(&headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
            Ok(Some(entry))
        }
        None => Ok(None),
    }
}

fn insert(conn: &rusqlite::Connection, partition_id: i64, entry: &CachedEntry) -> Result<(), Error> {
    let headers_json = serde_json::to_string(&entry.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    conn.execute(
        "INSERT INTO entries (partition_id, key, method, url, status, headers_json, body, stored_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(partition_id, key) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            partition_id,
            &entry.key,
            &entry.method,
            &entry.url,
            entry.status,
            headers_json,
            &entry.body,
            &entry.stored_at,
        ],
    )?;
    Ok(())
}

impl CacheDb {
    /// Insert or replace an entry, creating the partition if needed.
    pub async fn put_entry(&self, partition: &str, entry: &CachedEntry) -> Result<(), Error> {
        let partition = partition.to_string();
        let entry = entry.clone();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let partition_id = ensure_partition(conn, &partition)?;
                insert(conn, partition_id, &entry)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a batch of entries atomically: either all are written or none.
    pub async fn put_entries(&self, partition: &str, entries: Vec<CachedEntry>) -> Result<usize, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<usize, Error> {
                let tx = conn.transaction()?;
                let partition_id = ensure_partition(&tx, &partition)?;
                for entry in &entries {
                    insert(&tx, partition_id, entry)?;
                }
                tx.commit()?;
                Ok(entries.len())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry in one partition.
    pub async fn match_entry(&self, partition: &str, key: &str) -> Result<Option<CachedEntry>, Error> {
        let partition = partition.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let found = conn
                    .query_row(
                        &format!(
                            "SELECT {SELECT_COLUMNS} FROM entries e
                             JOIN partitions p ON p.id = e.partition_id
                             WHERE p.name = ?1 AND e.key = ?2"
                        ),
                        params![partition, key],
                        row_to_entry,
                    )
                    .optional()?;
                decode(found)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry across all partitions, oldest partition first.
    pub async fn match_any(&self, key: &str) -> Result<Option<CachedEntry>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedEntry>, Error> {
                let found = conn
                    .query_row(
                        &format!(
                            "SELECT {SELECT_COLUMNS} FROM entries e
                             JOIN partitions p ON p.id = e.partition_id
                             WHERE e.key = ?1 ORDER BY p.id ASC LIMIT 1"
                        ),
                        params![key],
                        row_to_entry,
                    )
                    .optional()?;
                decode(found)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry from a partition.
    ///
    /// Returns false if the entry was not present.
    pub async fn delete_entry(&self, partition: &str, key: &str) -> Result<bool, Error> {
        let partition = partition.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute(
                    "DELETE FROM entries WHERE key = ?2
                     AND partition_id = (SELECT id FROM partitions WHERE name = ?1)",
                    params![partition, key],
                )?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries held by a partition (0 if it doesn't exist).
    pub async fn entry_count(&self, partition: &str) -> Result<u64, Error> {
        let partition = partition.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries e JOIN partitions p ON p.id = e.partition_id WHERE p.name = ?1",
                    params![partition],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::hash::request_key;

    fn make_test_entry(url: &str, body: &str) -> CachedEntry {
        CachedEntry {
            key: request_key("GET", url),
            method: "GET".to_string(),
            url: url.to_string(),
            status: 200,
            headers: vec![("content-type".to_string(), "text/plain".to_string())],
            body: body.as_bytes().to_vec(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("https://example.com/img/Bakar.jpeg", "jpeg");

        db.put_entry("static-v1", &entry).await.unwrap();

        let found = db.match_entry("static-v1", &entry.key).await.unwrap().unwrap();
        assert_eq!(found, entry);
        assert!(db.has_partition("static-v1").await.unwrap());
    }

    #[tokio::test]
    async fn test_match_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.match_entry("static-v1", "nonexistent").await.unwrap().is_none());
        assert!(db.match_any("nonexistent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://example.com/content/schedule";
        db.put_entry("dynamic-v1", &make_test_entry(url, "old")).await.unwrap();
        db.put_entry("dynamic-v1", &make_test_entry(url, "new")).await.unwrap();

        let found = db.match_any(&request_key("GET", url)).await.unwrap().unwrap();
        assert_eq!(found.body, b"new");
        assert_eq!(db.entry_count("dynamic-v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_match_any_prefers_oldest_partition() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://example.com/";
        db.put_entry("static-v1", &make_test_entry(url, "static")).await.unwrap();
        db.put_entry("dynamic-v1", &make_test_entry(url, "dynamic")).await.unwrap();

        let found = db.match_any(&request_key("GET", url)).await.unwrap().unwrap();
        assert_eq!(found.body, b"static");
    }

    #[tokio::test]
    async fn test_delete_partition_cascades() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("https://example.com/fonts/Motiva-Sans-Bold.ttf", "ttf");
        db.put_entry("static-v1", &entry).await.unwrap();

        db.delete_partition("static-v1").await.unwrap();
        db.open_partition("static-v1").await.unwrap();

        assert!(db.match_any(&entry.key).await.unwrap().is_none());
        assert_eq!(db.entry_count("static-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_put_entries_batch() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entries = vec![
            make_test_entry("https://example.com/", "shell"),
            make_test_entry("https://example.com/favicon.svg", "svg"),
        ];

        let stored = db.put_entries("static-v1", entries).await.unwrap();
        assert_eq!(stored, 2);
        assert_eq!(db.entry_count("static-v1").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let entry = make_test_entry("https://example.com/api/reviews", "[]");
        db.put_entry("dynamic-v1", &entry).await.unwrap();

        assert!(db.delete_entry("dynamic-v1", &entry.key).await.unwrap());
        assert!(!db.delete_entry("dynamic-v1", &entry.key).await.unwrap());
        assert!(db.has_partition("dynamic-v1").await.unwrap());
    }
}
