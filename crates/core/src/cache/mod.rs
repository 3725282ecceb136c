//! SQLite-backed storage for named cache partitions.
//!
//! A partition is a version-tagged bucket (`static-v1`, `dynamic-v1`) that
//! maps request identities to response snapshots. This module supports:
//!
//! - Request identity hashing (method + URL)
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Whole-partition deletion, which cascades to entries

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::CachedEntry;
pub use partitions::PartitionInfo;
