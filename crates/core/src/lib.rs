//! Core types and shared functionality for kiteshell.
//!
//! This crate provides:
//! - Cache partitions and response entries with a SQLite backend
//! - Unified error types
//! - Layered configuration

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CachedEntry, PartitionInfo};
pub use config::{AppConfig, CacheStrategies, ConfigError};
pub use error::Error;
