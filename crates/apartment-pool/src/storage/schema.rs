//! `SQLite` schema definitions for apartment-pool.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the key-value table.
///
/// Each row is one durable key, the way a browser keeps one string per
/// local-storage key.
pub const CREATE_KV_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Index on write time, used by storage statistics.
pub const CREATE_KV_UPDATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_kv_store_updated ON kv_store(updated_at DESC)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_KV_TABLE,
    CREATE_METADATA_TABLE,
    CREATE_KV_UPDATED_INDEX,
];
