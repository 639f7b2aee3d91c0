//! Adapter implementations
//!
//! Adapters implement the Storage port with concrete technologies:
//! - Process-local map (tests, hosts that mirror state elsewhere)
//! - No-op storage for hosts without durable storage
//! - A single JSON file on the local filesystem
//! - A DuckDB key-value table

pub mod duckdb;
pub mod file;
pub mod memory;
pub mod noop;

pub use self::duckdb::DuckDbStorage;
pub use file::JsonFileStorage;
pub use memory::MemoryStorage;
pub use noop::NoopStorage;
