//! DuckDB storage implementation
//!
//! Keeps the key-value slots in a `sys_kv_store` table of a local DuckDB
//! file, schema managed by the embedded storage migrations.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duckdb::{params, Connection};

use crate::domain::result::{self, Error};
use crate::migrations::MIGRATIONS;
use crate::ports::Storage;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// DuckDB-backed key-value storage
pub struct DuckDbStorage {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStorage {
    /// Open (or create) the storage database at `db_path` and bring its
    /// schema up to date.
    ///
    /// Opening is retried with exponential backoff while another process
    /// holds the file.
    pub fn open(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    let storage = Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    };
                    storage.ensure_schema()?;
                    return Ok(storage);
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[wallet-state] Storage database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Storage in a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let storage = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            db_path: None,
        };
        storage.ensure_schema()?;
        Ok(storage)
    }

    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Run pending storage migrations
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.conn.lock().map_err(|e| anyhow!("Lock poisoned: {}", e))?;
        MigrationService::new(&conn, MIGRATIONS).run_pending()
    }

    fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    /// Path of the database file, `None` for in-memory storage
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn lock(&self) -> result::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl Storage for DuckDbStorage {
    fn get(&self, key: &str) -> result::Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT slot_value FROM sys_kv_store WHERE slot_key = ?")?;
        let mut rows = stmt.query_map([key], |row| row.get::<_, String>(0))?;

        let value = match rows.next() {
            Some(value) => Some(value?),
            None => None,
        };
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> result::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO sys_kv_store (slot_key, slot_value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT (slot_key) DO UPDATE
             SET slot_value = excluded.slot_value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> result::Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM sys_kv_store WHERE slot_key = ?", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_set_get_remove() {
        let storage = DuckDbStorage::open_in_memory().unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), None);

        storage.set("app_theme", "dark").unwrap();
        storage.set("app_theme", "light").unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), Some("light".to_string()));

        storage.remove("app_theme").unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), None);
        assert!(storage.db_path().is_none());
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.duckdb");

        {
            let storage = DuckDbStorage::open(&db_path).unwrap();
            storage.set("app_wallets", "[]").unwrap();
        }

        let storage = DuckDbStorage::open(&db_path).unwrap();
        assert_eq!(storage.get("app_wallets").unwrap(), Some("[]".to_string()));

        // Schema was created by the first open only
        let result = storage.run_migrations().unwrap();
        assert!(result.applied.is_empty());
        assert_eq!(result.already_applied, MIGRATIONS.len());
    }

    #[test]
    fn test_retryable_error_detection() {
        assert!(is_retryable_error("IO Error: database is locked"));
        assert!(is_retryable_error(
            "The process cannot access the file because it is being used by another process"
        ));
        assert!(!is_retryable_error("Catalog Error: Table does not exist"));
    }
}
