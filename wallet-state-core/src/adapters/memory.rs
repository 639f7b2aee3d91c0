//! In-memory storage adapter

use std::collections::HashMap;
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::ports::Storage;

/// Storage backed by a process-local map.
///
/// Values outlive any single store but not the process. Useful for tests and
/// for hosts that mirror state elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("app_theme").unwrap(), None);

        storage.set("app_theme", "dark").unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), Some("dark".to_string()));

        storage.set("app_theme", "light").unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), Some("light".to_string()));
        assert_eq!(storage.len(), 1);

        storage.remove("app_theme").unwrap();
        storage.remove("app_theme").unwrap();
        assert!(storage.is_empty());
        assert!(storage.is_durable());
    }
}
