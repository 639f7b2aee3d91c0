//! No-op storage adapter for hosts without durable storage

use crate::domain::result::Result;
use crate::ports::Storage;

/// Storage that keeps nothing.
///
/// Selected when the host has no durable storage (or persistence is turned
/// off). Reads always miss and writes are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl Storage for NoopStorage {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_keeps_nothing() {
        let storage = NoopStorage;
        storage.set("app_theme", "dark").unwrap();
        assert_eq!(storage.get("app_theme").unwrap(), None);
        assert!(!storage.is_durable());
    }
}
