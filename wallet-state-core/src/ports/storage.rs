//! Storage port - durable key-value abstraction

use crate::domain::result::Result;

/// Local key-value storage
///
/// Implementations (adapters) decide where the values live. Keys and values
/// are plain strings; structured values are serialized by the caller.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Whether values survive the current process.
    ///
    /// The no-op adapter returns `false`; persistence is skipped entirely
    /// against such a storage.
    fn is_durable(&self) -> bool {
        true
    }
}
