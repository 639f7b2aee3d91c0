//! Service layer
//!
//! The reducer and store implement the state machine; persistence mirrors
//! it into storage; logging and migrations support the DuckDB-backed files.

pub mod logging;
pub mod migration;
pub mod persistence;
pub mod reducer;
pub mod store;

pub use logging::{LogEntry, LogEvent, LoggingService, Surface};
pub use migration::{MigrationResult, MigrationService};
pub use persistence::{PersistenceAdapter, StorageKeys, DEFAULT_KEY_PREFIX};
pub use reducer::reduce;
pub use store::{StateObserver, Store, SubscriptionId};
