//! Wallet State Core - reducer-based application state with local persistence
//!
//! This crate follows hexagonal architecture:
//!
//! - **domain**: State snapshot, actions, errors
//! - **ports**: Trait definitions for external dependencies (Storage)
//! - **services**: Reducer, store, persistence, logging
//! - **adapters**: Concrete storage (memory, no-op, JSON file, DuckDB)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::{DuckDbStorage, JsonFileStorage, MemoryStorage, NoopStorage};
use config::{Config, StorageBackend};
use ports::Storage;
use services::logging::report_event;
use services::{LogEvent, PersistenceAdapter};

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{Action, AppState, AppStateData, Theme, UserData, Wallet};
pub use services::{reduce, LoggingService, StateObserver, Store, SubscriptionId, Surface};

/// Application state context
///
/// Built once at process start and passed by reference to whatever needs
/// the state. Holds the configuration, the selected storage, the event log
/// and the store itself.
pub struct StateContext {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub logger: Option<Arc<LoggingService>>,
    pub store: Store,
}

impl StateContext {
    /// Create a context rooted at `state_dir`
    ///
    /// The storage backend comes from the config. With the `none` backend
    /// the store starts from defaults and nothing is written.
    pub fn new(state_dir: &Path, surface: Surface) -> Result<Self> {
        std::fs::create_dir_all(state_dir)
            .with_context(|| format!("Failed to create state directory: {:?}", state_dir))?;

        let config = Config::load(state_dir)?;
        let storage = open_storage(state_dir, config.backend)?;

        // Logging should never block startup
        let logger = if config.logging_enabled {
            LoggingService::new(state_dir, surface, env!("CARGO_PKG_VERSION"))
                .ok()
                .map(Arc::new)
        } else {
            None
        };

        let mut adapter =
            PersistenceAdapter::new(Arc::clone(&storage)).with_key_prefix(&config.key_prefix);
        if let Some(logger) = &logger {
            adapter = adapter.with_logger(Arc::clone(logger));
            report_event(Some(&**logger), LogEvent::new("store_initialized"));
        }

        Ok(Self {
            config,
            storage,
            logger,
            store: Store::with_persistence(adapter),
        })
    }

    /// Context rooted at [`config::default_state_dir`]
    pub fn open_default(surface: Surface) -> Result<Self> {
        Self::new(&config::default_state_dir(), surface)
    }

    /// Context without durable storage or logging
    pub fn ephemeral() -> Self {
        Self {
            config: Config {
                backend: StorageBackend::Disabled,
                logging_enabled: false,
                ..Config::default()
            },
            storage: Arc::new(NoopStorage),
            logger: None,
            store: Store::new(AppState::default()),
        }
    }

    /// Remove the persisted fields from storage. The in-memory state is kept.
    pub fn clear_persisted_data(&self) {
        let mut adapter = PersistenceAdapter::new(Arc::clone(&self.storage))
            .with_key_prefix(&self.config.key_prefix);
        if let Some(logger) = &self.logger {
            adapter = adapter.with_logger(Arc::clone(logger));
        }
        adapter.clear();
    }
}

/// Open the storage for `backend` inside `state_dir`
pub fn open_storage(state_dir: &Path, backend: StorageBackend) -> Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match backend {
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::File => Arc::new(JsonFileStorage::new(&state_dir.join("state.json"))?),
        StorageBackend::DuckDb => Arc::new(
            DuckDbStorage::open(&state_dir.join("state.duckdb"))
                .context("Failed to open storage database")?,
        ),
        StorageBackend::Disabled => Arc::new(NoopStorage),
    };
    Ok(storage)
}
