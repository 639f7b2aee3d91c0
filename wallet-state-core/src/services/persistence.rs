//! Persistence adapter - mirrors snapshots into durable storage
//!
//! Four fields are stored, each under its own key: theme and selected
//! currency as raw strings, user data and wallets as JSON. The auth token is
//! never written and never restored.
//!
//! Persistence is best-effort. Read and parse failures fall back to the
//! field's default; write failures are logged. Neither ever reaches the
//! caller.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::result::{Error, Result};
use crate::domain::{dedup_wallets, AppState, AppStateData, Theme, UserData, Wallet};
use crate::ports::Storage;
use crate::services::logging::{report_event, LogEvent, LoggingService};
use crate::services::store::StateObserver;

/// Key prefix used when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "app_";

/// Storage keys of the persisted fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub theme: String,
    pub selected_currency: String,
    pub user_data: String,
    pub wallets: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            theme: format!("{}theme", prefix),
            selected_currency: format!("{}selectedCurrency", prefix),
            user_data: format!("{}userData", prefix),
            wallets: format!("{}wallets", prefix),
        }
    }

    /// All keys, in the order fields are written
    pub fn all(&self) -> [&str; 4] {
        [
            &self.theme,
            &self.selected_currency,
            &self.user_data,
            &self.wallets,
        ]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Synchronizes state snapshots with a [`Storage`]
pub struct PersistenceAdapter {
    storage: Arc<dyn Storage>,
    keys: StorageKeys,
    logger: Option<Arc<LoggingService>>,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            keys: StorageKeys::default(),
            logger: None,
        }
    }

    /// Store fields under `<prefix><field>` instead of the default `app_` keys
    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.keys = StorageKeys::with_prefix(prefix);
        self
    }

    /// Send failures to the event log instead of stderr
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Restore a snapshot from storage.
    ///
    /// Each field is read on its own; a missing, unreadable or malformed
    /// value yields that field's default. Without durable storage the full
    /// default state is returned untouched.
    pub fn load(&self) -> AppState {
        if !self.storage.is_durable() {
            return AppState::default();
        }

        let defaults = AppStateData::default();

        let theme = self
            .read_field(&self.keys.theme, |raw| Ok(Some(raw.parse::<Theme>()?)))
            .unwrap_or(defaults.theme);

        let selected_currency = self
            .read_field(&self.keys.selected_currency, |raw| {
                Ok((!raw.is_empty()).then(|| raw.to_string()))
            })
            .unwrap_or(defaults.selected_currency);

        let user_data = self
            .read_field(&self.keys.user_data, parse_json::<UserData>)
            .map(Arc::new)
            .unwrap_or(defaults.user_data);

        let wallets = self
            .read_field(&self.keys.wallets, parse_json::<Vec<Wallet>>)
            .map(|wallets| Arc::new(dedup_wallets(wallets)))
            .unwrap_or(defaults.wallets);

        AppState::from(AppStateData {
            theme,
            selected_currency,
            user_data,
            token: defaults.token,
            wallets,
        })
    }

    /// Write the persisted fields of `state`. Failures are logged, never
    /// returned.
    pub fn save(&self, state: &AppState) {
        self.save_after(state, None);
    }

    /// Same as [`save`](Self::save), tagging a failure with the kind of the
    /// action that produced `state`
    pub fn save_after(&self, state: &AppState, action_kind: Option<&str>) {
        if !self.storage.is_durable() {
            return;
        }
        if let Err(e) = self.try_save(state) {
            let mut event = LogEvent::new("persist_save_failed").with_error(e.to_string());
            if let Some(kind) = action_kind {
                event = event.with_action(kind);
            }
            self.report(event);
        }
    }

    /// Write the persisted fields of `state`, stopping at the first failure
    pub fn try_save(&self, state: &AppState) -> Result<()> {
        self.storage.set(&self.keys.theme, state.theme.as_str())?;
        self.storage
            .set(&self.keys.selected_currency, &state.selected_currency)?;
        self.storage
            .set(&self.keys.user_data, &serde_json::to_string(&*state.user_data)?)?;
        self.storage
            .set(&self.keys.wallets, &serde_json::to_string(&*state.wallets)?)?;
        Ok(())
    }

    /// Remove every persisted field from storage
    pub fn clear(&self) {
        for key in self.keys.all() {
            if let Err(e) = self.storage.remove(key) {
                self.report(failure("persist_clear_failed", key, e));
            }
        }
    }

    /// Read one field. `None` means "use the default": absent key, a value
    /// the parser maps to nothing, or any read/parse error (logged).
    fn read_field<T>(
        &self,
        key: &str,
        parse: impl FnOnce(&str) -> Result<Option<T>>,
    ) -> Option<T> {
        let parsed = match self.storage.get(key) {
            Ok(Some(raw)) => parse(&raw),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(value) => value,
            Err(e) => {
                self.report(failure("persist_load_fallback", key, e));
                None
            }
        }
    }

    fn report(&self, event: LogEvent) {
        report_event(self.logger.as_deref(), event);
    }
}

fn failure(event: &str, key: &str, error: Error) -> LogEvent {
    LogEvent::new(event)
        .with_storage_key(key)
        .with_error(error.to_string())
}

/// JSON values where `null` means "not set"
fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<Option<T>> {
    Ok(serde_json::from_str::<Option<T>>(raw)?)
}

impl StateObserver for PersistenceAdapter {
    fn on_state_change(&self, state: &AppState, action_kind: &str) {
        self.save_after(state, Some(action_kind));
    }
}
