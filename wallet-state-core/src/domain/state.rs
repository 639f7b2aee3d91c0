//! Application state snapshot

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::result::Error;

/// Currency selected when nothing else is known
pub const DEFAULT_CURRENCY: &str = "USD";

/// UI color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(Error::validation(format!("unknown theme '{}'", other))),
        }
    }
}

/// Profile of the logged-in user. All fields are empty when logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl UserData {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// True when every field is unset
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty() && self.last_name.is_empty() && self.email.is_empty()
    }
}

/// Balance record for one currency.
///
/// Balances are plain JSON numbers in storage, so they are held as `f64`:
/// whatever number was saved loads back bit-for-bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    /// Currency code, the wallet's identity within the list
    pub currency: String,
    pub available_balance: f64,
    pub pending_balance: f64,
}

impl Wallet {
    pub fn new(currency: impl Into<String>, available_balance: f64, pending_balance: f64) -> Self {
        Self {
            currency: currency.into(),
            available_balance,
            pending_balance,
        }
    }
}

/// Collapse duplicate currencies: the first position is kept and the last
/// record for that currency wins.
pub fn dedup_wallets(wallets: Vec<Wallet>) -> Vec<Wallet> {
    let mut result: Vec<Wallet> = Vec::with_capacity(wallets.len());
    for wallet in wallets {
        match result.iter_mut().find(|w| w.currency == wallet.currency) {
            Some(existing) => *existing = wallet,
            None => result.push(wallet),
        }
    }
    result
}

/// Field values of one snapshot.
///
/// `user_data` and `wallets` sit behind `Arc` so transitions that leave them
/// alone hand the same allocation to the next snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct AppStateData {
    pub theme: Theme,
    pub selected_currency: String,
    pub user_data: Arc<UserData>,
    /// Auth token for API requests. Never persisted.
    pub token: String,
    pub wallets: Arc<Vec<Wallet>>,
}

impl Default for AppStateData {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            selected_currency: DEFAULT_CURRENCY.to_string(),
            user_data: Arc::new(UserData::default()),
            token: String::new(),
            wallets: Arc::new(Vec::new()),
        }
    }
}

/// Immutable application state snapshot.
///
/// Cloning is cheap and yields a handle to the same snapshot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState(Arc<AppStateData>);

impl Deref for AppState {
    type Target = AppStateData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<AppStateData> for AppState {
    fn from(data: AppStateData) -> Self {
        Self(Arc::new(data))
    }
}

impl AppState {
    /// True if both handles point at the very same snapshot
    pub fn ptr_eq(&self, other: &AppState) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Build the next snapshot from a copy of this one's fields.
    /// Shared slices stay shared unless `f` replaces them.
    pub fn derive(&self, f: impl FnOnce(&mut AppStateData)) -> AppState {
        let mut data = AppStateData::clone(&self.0);
        f(&mut data);
        AppState(Arc::new(data))
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn wallet(&self, currency: &str) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.currency == currency)
    }
}
