//! Core domain types
//!
//! Pure data: the state snapshot, the actions that transition it, and the
//! error type. No I/O here.

mod action;
pub mod result;
mod state;

pub use action::Action;
pub use state::{dedup_wallets, AppState, AppStateData, Theme, UserData, Wallet, DEFAULT_CURRENCY};
