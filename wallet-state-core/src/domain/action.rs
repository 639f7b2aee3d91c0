//! State transition requests

use serde::{Deserialize, Serialize};

use super::result::Result;
use super::state::{Theme, UserData, Wallet};

/// A request to transition the application state.
///
/// On the wire an action is `{"type": "...", "payload": ...}`. Tags that do
/// not name a known action decode to [`Action::Unrecognized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    SetTheme(Theme),
    SetSelectedCurrency(String),
    LoginUser(UserData),
    SetToken(String),
    LogoutUser,
    SetWallets(Vec<Wallet>),
    /// Overwrites the balances of the wallet with the same currency
    UpdateWallet(Wallet),
    /// Replaces the wallet with the same currency, or appends
    AddWallet(Wallet),
    /// Currency code of the wallet to drop
    RemoveWallet(String),
    #[serde(other)]
    Unrecognized,
}

impl Action {
    /// Decode an action from its JSON wire form
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Wire tag of this action. Safe to log: carries no payload data.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::SetTheme(_) => "SET_THEME",
            Action::SetSelectedCurrency(_) => "SET_SELECTED_CURRENCY",
            Action::LoginUser(_) => "LOGIN_USER",
            Action::SetToken(_) => "SET_TOKEN",
            Action::LogoutUser => "LOGOUT_USER",
            Action::SetWallets(_) => "SET_WALLETS",
            Action::UpdateWallet(_) => "UPDATE_WALLET",
            Action::AddWallet(_) => "ADD_WALLET",
            Action::RemoveWallet(_) => "REMOVE_WALLET",
            Action::Unrecognized => "UNRECOGNIZED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_set_theme() {
        let action = Action::from_json(r#"{"type":"SET_THEME","payload":"dark"}"#).unwrap();
        assert_eq!(action, Action::SetTheme(Theme::Dark));
    }

    #[test]
    fn test_decode_logout_without_payload() {
        let action = Action::from_json(r#"{"type":"LOGOUT_USER"}"#).unwrap();
        assert_eq!(action, Action::LogoutUser);
    }

    #[test]
    fn test_decode_login_user() {
        let action = Action::from_json(
            r#"{"type":"LOGIN_USER","payload":{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com"}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::LoginUser(UserData::new("Ada", "Lovelace", "ada@example.com"))
        );
    }

    #[test]
    fn test_decode_add_wallet() {
        let action = Action::from_json(
            r#"{"type":"ADD_WALLET","payload":{"currency":"BTC","availableBalance":1.5,"pendingBalance":0}}"#,
        )
        .unwrap();
        assert_eq!(
            action,
            Action::AddWallet(Wallet::new("BTC", 1.5, 0.0))
        );
    }

    #[test]
    fn test_decode_unknown_type() {
        let action = Action::from_json(r#"{"type":"RESET_EVERYTHING"}"#).unwrap();
        assert_eq!(action, Action::Unrecognized);
    }

    #[test]
    fn test_decode_wrong_payload_is_error() {
        assert!(Action::from_json(r#"{"type":"SET_THEME","payload":"blue"}"#).is_err());
        assert!(Action::from_json("not json").is_err());
    }

    #[test]
    fn test_kind_matches_wire_tag() {
        let action = Action::RemoveWallet("USD".to_string());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], action.kind());
        assert_eq!(json["payload"], "USD");
    }
}
