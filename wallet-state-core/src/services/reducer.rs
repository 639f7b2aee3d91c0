//! State reducer - pure transition function

use std::sync::Arc;

use crate::domain::{dedup_wallets, Action, AppState, UserData};

/// Compute the next snapshot from `state` and `action`.
///
/// Never fails and never mutates `state`. Slices the action does not touch
/// are shared with the previous snapshot. Transitions that change nothing
/// (an unrecognized action, updating or removing a wallet that is not there)
/// return `state` itself.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    match action {
        Action::SetTheme(theme) => state.derive(|s| s.theme = theme),

        Action::SetSelectedCurrency(currency) => state.derive(|s| s.selected_currency = currency),

        Action::LoginUser(user_data) => state.derive(|s| s.user_data = Arc::new(user_data)),

        Action::SetToken(token) => state.derive(|s| s.token = token),

        Action::LogoutUser => state.derive(|s| {
            s.user_data = Arc::new(UserData::default());
            s.token = String::new();
        }),

        Action::SetWallets(wallets) => {
            let wallets = dedup_wallets(wallets);
            state.derive(|s| s.wallets = Arc::new(wallets))
        }

        // Merge: only the balances change, the record keeps its currency
        Action::UpdateWallet(update) => {
            let Some(index) = position(state, &update.currency) else {
                return state.clone();
            };
            let mut wallets = (*state.wallets).clone();
            wallets[index].available_balance = update.available_balance;
            wallets[index].pending_balance = update.pending_balance;
            state.derive(|s| s.wallets = Arc::new(wallets))
        }

        // Replace: an existing record is swapped out whole, in place
        Action::AddWallet(wallet) => {
            let mut wallets = (*state.wallets).clone();
            match position(state, &wallet.currency) {
                Some(index) => wallets[index] = wallet,
                None => wallets.push(wallet),
            }
            state.derive(|s| s.wallets = Arc::new(wallets))
        }

        Action::RemoveWallet(currency) => {
            if position(state, &currency).is_none() {
                return state.clone();
            }
            let wallets: Vec<_> = state
                .wallets
                .iter()
                .filter(|w| w.currency != currency)
                .cloned()
                .collect();
            state.derive(|s| s.wallets = Arc::new(wallets))
        }

        Action::Unrecognized => state.clone(),
    }
}

fn position(state: &AppState, currency: &str) -> Option<usize> {
    state.wallets.iter().position(|w| w.currency == currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Theme, Wallet};

    fn wallet(currency: &str, available: i64, pending: i64) -> Wallet {
        Wallet::new(currency, available as f64, pending as f64)
    }

    fn state_with_wallets(wallets: Vec<Wallet>) -> AppState {
        reduce(&AppState::default(), Action::SetWallets(wallets))
    }

    fn logged_in_state() -> AppState {
        let state = reduce(
            &AppState::default(),
            Action::LoginUser(UserData::new("Ada", "Lovelace", "ada@example.com")),
        );
        reduce(&state, Action::SetToken("secret-token".to_string()))
    }

    #[test]
    fn test_unrecognized_action_is_identity() {
        let state = logged_in_state();
        let next = reduce(&state, Action::Unrecognized);

        assert!(next.ptr_eq(&state));
        assert_eq!(next, state);
    }

    #[test]
    fn test_set_theme_shares_other_slices() {
        let state = state_with_wallets(vec![wallet("USD", 100, 0)]);
        let next = reduce(&state, Action::SetTheme(Theme::Dark));

        assert_eq!(next.theme, Theme::Dark);
        assert_eq!(state.theme, Theme::Light);
        assert!(Arc::ptr_eq(&state.wallets, &next.wallets));
        assert!(Arc::ptr_eq(&state.user_data, &next.user_data));
    }

    #[test]
    fn test_set_selected_currency() {
        let next = reduce(
            &AppState::default(),
            Action::SetSelectedCurrency("EUR".to_string()),
        );
        assert_eq!(next.selected_currency, "EUR");
    }

    #[test]
    fn test_login_replaces_user_data() {
        let state = logged_in_state();
        let next = reduce(&state, Action::LoginUser(UserData::new("Grace", "", "")));

        assert_eq!(*next.user_data, UserData::new("Grace", "", ""));
        assert_eq!(next.token, "secret-token");
    }

    #[test]
    fn test_logout_clears_user_and_token() {
        let state = logged_in_state();
        assert!(state.is_authenticated());

        let next = reduce(&state, Action::LogoutUser);

        assert_eq!(*next.user_data, UserData::new("", "", ""));
        assert_eq!(next.token, "");
        assert!(!next.is_authenticated());

        // Logging out twice is still logged out
        let again = reduce(&next, Action::LogoutUser);
        assert!(again.user_data.is_empty());
        assert_eq!(again.token, "");
    }

    #[test]
    fn test_set_wallets_replaces_list() {
        let state = state_with_wallets(vec![wallet("USD", 1, 0)]);
        let next = reduce(
            &state,
            Action::SetWallets(vec![wallet("BTC", 2, 0), wallet("ETH", 3, 0)]),
        );

        assert_eq!(*next.wallets, vec![wallet("BTC", 2, 0), wallet("ETH", 3, 0)]);
    }

    #[test]
    fn test_set_wallets_drops_duplicate_currencies() {
        let next = state_with_wallets(vec![
            wallet("USD", 1, 0),
            wallet("BTC", 2, 0),
            wallet("USD", 5, 5),
        ]);

        assert_eq!(*next.wallets, vec![wallet("USD", 5, 5), wallet("BTC", 2, 0)]);
    }

    #[test]
    fn test_add_wallet_appends_new_currency() {
        let state = state_with_wallets(vec![wallet("USD", 100, 0)]);
        let next = reduce(&state, Action::AddWallet(wallet("BTC", 1, 0)));

        assert_eq!(*next.wallets, vec![wallet("USD", 100, 0), wallet("BTC", 1, 0)]);
        assert_eq!(state.wallets.len(), 1);
    }

    #[test]
    fn test_add_wallet_replaces_existing_currency() {
        let state = state_with_wallets(vec![wallet("USD", 100, 0)]);
        let next = reduce(&state, Action::AddWallet(wallet("USD", 5, 5)));

        assert_eq!(*next.wallets, vec![wallet("USD", 5, 5)]);
    }

    #[test]
    fn test_add_wallet_replaces_in_place() {
        let state = state_with_wallets(vec![
            wallet("USD", 1, 0),
            wallet("BTC", 2, 0),
            wallet("ETH", 3, 0),
        ]);
        let next = reduce(&state, Action::AddWallet(wallet("BTC", 9, 9)));

        assert_eq!(
            *next.wallets,
            vec![wallet("USD", 1, 0), wallet("BTC", 9, 9), wallet("ETH", 3, 0)]
        );
    }

    #[test]
    fn test_update_wallet_overwrites_balances() {
        let state = state_with_wallets(vec![wallet("USD", 100, 10), wallet("BTC", 1, 0)]);
        let next = reduce(&state, Action::UpdateWallet(wallet("USD", 200, 20)));

        assert_eq!(*next.wallets, vec![wallet("USD", 200, 20), wallet("BTC", 1, 0)]);
        assert_eq!(*state.wallets, vec![wallet("USD", 100, 10), wallet("BTC", 1, 0)]);
    }

    #[test]
    fn test_update_missing_wallet_is_noop() {
        let state = state_with_wallets(vec![wallet("USD", 100, 10)]);
        let next = reduce(&state, Action::UpdateWallet(wallet("BTC", 1, 1)));

        assert!(next.ptr_eq(&state));
        assert_eq!(*next.wallets, vec![wallet("USD", 100, 10)]);
    }

    #[test]
    fn test_remove_wallet() {
        let state = state_with_wallets(vec![wallet("USD", 1, 0), wallet("BTC", 2, 0)]);
        let next = reduce(&state, Action::RemoveWallet("BTC".to_string()));

        assert_eq!(*next.wallets, vec![wallet("USD", 1, 0)]);
    }

    #[test]
    fn test_remove_missing_wallet_is_noop() {
        let state = state_with_wallets(vec![wallet("USD", 1, 0)]);
        let next = reduce(&state, Action::RemoveWallet("BTC".to_string()));

        assert!(next.ptr_eq(&state));
    }

    #[test]
    fn test_currency_match_is_exact() {
        let state = state_with_wallets(vec![wallet("USD", 1, 0)]);
        let next = reduce(&state, Action::AddWallet(wallet("usd", 2, 0)));

        assert_eq!(next.wallets.len(), 2);
    }
}
