//! Store - holds the current snapshot and runs the reducer loop

use crate::domain::result::Result;
use crate::domain::{Action, AppState};
use crate::services::persistence::PersistenceAdapter;
use crate::services::reducer::reduce;

/// Handle returned by [`Store::subscribe`]
pub type SubscriptionId = u64;

/// Receives every new snapshot the store produces
pub trait StateObserver {
    /// `action_kind` is the wire tag of the action that produced `state`
    fn on_state_change(&self, state: &AppState, action_kind: &str);
}

impl<F: Fn(&AppState)> StateObserver for F {
    fn on_state_change(&self, state: &AppState, _action_kind: &str) {
        self(state)
    }
}

/// Owns the application state.
///
/// Construct once at startup and hand out by reference. `dispatch` is the
/// only way the state changes.
pub struct Store {
    state: AppState,
    observers: Vec<(SubscriptionId, Box<dyn StateObserver>)>,
    next_id: SubscriptionId,
}

impl Store {
    pub fn new(initial_state: AppState) -> Self {
        Self {
            state: initial_state,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    /// Store whose initial state comes from `adapter.load()` and whose every
    /// snapshot, starting with the initial one, is saved back.
    pub fn with_persistence(adapter: PersistenceAdapter) -> Self {
        let mut store = Self::new(adapter.load());
        adapter.save(&store.state);
        store.subscribe(adapter);
        store
    }

    /// Get the current snapshot (cheap handle clone)
    pub fn get_state(&self) -> AppState {
        self.state.clone()
    }

    /// Borrow the current snapshot
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Apply `action` and notify observers of the new snapshot.
    ///
    /// Observers are not called when the reducer hands back the current
    /// snapshot unchanged.
    pub fn dispatch(&mut self, action: Action) {
        let kind = action.kind();
        let next = reduce(&self.state, action);
        if next.ptr_eq(&self.state) {
            return;
        }
        self.state = next;

        for (_, observer) in &self.observers {
            observer.on_state_change(&self.state, kind);
        }
    }

    /// Decode a JSON action (`{"type": ..., "payload": ...}`) and dispatch it
    pub fn dispatch_json(&mut self, json: &str) -> Result<()> {
        let action = Action::from_json(json)?;
        self.dispatch(action);
        Ok(())
    }

    /// Register an observer, called synchronously after each transition
    pub fn subscribe(&mut self, observer: impl StateObserver + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer. Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}
