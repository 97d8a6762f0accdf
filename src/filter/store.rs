use log::info;
use tokio::sync::watch;

use super::{FilterPatch, FilterState, History, Location};

/// The filter fields a page owns. Fields outside the scope are dropped
/// from both the snapshot and the location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
    /// country, transport, poiType
    Map,
    /// country, role
    Participants,
}

impl FilterScope {
    pub fn restrict(self, state: FilterState) -> FilterState {
        match self {
            FilterScope::Map => state.with_role(None),
            FilterScope::Participants => state.with_transport(None).with_poi_type(None),
        }
    }
}

/// Holds the current [`FilterState`] of a mounted page and keeps the
/// location's query string in sync with it.
pub struct FilterStore {
    scope: FilterScope,
    tx: watch::Sender<FilterState>,
}

impl FilterStore {
    pub fn read(location: &Location, scope: FilterScope) -> FilterState {
        scope.restrict(FilterState::from_query(location.query()))
    }

    /// Reads the state from the current location and rewrites that
    /// location in canonical form.
    pub fn mount(history: &mut History, scope: FilterScope) -> Self {
        let state = Self::read(history.current(), scope);
        let canonical = history.current().with_query(state.to_query());
        history.replace(canonical);
        let (tx, _) = watch::channel(state);
        Self { scope, tx }
    }

    pub fn current(&self) -> FilterState {
        self.tx.borrow().clone()
    }

    /// Merges `patch`, replaces the current history entry with the new
    /// serialization and notifies subscribers when the snapshot changed.
    pub fn update(&self, patch: FilterPatch, history: &mut History) -> FilterState {
        let next = self.scope.restrict(self.current().merge(&patch));
        let location = history.current().with_query(next.to_query());
        if &location != history.current() {
            info!("filters changed: {location}");
            history.replace(location);
        }
        self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            *state = next.clone();
            true
        });
        next
    }

    /// Change notifications. The receiver starts out with the current
    /// snapshot marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.tx.subscribe()
    }
}
