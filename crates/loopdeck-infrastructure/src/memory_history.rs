//! In-memory route history.
//!
//! Backs the route binder for tests and headless embedders. A browser
//! embedder substitutes its own `RouteHistory` over the real location API.

use std::sync::RwLock;

use loopdeck_core::route::{Route, RouteHistory};

/// A navigation history held as an in-process stack.
pub struct InMemoryRouteHistory {
    entries: RwLock<Vec<Route>>,
}

impl InMemoryRouteHistory {
    /// Starts the history at the given route.
    pub fn new(initial: Route) -> Self {
        Self {
            entries: RwLock::new(vec![initial]),
        }
    }

    /// Number of history entries, for asserting push vs. replace behavior.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pops the current entry, returning to the previous route. Returns
    /// the new current route, or `None` when already at the first entry.
    pub fn back(&self) -> Option<Route> {
        let mut entries = self.entries.write().unwrap();
        if entries.len() <= 1 {
            return None;
        }
        entries.pop();
        entries.last().cloned()
    }
}

impl Default for InMemoryRouteHistory {
    fn default() -> Self {
        Self::new(Route::default())
    }
}

impl RouteHistory for InMemoryRouteHistory {
    fn current(&self) -> Route {
        self.entries
            .read()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn push(&self, route: Route) {
        self.entries.write().unwrap().push(route);
    }

    fn replace(&self, route: Route) {
        let mut entries = self.entries.write().unwrap();
        entries.pop();
        entries.push(route);
    }
}
