// Live directory of named stores.
//
// Readers load an immutable snapshot of the whole map; a reconfiguration builds
// a new map and swaps it in. A request holding a store from an older snapshot
// keeps it alive until its call completes.

use crate::modules::eventstores::registry::StoreMap;
use crate::shared::infrastructure::event_store::SharedEventStore;
use arc_swap::ArcSwap;
use std::sync::Arc;

pub struct LiveStores {
    snapshot: ArcSwap<StoreMap>,
}

impl Default for LiveStores {
    fn default() -> Self {
        Self::new(StoreMap::new())
    }
}

impl LiveStores {
    pub fn new(stores: StoreMap) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(stores),
        }
    }

    pub fn get(&self, name: &str) -> Option<SharedEventStore> {
        self.snapshot.load().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.snapshot.load().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.snapshot.load().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn snapshot(&self) -> Arc<StoreMap> {
        self.snapshot.load_full()
    }

    /// Swaps the store serving `name`. Unknown names are left alone and
    /// `false` is returned; entries are never added here.
    pub fn replace(&self, name: &str, store: SharedEventStore) -> bool {
        if !self.contains(name) {
            return false;
        }
        self.snapshot.rcu(|current| {
            let mut next = StoreMap::clone(current);
            next.insert(name.to_string(), store.clone());
            next
        });
        true
    }
}
