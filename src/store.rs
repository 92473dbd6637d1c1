use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Entries every freshly started process knows about.
pub const DEFAULT_SEED: &[(&str, &str)] = &[("admin", "Administrator")];

/// Thread-safe in-memory map from user id to display name.
/// Clones share the same map, so one store can be handed to every request worker.
#[derive(Clone, Debug, Default)]
pub struct UserStore(Arc<Mutex<HashMap<String, String>>>);

impl UserStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        UserStore(Arc::new(Mutex::new(HashMap::new())))
    }

    /// Create a store pre-populated with `entries`. Later duplicates win.
    pub fn with_seed<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        UserStore(Arc::new(Mutex::new(map)))
    }

    /// Look up a display name. Returns a clone so the lock is released before the caller uses it.
    pub fn get(&self, id: &str) -> Option<String> {
        self.lock().get(id).cloned()
    }

    /// Insert or overwrite the name for `id`.
    pub fn set(&self, id: impl Into<String>, name: impl Into<String>) {
        self.lock().insert(id.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section is a single HashMap call, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn seeded_store_has_admin() {
        let store = UserStore::with_seed(DEFAULT_SEED.iter().copied());
        assert_eq!(store.get("admin").as_deref(), Some("Administrator"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = UserStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("nobody"), None);
    }

    #[test]
    fn set_overwrites() {
        let store = UserStore::new();
        store.set("guest", "Guest");
        store.set("guest", "Guest User");
        assert_eq!(store.get("guest").as_deref(), Some("Guest User"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn later_seed_duplicates_win() {
        let store = UserStore::with_seed([("a", "first"), ("a", "second")]);
        assert_eq!(store.get("a").as_deref(), Some("second"));
    }

    #[test]
    fn clones_share_the_map() {
        let store = UserStore::new();
        let other = store.clone();
        other.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn concurrent_writers_all_land() {
        let store = UserStore::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for j in 0..50 {
                        store.set(format!("{i}-{j}"), "x");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 400);
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let store = UserStore::new();
        store.set("k", "v");
        let inner = store.0.clone();
        let _ = thread::spawn(move || {
            let _guard = inner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(store.0.is_poisoned());
        assert_eq!(store.get("k").as_deref(), Some("v"));
        store.set("k2", "v2");
        assert_eq!(store.len(), 2);
    }
}
