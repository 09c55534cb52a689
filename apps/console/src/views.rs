use gloo_storage::{LocalStorage, Storage};

/// Per-browser key/value persistence for the view counter.
pub trait CounterStore {
    fn read(&self, key: &str) -> Option<u64>;
    fn write(&self, key: &str, value: u64);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl CounterStore for BrowserStorage {
    fn read(&self, key: &str) -> Option<u64> {
        LocalStorage::get::<u64>(key).ok()
    }

    fn write(&self, key: &str, value: u64) {
        if let Err(err) = LocalStorage::set(key, value) {
            tracing::warn!(%err, key, "failed to persist view counter");
        }
    }
}

/// Counts full render cycles across page loads.
pub struct ViewCounter<K> {
    store: K,
    key: String,
}

impl<K: CounterStore> ViewCounter<K> {
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn current(&self) -> u64 {
        self.store.read(&self.key).unwrap_or(0)
    }

    pub fn increment(&self) -> u64 {
        let next = self.current().saturating_add(1);
        self.store.write(&self.key, next);
        next
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    pub(crate) struct MemoryStore(RefCell<HashMap<String, u64>>);

    impl CounterStore for MemoryStore {
        fn read(&self, key: &str) -> Option<u64> {
            self.0.borrow().get(key).copied()
        }

        fn write(&self, key: &str, value: u64) {
            self.0.borrow_mut().insert(key.to_string(), value);
        }
    }

    #[test]
    fn starts_at_zero_and_persists() {
        let counter = ViewCounter::new(MemoryStore::default(), "views");
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.store.read("views"), Some(2));
    }
}
