//! Snake best score
//!
//! Persisted as a base-10 integer string under a single storage key.

use crate::consts::HIGH_SCORE_KEY;
use crate::platform::KeyValueStore;

/// Best score with an explicit load-on-init / save-on-change contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HighScore {
    best: u32,
}

impl HighScore {
    pub fn new(best: u32) -> Self {
        Self { best }
    }

    /// Read the stored best, defaulting to 0 when absent or unparsable
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let best = store
            .get(HIGH_SCORE_KEY)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .unwrap_or(0);
        if best > 0 {
            log::info!("Loaded snake best score {}", best);
        }
        Self { best }
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Raise the best if `score` beats it, persisting the new value.
    /// Returns true when a new best was set.
    pub fn record(&mut self, score: u32, store: &mut dyn KeyValueStore) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        if let Err(e) = store.set(HIGH_SCORE_KEY, &score.to_string()) {
            log::warn!("Could not save best score {}: {}", score, e);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{MemoryStore, StorageError};

    #[test]
    fn test_load_defaults_to_zero() {
        let store = MemoryStore::new();
        assert_eq!(HighScore::load(&store).best(), 0);
    }

    #[test]
    fn test_load_unparsable_is_zero() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        assert_eq!(HighScore::load(&store).best(), 0);
        store.set(HIGH_SCORE_KEY, "-20").unwrap();
        assert_eq!(HighScore::load(&store).best(), 0);
    }

    #[test]
    fn test_record_persists_only_improvements() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "50").unwrap();
        let mut best = HighScore::load(&store);
        assert_eq!(best.best(), 50);

        assert!(!best.record(40, &mut store));
        assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("50"));

        assert!(best.record(60, &mut store));
        assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("60"));
        assert_eq!(HighScore::load(&store).best(), 60);
    }

    struct ReadOnly;

    impl KeyValueStore for ReadOnly {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_record_survives_write_failure() {
        let mut best = HighScore::default();
        assert!(best.record(10, &mut ReadOnly));
        assert_eq!(best.best(), 10);
    }
}
