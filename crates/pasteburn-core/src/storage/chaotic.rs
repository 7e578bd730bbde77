//! Chaotic storage wrapper for fault injection testing
//!
//! Storage wrapper that randomly fails operations to test error handling. A
//! failed operation never reaches the inner store, so an injected failure on
//! `load_and_delete` leaves the document unread rather than half-consumed.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use uuid::Uuid;

use super::{Storage, StorageError};

/// Chaotic storage wrapper that randomly injects failures
///
/// Delegates to an underlying storage implementation but randomly fails
/// operations based on a configured failure rate. Clone shares the RNG and
/// counter.
#[derive(Clone)]
pub struct ChaoticStorage<S: Storage> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    /// Operation counter
    operation_count: Arc<AtomicUsize>,
}

/// Simple deterministic RNG for chaos injection
///
/// Linear congruential generator: fast and reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next random value [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // LCG constants from Numerical Recipes
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }

    fn should_fail(&mut self, failure_rate: f64) -> bool {
        self.next() < failure_rate
    }
}

impl<S: Storage> ChaoticStorage<S> {
    /// Create a new chaotic storage wrapper with a fixed default seed.
    ///
    /// `failure_rate` is clamped to [0.0, 1.0].
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Create with explicit seed for reproducible chaos
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        Self {
            inner,
            failure_rate: failure_rate.clamp(0.0, 1.0),
            rng: Arc::new(Mutex::new(ChaoticRng::new(seed))),
            operation_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying storage (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of storage operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operation_count.load(Ordering::Relaxed)
    }

    /// Count the operation and decide whether to fail it.
    fn inject(&self) -> Result<(), StorageError> {
        self.operation_count.fetch_add(1, Ordering::Relaxed);

        let fail = self
            .rng
            .lock()
            .map_err(|_| StorageError::Io("chaotic rng mutex poisoned".to_string()))?
            .should_fail(self.failure_rate);

        if fail { Err(StorageError::Io("chaotic failure injection".to_string())) } else { Ok(()) }
    }
}

impl<S: Storage> Storage for ChaoticStorage<S> {
    fn save(&self, id: Uuid, contents: &[u8]) -> Result<(), StorageError> {
        self.inject()?;
        self.inner.save(id, contents)
    }

    fn load_and_delete(&self, id: Uuid) -> Result<Vec<u8>, StorageError> {
        self.inject()?;
        self.inner.load_and_delete(id)
    }

    fn save_group(&self, group_id: Uuid, entries: &[(u8, &[u8])]) -> Result<(), StorageError> {
        self.inject()?;
        self.inner.save_group(group_id, entries)
    }

    fn load_and_delete_indexed(&self, group_id: Uuid, index: u8) -> Result<Vec<u8>, StorageError> {
        self.inject()?;
        self.inner.load_and_delete_indexed(group_id, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn zero_failure_rate_never_fails() {
        let storage = ChaoticStorage::new(MemoryStorage::new(), 0.0);

        for i in 0..100u128 {
            storage.save(Uuid::from_u128(i), b"x").unwrap();
        }

        assert_eq!(storage.operation_count(), 100);
        assert_eq!(storage.inner().document_count().unwrap(), 100);
    }

    #[test]
    fn full_failure_rate_always_fails() {
        let storage = ChaoticStorage::new(MemoryStorage::new(), 1.0);

        for i in 0..10u128 {
            assert!(matches!(storage.save(Uuid::from_u128(i), b"x"), Err(StorageError::Io(_))));
        }

        assert_eq!(storage.inner().document_count().unwrap(), 0);
    }

    #[test]
    fn injected_read_failure_leaves_document_unread() {
        let memory = MemoryStorage::new();
        let id = Uuid::from_u128(5);
        memory.save(id, b"ciphertext").unwrap();

        let storage = ChaoticStorage::new(memory, 1.0);
        assert!(storage.load_and_delete(id).is_err());

        assert_eq!(storage.inner().load_and_delete(id).unwrap(), b"ciphertext");
    }

    #[test]
    fn same_seed_same_failures() {
        let run = |seed| {
            let storage = ChaoticStorage::with_seed(MemoryStorage::new(), 0.5, seed);
            (0..50u128).map(|i| storage.save(Uuid::from_u128(i), b"x").is_ok()).collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }
}
