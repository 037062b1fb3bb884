//! In-process serialization of verification runs per (loan, document kind).

use std::collections::HashSet;
use std::sync::{Condvar, Mutex};

use crate::models::enums::DocumentKind;

use super::VerificationError;

type Key = (i64, DocumentKind);

/// Set of keys currently being verified. Runs for other keys are not blocked.
#[derive(Default)]
pub struct KeyedLock {
    held: Mutex<HashSet<Key>>,
    released: Condvar,
}

impl KeyedLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other run holds `(loan_id, kind)`, then take it.
    pub fn acquire(&self, loan_id: i64, kind: DocumentKind) -> Result<KeyGuard<'_>, VerificationError> {
        let key = (loan_id, kind);
        let mut held = self.held.lock().map_err(|_| VerificationError::LockPoisoned)?;
        while held.contains(&key) {
            held = self
                .released
                .wait(held)
                .map_err(|_| VerificationError::LockPoisoned)?;
        }
        held.insert(key);
        Ok(KeyGuard { lock: self, key })
    }

    fn release(&self, key: &Key) {
        // Recover the set even after a panic elsewhere so waiters are not stranded.
        let mut held = match self.held.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        held.remove(key);
        self.released.notify_all();
    }

    #[cfg(test)]
    fn is_held(&self, loan_id: i64, kind: DocumentKind) -> bool {
        self.held
            .lock()
            .map(|h| h.contains(&(loan_id, kind)))
            .unwrap_or(false)
    }
}

/// Releases its key on drop.
pub struct KeyGuard<'a> {
    lock: &'a KeyedLock,
    key: Key,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.lock.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn guard_releases_on_drop() {
        let lock = KeyedLock::new();
        {
            let _guard = lock.acquire(7, DocumentKind::Pan).unwrap();
            assert!(lock.is_held(7, DocumentKind::Pan));
        }
        assert!(!lock.is_held(7, DocumentKind::Pan));
    }

    #[test]
    fn different_keys_do_not_block() {
        let lock = KeyedLock::new();
        let _pan = lock.acquire(7, DocumentKind::Pan).unwrap();
        let _aadhaar = lock.acquire(7, DocumentKind::Aadhaar).unwrap();
        let _other_loan = lock.acquire(8, DocumentKind::Pan).unwrap();
        assert!(lock.is_held(8, DocumentKind::Pan));
    }

    #[test]
    fn same_key_runs_one_at_a_time() {
        let lock = Arc::new(KeyedLock::new());
        let active = Arc::new(AtomicUsize::new(0));
        let max_active = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let lock = Arc::clone(&lock);
                let active = Arc::clone(&active);
                let max_active = Arc::clone(&max_active);
                thread::spawn(move || {
                    let _guard = lock.acquire(1, DocumentKind::BankStatement).unwrap();
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_active.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(max_active.load(Ordering::SeqCst), 1);
    }
}
