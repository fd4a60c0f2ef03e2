//! Per-derivative-path mutual exclusion.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// In-memory table of one lock per derivative path.
///
/// Entries are dropped again once nobody holds or waits on them.
#[derive(Default)]
pub(crate) struct KeyLocks {
    entries: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, holding it until the guard is dropped
    pub(crate) fn acquire(&self, key: &Path) -> KeyGuard<'_> {
        let lock = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries
                .entry(key.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        KeyGuard {
            owner: self,
            key: key.to_path_buf(),
            lock: Some(lock),
        }
    }

    fn release(&self, key: &Path, lock: Arc<Mutex<()>>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if entries.get(key).is_some_and(|l| Arc::strong_count(l) == 1) {
            entries.remove(key);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Held lock on one key
pub(crate) struct KeyGuard<'a> {
    owner: &'a KeyLocks,
    key: PathBuf,
    lock: Option<Arc<Mutex<()>>>,
}

impl KeyGuard<'_> {
    /// Run `f` while holding the key
    pub(crate) fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.lock {
            Some(lock) => {
                let _held: MutexGuard<'_, ()> = lock.lock().unwrap_or_else(PoisonError::into_inner);
                f()
            }
            None => f(),
        }
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        if let Some(lock) = self.lock.take() {
            self.owner.release(&self.key, lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn one_holder_at_a_time() {
        let locks = Arc::new(KeyLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let (locks, inside, max_inside) =
                    (Arc::clone(&locks), Arc::clone(&inside), Arc::clone(&max_inside));
                thread::spawn(move || {
                    let guard = locks.acquire(Path::new("/cache/a/b/c/key.jpg"));
                    guard.run(|| {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 0);
    }

    #[test]
    fn different_keys_do_not_share_a_lock() {
        let locks = KeyLocks::new();
        let a = locks.acquire(Path::new("/a"));
        let b = locks.acquire(Path::new("/b"));
        a.run(|| b.run(|| ()));
        assert_eq!(locks.len(), 2);
        drop(a);
        drop(b);
        assert_eq!(locks.len(), 0);
    }
}
