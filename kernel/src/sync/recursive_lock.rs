//! Reentrant critical-section lock
//!
//! Mutual exclusion visible across all cores, reentrant for the same logical
//! owner. The owner is identified by an explicit token (the core id of the
//! caller), so nested acquisitions from the same core stack instead of
//! deadlocking. Acquire/release balance is enforced by the RAII guard.

use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Owner word value while the lock is free.
const NO_OWNER: usize = usize::MAX;

/// Reentrant spin lock keyed by an owner token.
///
/// The lock carries no data: it serializes mutation of scheduling state and
/// waiter-set membership that lives behind its own interior mutability.
pub struct RecursiveLock {
    owner: AtomicUsize,
    depth: AtomicU32,
}

impl RecursiveLock {
    /// Create a new, unheld lock.
    pub const fn new() -> Self {
        Self {
            owner: AtomicUsize::new(NO_OWNER),
            depth: AtomicU32::new(0),
        }
    }

    /// Acquire the lock for `owner`, spinning until it is available.
    ///
    /// If `owner` already holds the lock the acquisition nests: the depth
    /// counter is incremented and the call returns immediately.
    pub fn lock(&self, owner: usize) -> RecursiveLockGuard<'_> {
        debug_assert_ne!(owner, NO_OWNER);

        if self.owner.load(Ordering::Acquire) == owner {
            // Nested acquisition by the holder; only the holder can reach
            // this branch, so a plain increment is race-free.
            self.depth.fetch_add(1, Ordering::Relaxed);
            return RecursiveLockGuard { lock: self };
        }

        while self
            .owner
            .compare_exchange_weak(NO_OWNER, owner, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            core::hint::spin_loop();
        }
        self.depth.store(1, Ordering::Relaxed);
        RecursiveLockGuard { lock: self }
    }

    /// Attempt to acquire the lock for `owner` without spinning.
    pub fn try_lock(&self, owner: usize) -> Option<RecursiveLockGuard<'_>> {
        debug_assert_ne!(owner, NO_OWNER);

        if self.owner.load(Ordering::Acquire) == owner {
            self.depth.fetch_add(1, Ordering::Relaxed);
            return Some(RecursiveLockGuard { lock: self });
        }

        if self
            .owner
            .compare_exchange(NO_OWNER, owner, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.depth.store(1, Ordering::Relaxed);
            Some(RecursiveLockGuard { lock: self })
        } else {
            None
        }
    }

    /// Check whether `owner` currently holds the lock.
    pub fn is_held_by(&self, owner: usize) -> bool {
        self.owner.load(Ordering::Acquire) == owner
    }

    /// Current nesting depth (0 while the lock is free).
    pub fn depth(&self) -> u32 {
        self.depth.load(Ordering::Relaxed)
    }

    fn release_one(&self) {
        let previous = self.depth.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(previous > 0);
        if previous == 1 {
            self.owner.store(NO_OWNER, Ordering::Release);
        }
    }
}

impl Default for RecursiveLock {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard releasing one level of the lock on drop.
pub struct RecursiveLockGuard<'a> {
    lock: &'a RecursiveLock,
}

impl Drop for RecursiveLockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_one();
    }
}
