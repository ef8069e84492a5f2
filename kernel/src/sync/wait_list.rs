//! Waiter bookkeeping for synchronization objects
//!
//! An unordered membership list of threads parked on a waitable object.
//! Register and unregister are idempotent: callers may apply the same
//! transition twice without creating duplicate entries.

use alloc::vec::Vec;
use spin::Mutex;

use crate::scheduler::thread::ThreadId;

/// The set of threads registered as waiting on an object.
pub struct WaitList {
    waiting: Mutex<Vec<ThreadId>>,
}

impl WaitList {
    /// Create an empty wait list.
    pub const fn new() -> Self {
        Self {
            waiting: Mutex::new(Vec::new()),
        }
    }

    /// Add a thread to the list. Returns `false` if it was already a member.
    pub fn register(&self, tid: ThreadId) -> bool {
        let mut waiting = self.waiting.lock();
        if waiting.contains(&tid) {
            return false;
        }
        waiting.push(tid);
        true
    }

    /// Remove a thread from the list. Returns `false` if it was not a member.
    pub fn unregister(&self, tid: ThreadId) -> bool {
        let mut waiting = self.waiting.lock();
        if let Some(pos) = waiting.iter().position(|&x| x == tid) {
            waiting.remove(pos);
            true
        } else {
            false
        }
    }

    /// Is the thread currently a member?
    pub fn contains(&self, tid: ThreadId) -> bool {
        self.waiting.lock().contains(&tid)
    }

    /// Number of registered waiters.
    pub fn len(&self) -> usize {
        self.waiting.lock().len()
    }

    /// Is the list empty?
    pub fn is_empty(&self) -> bool {
        self.waiting.lock().is_empty()
    }

    /// Copy of the membership, in registration order.
    ///
    /// Walking the snapshot stays stable while members are unregistered.
    pub fn snapshot(&self) -> Vec<ThreadId> {
        self.waiting.lock().clone()
    }
}

impl Default for WaitList {
    fn default() -> Self {
        Self::new()
    }
}
