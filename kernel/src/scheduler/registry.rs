//! Global thread registry
//!
//! An owned arena of thread records with an explicit, insertion-ordered
//! iteration sequence. Walks operate on a snapshot of the sequence, so they
//! stay stable while other cores register threads concurrently.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use hashbrown::HashMap;
use spin::RwLock;

use super::thread::{Thread, ThreadId};

/// Registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// A thread with this id is already registered
    DuplicateThreadId { thread_id: ThreadId },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DuplicateThreadId { thread_id } => {
                write!(f, "thread {} already registered", thread_id)
            }
        }
    }
}

struct RegistryInner {
    /// Records in registration order
    slots: Vec<Arc<Thread>>,
    /// Thread id to slot index
    index: HashMap<ThreadId, usize>,
}

/// All live threads in the system.
pub struct ThreadRegistry {
    inner: RwLock<RegistryInner>,
}

impl ThreadRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner {
                slots: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }

    /// Add a thread record. The id must be unique.
    pub fn register(&self, thread: Arc<Thread>) -> Result<(), RegistryError> {
        let mut inner = self.inner.write();
        let thread_id = thread.id();
        if inner.index.contains_key(&thread_id) {
            return Err(RegistryError::DuplicateThreadId { thread_id });
        }
        let slot = inner.slots.len();
        inner.slots.push(thread);
        inner.index.insert(thread_id, slot);
        Ok(())
    }

    /// Look up a thread by id.
    pub fn get(&self, tid: ThreadId) -> Option<Arc<Thread>> {
        let inner = self.inner.read();
        let slot = *inner.index.get(&tid)?;
        Some(Arc::clone(&inner.slots[slot]))
    }

    /// Snapshot of all records, in registration order.
    pub fn snapshot(&self) -> Vec<Arc<Thread>> {
        self.inner.read().slots.iter().map(Arc::clone).collect()
    }

    /// Number of registered threads.
    pub fn len(&self) -> usize {
        self.inner.read().slots.len()
    }

    /// Is the registry empty?
    pub fn is_empty(&self) -> bool {
        self.inner.read().slots.is_empty()
    }
}

impl Default for ThreadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_follows_registration_order() {
        let registry = ThreadRegistry::new();

        registry.register(Arc::new(Thread::new(3, "a", 1, 0, 0))).unwrap();
        registry.register(Arc::new(Thread::new(1, "b", 1, 0, 0))).unwrap();
        registry.register(Arc::new(Thread::new(2, "c", 1, 0, 0))).unwrap();

        let ids: Vec<_> = registry.snapshot().iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let registry = ThreadRegistry::new();

        registry.register(Arc::new(Thread::new(1, "a", 1, 0, 0))).unwrap();
        assert_eq!(
            registry.register(Arc::new(Thread::new(1, "b", 1, 0, 0))),
            Err(RegistryError::DuplicateThreadId { thread_id: 1 })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn get_resolves_by_id() {
        let registry = ThreadRegistry::new();

        registry.register(Arc::new(Thread::new(9, "a", 4, 2, 0))).unwrap();
        let thread = registry.get(9).unwrap();
        assert_eq!(thread.owner(), 4);
        assert_eq!(thread.core_id(), 2);
        assert!(registry.get(10).is_none());
    }
}
