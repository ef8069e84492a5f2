//! Explicit kernel context
//!
//! One constructed object bundles the state the pause/unpause core touches:
//! the thread registry, the process table, the per-core contexts and the
//! critical-section lock. Operations take `&KernelContext` plus the calling
//! core id instead of consulting ambient globals, so tests can stand up fake
//! topologies.

use crate::process::ProcessTable;
use crate::scheduler::ThreadRegistry;
use crate::smp::Smp;
use crate::sync::RecursiveLock;

/// Shared kernel state for the pause/unpause core.
pub struct KernelContext {
    threads: ThreadRegistry,
    processes: ProcessTable,
    smp: Smp,
    critical_section: RecursiveLock,
}

impl KernelContext {
    /// Build a context with `core_count` idle cores and empty tables.
    pub fn new(core_count: usize) -> Self {
        Self {
            threads: ThreadRegistry::new(),
            processes: ProcessTable::new(),
            smp: Smp::new(core_count),
            critical_section: RecursiveLock::new(),
        }
    }

    /// All live threads in the system.
    pub fn threads(&self) -> &ThreadRegistry {
        &self.threads
    }

    /// All live processes in the system.
    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    /// Per-core contexts.
    pub fn smp(&self) -> &Smp {
        &self.smp
    }

    /// The lock serializing scheduling-state and wait-list mutation.
    pub fn critical_section(&self) -> &RecursiveLock {
        &self.critical_section
    }
}
