//! SMP (Symmetric Multi-Processing) support
//!
//! Per-core execution contexts and cross-core signalling.
//!
//! Each core carries its current thread, its ready run queue, its local
//! interrupt-enable state and a pending inter-processor-interrupt mask that
//! remote cores set and the owning core's interrupt path consumes. The
//! indexed set of cores is built at construction time, so tests can stand up
//! an arbitrary fake topology.

use alloc::vec::Vec;
use bitflags::bitflags;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use spin::RwLock;

use crate::scheduler::run_queue::RunQueue;
use crate::scheduler::thread::ThreadId;
use crate::sync::intr_guard::IrqState;

/// Maximum supported cores
pub const MAX_CORES: usize = 64;

bitflags! {
    /// Pending inter-processor-interrupt mask of a core.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IpiFlags: u8 {
        /// Re-evaluate the run queue immediately
        const RESCHEDULE    = 1 << 0;
        /// Flush stale TLB entries
        const TLB_SHOOTDOWN = 1 << 1;
        /// Stop the core (panic propagation)
        const PANIC         = 1 << 2;
    }
}

/// Per-core execution context.
pub struct CoreContext {
    /// Core ID
    id: usize,

    /// Thread currently executing on this core.
    ///
    /// Only the owning core writes this; other cores read it under the
    /// critical-section lock.
    current_thread: RwLock<Option<ThreadId>>,

    /// Ready run queue of this core
    ready_queue: RunQueue,

    /// Local interrupt-enable state
    irq: IrqState,

    /// Pending IPI mask, set remotely and consumed by this core
    pending_ipis: AtomicU8,

    /// Number of IPIs delivered to this core
    ipis_received: AtomicUsize,

    /// Number of reschedule services run on this core
    reschedules: AtomicUsize,
}

impl CoreContext {
    fn new(id: usize) -> Self {
        Self {
            id,
            current_thread: RwLock::new(None),
            ready_queue: RunQueue::new(),
            irq: IrqState::new(),
            pending_ipis: AtomicU8::new(0),
            ipis_received: AtomicUsize::new(0),
            reschedules: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Thread currently executing on this core.
    pub fn current_thread(&self) -> Option<ThreadId> {
        *self.current_thread.read()
    }

    /// Install (or clear) the current thread.
    pub fn set_current_thread(&self, tid: Option<ThreadId>) {
        *self.current_thread.write() = tid;
    }

    /// Ready run queue of this core.
    pub fn ready_queue(&self) -> &RunQueue {
        &self.ready_queue
    }

    /// Local interrupt-enable state.
    pub fn irq(&self) -> &IrqState {
        &self.irq
    }

    /// Set pending IPI flags on this core.
    ///
    /// Callers mask local interrupts on their own core around this, so the
    /// flag set cannot race that core's in-flight interrupt delivery.
    pub fn raise_ipi(&self, flags: IpiFlags) {
        self.pending_ipis.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    /// Pending IPI flags, without consuming them.
    pub fn pending_ipis(&self) -> IpiFlags {
        IpiFlags::from_bits_truncate(self.pending_ipis.load(Ordering::Acquire))
    }

    /// Consume and clear the pending IPI flags.
    ///
    /// Called from this core's own interrupt path.
    pub fn take_pending_ipis(&self) -> IpiFlags {
        IpiFlags::from_bits_truncate(self.pending_ipis.swap(0, Ordering::AcqRel))
    }

    /// Number of IPIs delivered to this core.
    pub fn ipis_received(&self) -> usize {
        self.ipis_received.load(Ordering::Relaxed)
    }

    /// Number of reschedule services run on this core.
    pub fn reschedules(&self) -> usize {
        self.reschedules.load(Ordering::Relaxed)
    }

    pub(crate) fn count_reschedule(&self) {
        self.reschedules.fetch_add(1, Ordering::Relaxed);
    }
}

/// Indexed set of all cores in the system.
pub struct Smp {
    cores: Vec<CoreContext>,
    /// Number of cross-core-interrupt dispatch calls issued
    trigger_calls: AtomicUsize,
}

impl Smp {
    /// Build a topology of `core_count` cores, all idle with interrupts
    /// enabled.
    pub fn new(core_count: usize) -> Self {
        debug_assert!(core_count > 0 && core_count <= MAX_CORES);
        Self {
            cores: (0..core_count).map(CoreContext::new).collect(),
            trigger_calls: AtomicUsize::new(0),
        }
    }

    /// Number of cores.
    pub fn core_count(&self) -> usize {
        self.cores.len()
    }

    /// Context of core `id`.
    ///
    /// Panics if `id` is out of range; core affinities never are.
    pub fn core(&self, id: usize) -> &CoreContext {
        &self.cores[id]
    }

    /// Context of core `id`, if it exists.
    pub fn get(&self, id: usize) -> Option<&CoreContext> {
        self.cores.get(id)
    }

    /// All core contexts, in id order.
    pub fn cores(&self) -> &[CoreContext] {
        &self.cores
    }

    /// Deliver an IPI to `target`.
    ///
    /// The hosted model counts the delivery and leaves the pending mask for
    /// the target core's interrupt path to consume.
    pub fn send_ipi(&self, target: usize, flags: IpiFlags) {
        log::trace!("smp: IPI {:?} -> core {}", flags, target);
        self.cores[target].ipis_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of cross-core-interrupt dispatch calls issued so far.
    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::Relaxed)
    }

    pub(crate) fn count_trigger_call(&self) {
        self.trigger_calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_flags_accumulate_and_drain() {
        let smp = Smp::new(2);
        let core = smp.core(1);

        core.raise_ipi(IpiFlags::RESCHEDULE);
        core.raise_ipi(IpiFlags::TLB_SHOOTDOWN);
        assert_eq!(
            core.pending_ipis(),
            IpiFlags::RESCHEDULE | IpiFlags::TLB_SHOOTDOWN
        );

        let taken = core.take_pending_ipis();
        assert_eq!(taken, IpiFlags::RESCHEDULE | IpiFlags::TLB_SHOOTDOWN);
        assert!(core.pending_ipis().is_empty());
    }

    #[test]
    fn raising_one_flag_leaves_others_alone() {
        let smp = Smp::new(1);
        let core = smp.core(0);

        core.raise_ipi(IpiFlags::PANIC);
        core.raise_ipi(IpiFlags::RESCHEDULE);
        assert!(core.pending_ipis().contains(IpiFlags::PANIC));
        assert!(core.pending_ipis().contains(IpiFlags::RESCHEDULE));
    }

    #[test]
    fn send_ipi_counts_per_target() {
        let smp = Smp::new(3);

        smp.send_ipi(2, IpiFlags::RESCHEDULE);
        smp.send_ipi(2, IpiFlags::RESCHEDULE);
        assert_eq!(smp.core(2).ipis_received(), 2);
        assert_eq!(smp.core(0).ipis_received(), 0);
    }

    #[test]
    fn current_thread_roundtrip() {
        let smp = Smp::new(1);
        let core = smp.core(0);

        assert_eq!(core.current_thread(), None);
        core.set_current_thread(Some(42));
        assert_eq!(core.current_thread(), Some(42));
    }
}
