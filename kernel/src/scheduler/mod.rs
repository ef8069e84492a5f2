//! Scheduler subsystem
//!
//! Thread records, the global registry, per-core ready queues, and the
//! requeue / cross-core-signalling operations the pause controller drives.

pub mod registry;
pub mod run_queue;
pub mod thread;

// Re-exports
pub use registry::{RegistryError, ThreadRegistry};
pub use run_queue::RunQueue;
pub use thread::{SchedulingState, Thread, ThreadId, WaitState};

use crate::smp::{CoreContext, IpiFlags, Smp};

/// Reconcile a thread's run-queue membership with its scheduling state.
///
/// `previous` is the state before the caller's transition. The operation is
/// idempotent: a redundant call with no state change leaves the queue as it
/// is, and re-applying the same transition never duplicates an entry.
pub fn adjust_thread(smp: &Smp, thread: &Thread, previous: SchedulingState) {
    let current = thread.scheduling_state();
    let queue = smp.core(thread.core_id()).ready_queue();

    match current.wait_state {
        WaitState::Ready => {
            if queue.enqueue(thread.id()) {
                log::trace!(
                    "sched: t{} ({} -> {}) queued on core {}",
                    thread.id(),
                    previous,
                    current,
                    thread.core_id()
                );
            }
        }
        WaitState::Blocked | WaitState::Terminated => {
            if queue.remove(thread.id()) {
                log::trace!(
                    "sched: t{} ({} -> {}) dequeued from core {}",
                    thread.id(),
                    previous,
                    current,
                    thread.core_id()
                );
            }
        }
    }
}

/// Dispatch the cross-core interrupt to every core with a pending
/// `RESCHEDULE` flag.
///
/// One dispatch call covers all flagged cores; the per-core pending mask
/// stays set until that core's interrupt path consumes it.
pub fn trigger_cross_core_interrupt(smp: &Smp) {
    smp.count_trigger_call();
    for core in smp.cores() {
        if core.pending_ipis().contains(IpiFlags::RESCHEDULE) {
            smp.send_ipi(core.id(), IpiFlags::RESCHEDULE);
        }
    }
}

/// Reschedule-interrupt path of a single core.
///
/// Consumes the core's pending IPI mask and re-evaluates its run queue,
/// installing the queue front as the current thread. Returns the installed
/// thread, or `None` when the core goes idle.
pub fn service_reschedule(core: &CoreContext) -> Option<ThreadId> {
    let pending = core.take_pending_ipis();
    core.count_reschedule();

    let next = core.ready_queue().front();
    core.set_current_thread(next);
    log::trace!(
        "sched: core {} rescheduled (pending {:?}) -> {:?}",
        core.id(),
        pending,
        next
    );
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_blocks_and_readies() {
        let smp = Smp::new(2);
        let thread = Thread::new(1, "t", 1, 1, 0x20);

        // Ready threads are queued on their own core.
        adjust_thread(&smp, &thread, thread.scheduling_state());
        assert!(smp.core(1).ready_queue().contains(1));
        assert!(smp.core(0).ready_queue().is_empty());

        let previous = thread.set_wait_state(WaitState::Blocked);
        adjust_thread(&smp, &thread, previous);
        assert!(!smp.core(1).ready_queue().contains(1));
    }

    #[test]
    fn adjust_is_idempotent() {
        let smp = Smp::new(1);
        let thread = Thread::new(1, "t", 1, 0, 0);

        let state = thread.scheduling_state();
        adjust_thread(&smp, &thread, state);
        adjust_thread(&smp, &thread, state);
        assert_eq!(smp.core(0).ready_queue().len(), 1);

        let previous = thread.set_wait_state(WaitState::Blocked);
        adjust_thread(&smp, &thread, previous);
        adjust_thread(&smp, &thread, thread.scheduling_state());
        assert!(smp.core(0).ready_queue().is_empty());
    }

    #[test]
    fn trigger_dispatches_only_to_flagged_cores() {
        let smp = Smp::new(3);

        smp.core(0).raise_ipi(IpiFlags::RESCHEDULE);
        smp.core(2).raise_ipi(IpiFlags::RESCHEDULE);
        trigger_cross_core_interrupt(&smp);

        assert_eq!(smp.trigger_calls(), 1);
        assert_eq!(smp.core(0).ipis_received(), 1);
        assert_eq!(smp.core(1).ipis_received(), 0);
        assert_eq!(smp.core(2).ipis_received(), 1);
        // Delivery does not clear the pending mask; the core's own
        // interrupt path does.
        assert!(smp.core(0).pending_ipis().contains(IpiFlags::RESCHEDULE));
    }

    #[test]
    fn service_consumes_mask_and_picks_queue_front() {
        let smp = Smp::new(1);
        let core = smp.core(0);

        core.ready_queue().enqueue(7);
        core.ready_queue().enqueue(8);
        core.raise_ipi(IpiFlags::RESCHEDULE);

        assert_eq!(service_reschedule(core), Some(7));
        assert_eq!(core.current_thread(), Some(7));
        assert!(core.pending_ipis().is_empty());
        assert_eq!(core.reschedules(), 1);
    }

    #[test]
    fn service_idles_an_empty_core() {
        let smp = Smp::new(1);
        let core = smp.core(0);

        core.set_current_thread(Some(3));
        assert_eq!(service_reschedule(core), None);
        assert_eq!(core.current_thread(), None);
    }
}
