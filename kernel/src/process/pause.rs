//! Process pause/unpause control
//!
//! Suspends or resumes every live thread owned by a process, across all
//! cores. The subtle case is self-pause: the calling thread (or any thread
//! currently executing on some core) cannot be suspended out from under its
//! own execution context, so running threads are handled by a deferred
//! second pass that re-walks the process's thread set and raises reschedule
//! interrupts on the affected cores.
//!
//! All scheduling-state and wait-list mutation happens under the
//! critical-section lock; the narrow step of setting cross-core pending
//! flags additionally masks the caller core's local interrupts so it cannot
//! race that core's own interrupt delivery.

use crate::context::KernelContext;
use crate::process::Process;
use crate::scheduler::{self, WaitState};
use crate::smp::IpiFlags;
use crate::sync::InterruptMaskGuard;

/// Suspend every live thread owned by `process`.
///
/// Threads not currently executing are blocked, registered on the process's
/// wait list and requeued immediately. If any target thread is the current
/// thread of its core, a second pass re-walks the process's threads (the
/// registration and requeue operations tolerate the double application) and
/// flags every remote core involved, followed by exactly one cross-core
/// interrupt dispatch.
pub fn pause_process(ctx: &KernelContext, core_id: usize, process: &Process) {
    let _cs = ctx.critical_section().lock(core_id);
    let mut current_threads_found = false;

    for thread in ctx.threads().snapshot() {
        if thread.owner() != process.pid() || thread.is_terminated() {
            continue;
        }
        if ctx.smp().core(thread.core_id()).current_thread() == Some(thread.id()) {
            // Executing right now; defer to the second pass.
            current_threads_found = true;
        } else {
            let previous = thread.set_wait_state(WaitState::Blocked);
            process.register_sync_with_thread(thread.id());
            scheduler::adjust_thread(ctx.smp(), &thread, previous);
        }
    }

    if current_threads_found {
        for thread in ctx.threads().snapshot() {
            if thread.owner() != process.pid() || thread.is_terminated() {
                continue;
            }
            let previous = thread.set_wait_state(WaitState::Blocked);
            process.register_sync_with_thread(thread.id());
            scheduler::adjust_thread(ctx.smp(), &thread, previous);

            let _nested = ctx.critical_section().lock(core_id);
            if thread.core_id() != core_id {
                let caller = ctx.smp().core(core_id);
                let _masked = InterruptMaskGuard::new(caller.irq());
                ctx.smp()
                    .core(thread.core_id())
                    .raise_ipi(IpiFlags::RESCHEDULE);
                caller.raise_ipi(IpiFlags::RESCHEDULE);
            }
        }
        scheduler::trigger_cross_core_interrupt(ctx.smp());
    }

    log::debug!(
        "pause: pid={} parked {} threads",
        process.pid(),
        process.waiters().len()
    );
}

/// Resume every thread parked on `process` by a previous pause.
///
/// The inverse walk: each non-terminated waiter is unregistered, returned to
/// the ready state with its priority class intact, and requeued. No
/// cross-core interrupt is issued; readiness becomes visible when the
/// affected cores next evaluate their run queues.
pub fn unpause_process(ctx: &KernelContext, core_id: usize, process: &Process) {
    let _cs = ctx.critical_section().lock(core_id);

    for tid in process.waiters().snapshot() {
        let thread = match ctx.threads().get(tid) {
            Some(thread) => thread,
            None => continue,
        };
        // Only pause parks threads here, and it never parks terminated
        // ones; skip anything that terminated while parked.
        if thread.owner() != process.pid() || thread.is_terminated() {
            continue;
        }
        process.unregister_sync_with_thread(tid);
        let previous = thread.set_wait_state(WaitState::Ready);
        scheduler::adjust_thread(ctx.smp(), &thread, previous);
    }

    log::debug!("unpause: pid={} resumed", process.pid());
}
