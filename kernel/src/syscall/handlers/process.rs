//! Process control syscall handlers

use crate::context::KernelContext;
use crate::process::{self, pause, Handle};
use crate::syscall::{ResultCode, SvcError, SvcResult, RESULT_SUCCESS};

/// Suspend or resume every thread of the process `handle` refers to.
///
/// `handle` may be [`process::CUR_PROCESS_HANDLE`] to target the calling
/// process itself. Returns the fixed success code, or the invalid-handle
/// code when the handle does not resolve to a live process; on that path no
/// lock is taken and no state is mutated.
pub fn sys_pause_unpause_process(
    ctx: &KernelContext,
    core_id: usize,
    handle: Handle,
    pause: bool,
) -> ResultCode {
    match pause_unpause_process(ctx, core_id, handle, pause) {
        Ok(()) => RESULT_SUCCESS,
        Err(err) => {
            log::debug!(
                "sys_pause_unpause_process: handle {:#010x}: {}",
                handle,
                err
            );
            err.to_result_code()
        }
    }
}

fn pause_unpause_process(
    ctx: &KernelContext,
    core_id: usize,
    handle: Handle,
    pause: bool,
) -> SvcResult<()> {
    // One reference for the duration of the call, dropped on every path.
    let target = process::resolve_handle(ctx, core_id, handle).ok_or(SvcError::InvalidHandle)?;
    log::debug!(
        "sys_pause_unpause_process: pid={} pause={}",
        target.pid(),
        pause
    );

    if pause {
        pause::pause_process(ctx, core_id, &target);
    } else {
        pause::unpause_process(ctx, core_id, &target);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Process, CUR_PROCESS_HANDLE};
    use crate::scheduler::thread::{Thread, WaitState};
    use crate::syscall::RESULT_INVALID_HANDLE;
    use alloc::sync::Arc;

    const CALLER_PID: u64 = 1;
    const TARGET_PID: u64 = 2;
    const TARGET_HANDLE: Handle = 0x40;

    fn fixture() -> (KernelContext, Arc<Process>, Arc<Process>) {
        let ctx = KernelContext::new(2);

        let caller = Arc::new(Process::new(CALLER_PID, "caller"));
        let target = Arc::new(Process::new(TARGET_PID, "target"));
        ctx.processes().insert(Arc::clone(&caller));
        ctx.processes().insert(Arc::clone(&target));
        caller.insert_handle(TARGET_HANDLE, TARGET_PID);

        for (id, name, owner, core) in [
            (100, "caller-main", CALLER_PID, 0),
            (1, "t1", TARGET_PID, 0),
            (2, "t2", TARGET_PID, 1),
        ] {
            let thread = Arc::new(Thread::new(id, name, owner, core, 0x11));
            ctx.threads().register(Arc::clone(&thread)).unwrap();
            ctx.smp().core(core).ready_queue().enqueue(id);
        }
        ctx.smp().core(0).set_current_thread(Some(100));

        (ctx, caller, target)
    }

    #[test]
    fn pause_then_unpause_through_a_handle() {
        let (ctx, _caller, target) = fixture();

        assert_eq!(
            sys_pause_unpause_process(&ctx, 0, TARGET_HANDLE, true),
            RESULT_SUCCESS
        );
        assert_eq!(ctx.threads().get(1).unwrap().wait_state(), WaitState::Blocked);
        assert!(target.waiters().contains(1));
        assert!(target.waiters().contains(2));

        assert_eq!(
            sys_pause_unpause_process(&ctx, 0, TARGET_HANDLE, false),
            RESULT_SUCCESS
        );
        assert_eq!(ctx.threads().get(1).unwrap().wait_state(), WaitState::Ready);
        assert!(target.waiters().is_empty());
    }

    // Scenario 4 / P6: an unresolvable handle fails with the fixed code and
    // mutates nothing.
    #[test]
    fn invalid_handle_leaves_state_untouched() {
        let (ctx, caller, target) = fixture();
        let caller_refs = Arc::strong_count(&caller);
        let target_refs = Arc::strong_count(&target);

        assert_eq!(
            sys_pause_unpause_process(&ctx, 0, 0xFFFF_FFFF, true),
            RESULT_INVALID_HANDLE
        );

        assert_eq!(ctx.threads().get(1).unwrap().wait_state(), WaitState::Ready);
        assert_eq!(ctx.threads().get(2).unwrap().wait_state(), WaitState::Ready);
        assert!(target.waiters().is_empty());
        assert_eq!(Arc::strong_count(&caller), caller_refs);
        assert_eq!(Arc::strong_count(&target), target_refs);
        assert_eq!(ctx.critical_section().depth(), 0);
    }

    // Scenario 5 / P7: the pseudo-handle resolves to the calling process
    // and the reference count is unchanged once the call returns.
    #[test]
    fn cur_process_handle_is_reference_neutral() {
        let (ctx, caller, _target) = fixture();
        let before = Arc::strong_count(&caller);

        assert_eq!(
            sys_pause_unpause_process(&ctx, 0, CUR_PROCESS_HANDLE, true),
            RESULT_SUCCESS
        );

        assert_eq!(Arc::strong_count(&caller), before);
        // The caller paused itself: its running thread was deferred but is
        // blocked now.
        assert_eq!(
            ctx.threads().get(100).unwrap().wait_state(),
            WaitState::Blocked
        );
        assert!(caller.waiters().contains(100));
        assert_eq!(ctx.smp().trigger_calls(), 1);
    }

    #[test]
    fn resolved_handles_are_reference_neutral() {
        let (ctx, _caller, target) = fixture();
        let before = Arc::strong_count(&target);

        sys_pause_unpause_process(&ctx, 0, TARGET_HANDLE, true);
        sys_pause_unpause_process(&ctx, 0, TARGET_HANDLE, false);

        assert_eq!(Arc::strong_count(&target), before);
    }

    #[test]
    fn unpause_with_bad_handle_also_fails() {
        let (ctx, _caller, _target) = fixture();

        assert_eq!(
            sys_pause_unpause_process(&ctx, 0, 0xDEAD, false),
            RESULT_INVALID_HANDLE
        );
    }
}
