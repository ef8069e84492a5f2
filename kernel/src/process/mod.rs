//! Process objects and handle resolution
//!
//! A process doubles as a synchronization object here: its wait list is the
//! bookkeeping set of threads parked by a pause. Processes are owned by the
//! [`ProcessTable`] and shared as `Arc`s; cloning the `Arc` during handle
//! resolution is the reference acquire, dropping it at end of scope is the
//! release, on every exit path.

pub mod pause;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use spin::{Mutex, RwLock};

use crate::context::KernelContext;
use crate::scheduler::thread::ThreadId;
use crate::sync::WaitList;

/// Process ID
pub type Pid = u64;

/// Kernel object handle
pub type Handle = u32;

/// Pseudo-handle denoting the calling process itself.
pub const CUR_PROCESS_HANDLE: Handle = 0xFFFF_8001;

/// Process control block.
pub struct Process {
    /// Process ID
    pid: Pid,

    /// Process name
    name: String,

    /// Per-process handle table, mapping handles to process ids
    handles: Mutex<BTreeMap<Handle, Pid>>,

    /// Synchronization-object facet: threads parked on this process
    waiters: WaitList,
}

impl Process {
    /// Create a new process.
    pub fn new(pid: Pid, name: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            handles: Mutex::new(BTreeMap::new()),
            waiters: WaitList::new(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a thread as waiting on this process.
    ///
    /// Tolerates threads that are already members; returns `true` if the
    /// membership actually changed.
    pub fn register_sync_with_thread(&self, tid: ThreadId) -> bool {
        self.waiters.register(tid)
    }

    /// Unregister a thread from this process's wait list.
    ///
    /// Tolerates threads that are not members; returns `true` if the
    /// membership actually changed.
    pub fn unregister_sync_with_thread(&self, tid: ThreadId) -> bool {
        self.waiters.unregister(tid)
    }

    /// Threads currently parked on this process.
    pub fn waiters(&self) -> &WaitList {
        &self.waiters
    }

    /// Grant this process a handle referring to process `pid`.
    pub fn insert_handle(&self, handle: Handle, pid: Pid) {
        self.handles.lock().insert(handle, pid);
    }

    /// Revoke a handle. Returns the pid it referred to, if any.
    pub fn remove_handle(&self, handle: Handle) -> Option<Pid> {
        self.handles.lock().remove(&handle)
    }

    /// Look up a handle in this process's handle table.
    pub fn lookup_handle(&self, handle: Handle) -> Option<Pid> {
        self.handles.lock().get(&handle).copied()
    }
}

/// Global process table.
pub struct ProcessTable {
    inner: RwLock<BTreeMap<Pid, Arc<Process>>>,
}

impl ProcessTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BTreeMap::new()),
        }
    }

    /// Insert a process, keyed by its pid.
    pub fn insert(&self, process: Arc<Process>) {
        self.inner.write().insert(process.pid(), process);
    }

    /// Look up a live process by pid.
    pub fn get(&self, pid: Pid) -> Option<Arc<Process>> {
        self.inner.read().get(&pid).map(Arc::clone)
    }

    /// Remove a process from the table.
    pub fn remove(&self, pid: Pid) -> Option<Arc<Process>> {
        self.inner.write().remove(&pid)
    }

    /// Number of live processes.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The process owning the calling core's current thread.
pub fn current_process(ctx: &KernelContext, core_id: usize) -> Option<Arc<Process>> {
    let tid = ctx.smp().core(core_id).current_thread()?;
    let thread = ctx.threads().get(tid)?;
    ctx.processes().get(thread.owner())
}

/// Resolve `handle` against the calling core's current process.
///
/// `CUR_PROCESS_HANDLE` resolves to the calling process itself; any other
/// value goes through the calling process's handle table. Either path yields
/// an `Arc` clone the caller holds for the duration of its operation.
pub fn resolve_handle(ctx: &KernelContext, core_id: usize, handle: Handle) -> Option<Arc<Process>> {
    let current = current_process(ctx, core_id)?;
    if handle == CUR_PROCESS_HANDLE {
        return Some(current);
    }
    let pid = current.lookup_handle(handle)?;
    ctx.processes().get(pid)
}
