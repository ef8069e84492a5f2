//! Thread records and scheduling state
//!
//! The scheduling state is a structured value instead of a packed byte: the
//! wait sub-state and the opaque priority class are separate fields, so a
//! wait transition can never clobber bits it does not own.

use alloc::boxed::Box;
use core::fmt;
use spin::Mutex;

use crate::process::Pid;

/// Thread ID type
pub type ThreadId = u64;

/// Wait sub-state of a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Schedulable: running on its core or sitting in a ready queue
    Ready,
    /// Parked on a synchronization object
    Blocked,
    /// Exited; never touched by pause/unpause
    Terminated,
}

impl WaitState {
    /// Check if state is schedulable
    pub fn is_schedulable(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for WaitState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Ready => write!(f, "Ready"),
            Self::Blocked => write!(f, "Blocked"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Composite scheduling state: wait sub-state plus priority/suspend class.
///
/// `priority_class` is opaque to this subsystem and preserved verbatim
/// across every pause/unpause transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulingState {
    pub wait_state: WaitState,
    pub priority_class: u8,
}

impl SchedulingState {
    pub const fn new(wait_state: WaitState, priority_class: u8) -> Self {
        Self {
            wait_state,
            priority_class,
        }
    }
}

impl fmt::Display for SchedulingState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{:#04x}", self.wait_state, self.priority_class)
    }
}

/// Thread Control Block (TCB)
pub struct Thread {
    /// Unique thread ID
    id: ThreadId,

    /// Thread name (for debugging)
    name: Box<str>,

    /// Owning process, as a non-owning back-reference
    owner: Pid,

    /// Core affinity, immutable for the lifetime of the thread
    core_id: usize,

    /// Current scheduling state, mutated under the critical-section lock
    state: Mutex<SchedulingState>,
}

impl Thread {
    /// Create a ready thread pinned to `core_id`.
    pub fn new(id: ThreadId, name: &str, owner: Pid, core_id: usize, priority_class: u8) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
            core_id,
            state: Mutex::new(SchedulingState::new(WaitState::Ready, priority_class)),
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> Pid {
        self.owner
    }

    pub fn core_id(&self) -> usize {
        self.core_id
    }

    /// Copy of the current scheduling state.
    pub fn scheduling_state(&self) -> SchedulingState {
        *self.state.lock()
    }

    /// Current wait sub-state.
    pub fn wait_state(&self) -> WaitState {
        self.state.lock().wait_state
    }

    /// Current priority/suspend class.
    pub fn priority_class(&self) -> u8 {
        self.state.lock().priority_class
    }

    pub fn is_terminated(&self) -> bool {
        self.wait_state() == WaitState::Terminated
    }

    /// Transition the wait sub-state, preserving the priority class.
    ///
    /// Returns the state prior to the transition.
    pub fn set_wait_state(&self, wait_state: WaitState) -> SchedulingState {
        let mut state = self.state.lock();
        let previous = *state;
        state.wait_state = wait_state;
        previous
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Thread")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("core_id", &self.core_id)
            .field("state", &self.scheduling_state())
            .finish()
    }
}
