//! Synchronization primitives
//!
//! The critical-section lock and the local interrupt mask guard are the two
//! building blocks every scheduling-state mutation composes explicitly.

pub mod intr_guard;
pub mod recursive_lock;
pub mod wait_list;

pub use intr_guard::{InterruptMaskGuard, IrqState};
pub use recursive_lock::{RecursiveLock, RecursiveLockGuard};
pub use wait_list::WaitList;
