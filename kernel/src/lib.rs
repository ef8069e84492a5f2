// src/lib.rs
// Kernel library entry point
#![cfg_attr(not(test), no_std)]

// Dynamic allocation for registries, queues and tables
extern crate alloc;

// Kernel modules
pub mod context;
pub mod process;
pub mod scheduler;
pub mod smp;
pub mod sync;
pub mod syscall;

// Re-exports
pub use context::KernelContext;
pub use process::{Handle, Pid, CUR_PROCESS_HANDLE};
pub use syscall::{ResultCode, RESULT_INVALID_HANDLE, RESULT_SUCCESS};
