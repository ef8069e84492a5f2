//! Syscall handlers

pub mod process;
