//! Local interrupt masking
//!
//! [`IrqState`] models a core's interrupt-enable flag with the two primitives
//! the hardware gives us: read-and-disable, and restore. [`InterruptMaskGuard`]
//! composes them into a scope: interrupts are disabled for the lifetime of
//! the guard and the prior mask state comes back when it drops.
//!
//! The guard is core-local and not reentrant. It only shuts out the owning
//! core's interrupt handlers; cross-core exclusion still requires the
//! critical-section lock.

use core::sync::atomic::{AtomicBool, Ordering};

/// A core's local interrupt-enable flag.
pub struct IrqState {
    enabled: AtomicBool,
}

impl IrqState {
    /// New state with interrupt delivery enabled.
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }

    /// Is local interrupt delivery currently enabled?
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Atomically disable delivery, returning the prior enable state.
    pub fn read_and_disable(&self) -> bool {
        self.enabled.swap(false, Ordering::AcqRel)
    }

    /// Restore a previously saved enable state.
    pub fn restore(&self, was_enabled: bool) {
        self.enabled.store(was_enabled, Ordering::Release);
    }
}

impl Default for IrqState {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoped local-interrupt disable.
///
/// Not reentrant: constructing a second guard over the same [`IrqState`]
/// inside the first one's scope is harmless (both save "disabled"), but the
/// inner guard must drop first, as RAII scoping already guarantees.
pub struct InterruptMaskGuard<'a> {
    irq: &'a IrqState,
    was_enabled: bool,
}

impl<'a> InterruptMaskGuard<'a> {
    /// Disable local interrupts until the guard is dropped.
    pub fn new(irq: &'a IrqState) -> Self {
        let was_enabled = irq.read_and_disable();
        Self { irq, was_enabled }
    }

    /// Enable state observed when the guard was taken.
    pub fn was_enabled(&self) -> bool {
        self.was_enabled
    }
}

impl Drop for InterruptMaskGuard<'_> {
    fn drop(&mut self) {
        self.irq.restore(self.was_enabled);
    }
}
