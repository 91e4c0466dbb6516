//! Interrupt-masked sections
//!
//! The GPT driver has no locks. Thread-context callers keep the interrupt
//! path out by masking interrupts on the local core for the duration of
//! each call.

use hal::InterruptHal;

/// Runs `f` with interrupts masked, restoring the previous state afterwards
///
/// Interrupts are re-enabled only if they were enabled on entry, so nested
/// sections and calls from interrupt context leave the mask alone.
///
/// # Examples
///
/// ```rust,ignore
/// let now = with_interrupts_disabled(&mut cpu, || gpt.current_time());
/// ```
pub fn with_interrupts_disabled<I, F, T>(irq: &mut I, f: F) -> T
where
    I: InterruptHal + ?Sized,
    F: FnOnce() -> T,
{
    let was_enabled = irq.interrupts_enabled();
    if was_enabled {
        irq.disable_interrupts();
    }

    let result = f();

    if was_enabled {
        irq.enable_interrupts();
    }
    result
}

/// ARM CPSR interrupt mask for the local core
///
/// Only masks IRQ; FIQ is left to whoever owns it.
#[cfg(target_arch = "arm")]
#[derive(Debug, Default)]
pub struct CpsrInterrupts;

#[cfg(target_arch = "arm")]
impl CpsrInterrupts {
    /// CPSR I bit: IRQs masked when set
    const CPSR_I: u32 = 1 << 7;

    /// Creates a handle for the current core
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "arm")]
impl InterruptHal for CpsrInterrupts {
    #[inline]
    fn enable_interrupts(&mut self) {
        // SAFETY: unmasking IRQs has no memory effects of its own; the
        // clobbers keep the compiler from moving accesses across it.
        unsafe { core::arch::asm!("cpsie i", options(nostack, preserves_flags)) };
    }

    #[inline]
    fn disable_interrupts(&mut self) {
        // SAFETY: as above.
        unsafe { core::arch::asm!("cpsid i", options(nostack, preserves_flags)) };
    }

    #[inline]
    fn interrupts_enabled(&self) -> bool {
        let cpsr: u32;
        // SAFETY: reading CPSR has no side effects.
        unsafe {
            core::arch::asm!("mrs {}, cpsr", out(reg) cpsr, options(nomem, nostack, preserves_flags))
        };
        cpsr & Self::CPSR_I == 0
    }
}
