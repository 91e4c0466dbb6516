//! Interrupt masking abstraction

/// Local interrupt control
///
/// This trait abstracts masking interrupts on the current processor.
/// Different architectures have different mechanisms (CPSR I-bit on ARM,
/// `cli`/`sti` on x86), but all can implement this trait.
///
/// Routing interrupts to handlers is the interrupt controller's job and is
/// not part of this trait.
pub trait InterruptHal {
    /// Enables interrupts
    fn enable_interrupts(&mut self);

    /// Disables interrupts
    fn disable_interrupts(&mut self);

    /// Returns whether interrupts are enabled
    fn interrupts_enabled(&self) -> bool;
}
