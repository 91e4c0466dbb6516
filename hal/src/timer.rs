//! # Timer Device
//!
//! Hardware abstraction for monotonic time and one-shot deadlines.
//!
//! ## Philosophy
//!
//! **Time is a service, not a global variable.**
//!
//! A timer device owns whatever software state it needs to extend its
//! hardware counter (rollover counts, for instance). Two devices never
//! share that state, so simulated and real timers can coexist.
//!
//! These traits do NOT:
//! - Provide wall-clock time (no UTC, no timezones)
//! - Block or sleep (polling only)
//! - Implement scheduling or timer queues (that's for the kernel)
//!
//! ## Design Principles
//!
//! 1. **Monotonic**: Ticks never go backwards
//! 2. **Non-blocking**: Always returns immediately
//! 3. **Cumulative**: Returns total ticks since device bring-up
//! 4. **Frequency-agnostic**: No assumptions about tick rate at this layer
//! 5. **One-shot deadlines**: Every deadline is re-armed explicitly
//!
//! ## Exclusivity
//!
//! Every method takes `&mut self`. Interrupt handlers and thread-context
//! code that share a device must mask interrupts around their calls; the
//! traits perform no locking of their own.

/// Hardware timer device trait
///
/// Provides access to a monotonic tick counter. Ticks are cumulative
/// and never decrease.
///
/// # Implementation Notes
///
/// - Must be monotonic (never return a smaller value)
/// - Must not block
/// - Tick frequency is implementation-defined
/// - Hardware counter overflow must be folded into the returned value
///
/// # Examples
///
/// ```
/// use hal::TimerDevice;
///
/// fn measure_operation<T: TimerDevice>(timer: &mut T) -> u64 {
///     let start = timer.poll_ticks();
///     // ... do work ...
///     let end = timer.poll_ticks();
///     end - start
/// }
/// ```
pub trait TimerDevice {
    /// Returns the current tick count
    ///
    /// This value is:
    /// - Monotonic (never decreases)
    /// - Cumulative (total ticks since device bring-up)
    /// - Non-blocking (returns immediately)
    fn poll_ticks(&mut self) -> u64;
}

/// One-shot deadline interrupt source
///
/// A deadline is an absolute tick value on the same time base as
/// [`TimerDevice::poll_ticks`]. Arming enables the interrupt; the
/// interrupt path acknowledges it, which also disarms it.
///
/// # Implementation Notes
///
/// - `set_deadline` may silently skip a deadline the hardware can no
///   longer reach; callers detect elapsed deadlines by comparing against
///   `poll_ticks`
/// - `ack_deadline_irq` must clear every condition that can share the
///   interrupt line, so the line deasserts
/// - Neither method reports failure
pub trait DeadlineTimer: TimerDevice {
    /// Arms a one-shot interrupt at `deadline`
    fn set_deadline(&mut self, deadline: u64);

    /// Acknowledges the timer interrupt and disarms the deadline
    fn ack_deadline_irq(&mut self);
}
