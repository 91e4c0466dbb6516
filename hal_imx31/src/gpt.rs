//! # i.MX31 GPT Timer Driver
//!
//! Turns the GPT's free-running 32-bit counter and its first output compare
//! channel into a 64-bit monotonic clock and a one-shot deadline interrupt.
//!
//! ## Extended Clock
//!
//! The upper 32 bits of time are a software count of counter rollovers
//! (`high_bits`). It is advanced only when the deadline interrupt is
//! acknowledged. Between a physical wrap and its acknowledgment the latched
//! `ROV` flag stands in for the missing increment, so time never appears to
//! jump backwards.
//!
//! Assumption: the counter wraps at most once between two acknowledgments.
//! Debug builds assert that time never decreases, which is how a violation
//! shows up.
//!
//! ## Deadlines
//!
//! Only the low 32 bits of a deadline reach the compare register. A
//! deadline that is not ahead of the counter is skipped; the caller notices
//! by comparing against `current_time`. Every deadline is one-shot:
//! acknowledging the interrupt disarms it.
//!
//! ## Exclusivity
//!
//! All operations take `&mut self` and must not interleave with the
//! interrupt path. Callers outside interrupt context mask interrupts (see
//! [`crate::critical::with_interrupts_disabled`]). Concurrent use from
//! several processors is undefined; each core gets its own instance.

use hal::{DeadlineTimer, TimerDevice};

use crate::config::{GptConfig, TickRate};
use crate::error::GptError;
use crate::regs::{GptRegisters, IR_OF1IE, SR_OF1, SR_ROV};

/// GPT-backed extended clock and deadline controller
///
/// # Examples
///
/// ```
/// use hal_imx31::regs::FakeGpt;
/// use hal_imx31::{Gpt, GptConfig};
///
/// let mut gpt = Gpt::new(FakeGpt::with_counter(0xFFFF_FFF0), &GptConfig::default()).unwrap();
/// gpt.registers_mut().advance(0x20);
///
/// // The wrap shows up before the interrupt is acknowledged...
/// assert_eq!(gpt.current_time(), 0x1_0000_0010);
///
/// // ...and is folded into the high bits once it is.
/// gpt.ack_deadline_irq();
/// assert_eq!(gpt.high_bits(), 1);
/// assert_eq!(gpt.current_time(), 0x1_0000_0010);
/// ```
#[derive(Debug)]
pub struct Gpt<R: GptRegisters> {
    /// Register access path
    regs: R,
    /// Rollovers acknowledged so far
    high_bits: u64,
    /// Tick/microsecond conversion for this instance
    tick_rate: TickRate,
    /// Last value handed out by `current_time`
    #[cfg(debug_assertions)]
    last_time: u64,
}

impl<R: GptRegisters> Gpt<R> {
    /// Brings up the driver on an already clocked GPT
    ///
    /// Writes the prescaler, disarms the compare interrupt, acknowledges
    /// any stale compare/rollover status and starts `high_bits` at zero.
    /// GPTCR is left as the clock bring-up configured it.
    ///
    /// # Errors
    ///
    /// Returns the error from [`GptConfig::validate`] if `config` does not
    /// fit the hardware. The registers are not touched in that case.
    pub fn new(mut regs: R, config: &GptConfig) -> Result<Self, GptError> {
        config.validate()?;
        let tick_rate = config.tick_rate()?;

        regs.write_prescaler(config.prescaler);
        let enabled = regs.interrupt_enable();
        regs.write_interrupt_enable(enabled & !IR_OF1IE);
        let status = regs.status();
        regs.write_status(status | SR_OF1 | SR_ROV);

        log::debug!(
            "GPT up: prescaler {}, {} ticks/us",
            config.prescaler,
            tick_rate.ticks_per_us()
        );

        Ok(Self {
            regs,
            high_bits: 0,
            tick_rate,
            #[cfg(debug_assertions)]
            last_time: 0,
        })
    }

    /// Returns the current 64-bit tick count
    ///
    /// Monotonically non-decreasing as long as every rollover is
    /// acknowledged before the next one.
    pub fn current_time(&mut self) -> u64 {
        let mut rolled = self.rollover_pending();
        let mut count = self.regs.counter();

        let confirmed = self.rollover_pending();
        if confirmed != rolled {
            // Wrapped between the flag and counter reads.
            rolled = confirmed;
            count = self.regs.counter();
        }

        let high = self.high_bits.wrapping_add(u64::from(rolled));
        let now = (high << 32) + u64::from(count);
        self.check_monotonic(now);
        now
    }

    /// Arms a one-shot compare interrupt at `deadline`
    ///
    /// Skipped silently if the low 32 bits of `deadline` are not strictly
    /// ahead of the counter.
    pub fn set_deadline(&mut self, deadline: u64) {
        let target = deadline as u32;
        let count = self.regs.counter();
        if target <= count {
            log::trace!(
                "GPT deadline {:#x} not ahead of counter {:#x}, skipped",
                target,
                count
            );
            return;
        }

        let enabled = self.regs.interrupt_enable();
        self.regs.write_interrupt_enable(enabled | IR_OF1IE);
        self.write_compare_verified(target);
        log::trace!("GPT deadline armed at {:#x}", target);
    }

    /// Acknowledges a compare or rollover interrupt
    ///
    /// Folds a pending rollover into `high_bits`, disarms the compare
    /// interrupt and clears both status conditions.
    pub fn ack_deadline_irq(&mut self) {
        if self.rollover_pending() {
            self.high_bits = self.high_bits.wrapping_add(1);
            log::trace!("GPT rollover acknowledged, high bits now {}", self.high_bits);
        }

        let enabled = self.regs.interrupt_enable();
        self.regs.write_interrupt_enable(enabled & !IR_OF1IE);

        let status = self.regs.status();
        self.regs.write_status(status | SR_OF1 | SR_ROV);
    }

    /// Returns the number of rollovers acknowledged so far
    pub fn high_bits(&self) -> u64 {
        self.high_bits
    }

    /// Returns whether the compare interrupt is enabled
    pub fn is_armed(&mut self) -> bool {
        self.regs.interrupt_enable() & IR_OF1IE != 0
    }

    /// Returns the tick-rate converter for this instance
    pub fn tick_rate(&self) -> TickRate {
        self.tick_rate
    }

    /// Returns the register access path
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Returns the register access path mutably
    ///
    /// Clearing `IR_OF1IE` through this is the way to cancel an armed
    /// deadline outside the interrupt path.
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Consumes the driver, returning the register access path
    pub fn into_registers(self) -> R {
        self.regs
    }

    fn rollover_pending(&mut self) -> bool {
        self.regs.status() & SR_ROV != 0
    }

    /// Writes GPTOCR1 until it reads back as `value`
    ///
    /// Compare writes can be lost on this part; the loop is the erratum
    /// workaround and has no iteration cap.
    fn write_compare_verified(&mut self, value: u32) {
        loop {
            self.regs.write_compare1(value);
            if self.regs.compare1() == value {
                return;
            }
            log::trace!("GPT compare write {:#x} lost, retrying", value);
        }
    }

    #[cfg(debug_assertions)]
    fn check_monotonic(&mut self, now: u64) {
        debug_assert!(
            now >= self.last_time,
            "GPT time went backwards ({:#x} -> {:#x}): counter wrapped more than once between acknowledgments",
            self.last_time,
            now
        );
        self.last_time = now;
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_monotonic(&mut self, _now: u64) {}
}

impl<R: GptRegisters> TimerDevice for Gpt<R> {
    fn poll_ticks(&mut self) -> u64 {
        self.current_time()
    }
}

impl<R: GptRegisters> DeadlineTimer for Gpt<R> {
    fn set_deadline(&mut self, deadline: u64) {
        Gpt::set_deadline(self, deadline);
    }

    fn ack_deadline_irq(&mut self) {
        Gpt::ack_deadline_irq(self);
    }
}
