//! GPT register access for the i.MX31
//!
//! This module provides a trait-based abstraction over the General Purpose
//! Timer register block, allowing for both real memory-mapped access and a
//! simulated block for testing.
//!
//! ## Register Map
//!
//! | offset | register | use                              |
//! |--------|----------|----------------------------------|
//! | 0x00   | GPTCR    | control (left to clock bring-up) |
//! | 0x04   | GPTPR    | prescaler                        |
//! | 0x08   | GPTSR    | status, write-one-to-clear       |
//! | 0x0C   | GPTIR    | interrupt enable                 |
//! | 0x10   | GPTOCR1  | output compare 1                 |
//! | 0x14   | GPTOCR2  | output compare 2                 |
//! | 0x18   | GPTOCR3  | output compare 3                 |
//! | 0x1C   | GPTICR1  | input capture 1                  |
//! | 0x20   | GPTICR2  | input capture 2                  |
//! | 0x24   | GPTCNT   | free-running counter             |
//!
//! ## Safety
//!
//! Register access is inherently unsafe as it directly touches hardware.
//! `MmioGpt` isolates the unsafe code to its constructor: once a valid
//! mapping has been vouched for, every access goes through the volatile
//! register cells generated by `tock-registers`.

use core::ptr::NonNull;

use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite};

use crate::error::GptError;

/// GPTSR: output compare 1 matched
pub const SR_OF1: u32 = 1 << 0;

/// GPTSR: counter rolled over
pub const SR_ROV: u32 = 1 << 5;

/// GPTIR: output compare 1 interrupt enable
pub const IR_OF1IE: u32 = 1 << 0;

/// GPTIR: rollover interrupt enable
pub const IR_ROVIE: u32 = 1 << 5;

/// GPTPR prescaler field mask (bits 11:0)
pub const PRESCALER_MASK: u32 = 0x0FFF;

register_structs! {
    /// Memory layout of one GPT instance
    ///
    /// GPTCR, channels 2-3 and the capture registers only hold their place.
    #[allow(dead_code)]
    pub GptRegisterBlock {
        (0x00 => cr: ReadWrite<u32>),
        (0x04 => pr: ReadWrite<u32>),
        (0x08 => sr: ReadWrite<u32>),
        (0x0C => ir: ReadWrite<u32>),
        (0x10 => ocr1: ReadWrite<u32>),
        (0x14 => ocr2: ReadWrite<u32>),
        (0x18 => ocr3: ReadWrite<u32>),
        (0x1C => icr1: ReadOnly<u32>),
        (0x20 => icr2: ReadOnly<u32>),
        (0x24 => cnt: ReadOnly<u32>),
        (0x28 => @END),
    }
}

/// Size in bytes of the GPT register block
pub const GPT_BLOCK_SIZE: usize = 0x28;

const _: () = assert!(core::mem::size_of::<GptRegisterBlock>() == GPT_BLOCK_SIZE);

/// GPT register access trait
///
/// Abstracts the registers the timer driver touches so tests can substitute
/// a simulated block.
///
/// ## Implementation Notes
///
/// Implementations must guarantee:
/// - every call performs exactly one access to the named register
/// - accesses are neither merged, cached, nor reordered
/// - writes to `GPTSR` have write-one-to-clear semantics
pub trait GptRegisters {
    /// Reads GPTSR
    fn status(&mut self) -> u32;

    /// Writes GPTSR (set bits acknowledge the matching conditions)
    fn write_status(&mut self, value: u32);

    /// Reads GPTIR
    fn interrupt_enable(&mut self) -> u32;

    /// Writes GPTIR
    fn write_interrupt_enable(&mut self, value: u32);

    /// Reads GPTOCR1
    fn compare1(&mut self) -> u32;

    /// Writes GPTOCR1
    fn write_compare1(&mut self, value: u32);

    /// Reads GPTPR
    fn prescaler(&mut self) -> u32;

    /// Writes GPTPR
    fn write_prescaler(&mut self, value: u32);

    /// Reads GPTCNT
    fn counter(&mut self) -> u32;
}

/// Memory-mapped GPT register block
///
/// ## Example
///
/// ```rust,ignore
/// // `base` comes from the platform's device mapping code.
/// let regs = unsafe { MmioGpt::new(base)? };
/// ```
#[derive(Debug)]
pub struct MmioGpt {
    block: NonNull<GptRegisterBlock>,
}

impl MmioGpt {
    /// Wraps a mapped GPT register block
    ///
    /// # Errors
    ///
    /// Returns `GptError::NullBase` for a zero address and
    /// `GptError::MisalignedBase` if the address is not 4-byte aligned.
    ///
    /// # Safety
    ///
    /// `base` must be the virtual address of a mapped GPT register block
    /// that stays mapped for the lifetime of the returned value, and no
    /// other code may access the block while it is alive.
    pub unsafe fn new(base: usize) -> Result<Self, GptError> {
        if base % core::mem::align_of::<u32>() != 0 {
            return Err(GptError::MisalignedBase(base));
        }
        let block = NonNull::new(base as *mut GptRegisterBlock).ok_or(GptError::NullBase)?;
        log::debug!("GPT register block @ {:#x}", base);
        Ok(Self { block })
    }

    /// Returns the base address of the register block
    pub fn base(&self) -> usize {
        self.block.as_ptr() as usize
    }

    fn block(&self) -> &GptRegisterBlock {
        // SAFETY: `new` requires the mapping to stay valid while `self` lives.
        unsafe { self.block.as_ref() }
    }
}

// SAFETY: the block is exclusively owned by this handle, so moving it to
// another execution context moves the only access path with it.
unsafe impl Send for MmioGpt {}

impl GptRegisters for MmioGpt {
    #[inline]
    fn status(&mut self) -> u32 {
        self.block().sr.get()
    }

    #[inline]
    fn write_status(&mut self, value: u32) {
        self.block().sr.set(value);
    }

    #[inline]
    fn interrupt_enable(&mut self) -> u32 {
        self.block().ir.get()
    }

    #[inline]
    fn write_interrupt_enable(&mut self, value: u32) {
        self.block().ir.set(value);
    }

    #[inline]
    fn compare1(&mut self) -> u32 {
        self.block().ocr1.get()
    }

    #[inline]
    fn write_compare1(&mut self, value: u32) {
        self.block().ocr1.set(value);
    }

    #[inline]
    fn prescaler(&mut self) -> u32 {
        self.block().pr.get()
    }

    #[inline]
    fn write_prescaler(&mut self, value: u32) {
        self.block().pr.set(value);
    }

    #[inline]
    fn counter(&mut self) -> u32 {
        self.block().cnt.get()
    }
}

/// Simulated GPT register block for testing
///
/// Models the parts of the hardware the driver depends on:
/// - the counter advances only when told to (`advance`) or, optionally, by
///   a fixed step on every counter read (`set_ticks_per_read`)
/// - wrapping past `0xFFFF_FFFF` latches `SR_ROV`
/// - reaching the compare value latches `SR_OF1`
/// - `GPTSR` is write-one-to-clear
/// - a number of compare writes can be scripted to be dropped
///
/// ## Example
///
/// ```rust
/// use hal_imx31::regs::{FakeGpt, GptRegisters, SR_ROV};
///
/// let mut regs = FakeGpt::with_counter(0xFFFF_FFFE);
/// regs.advance(3);
///
/// assert_eq!(regs.counter(), 1);
/// assert_eq!(regs.status() & SR_ROV, SR_ROV);
/// ```
#[derive(Debug, Default, Clone)]
pub struct FakeGpt {
    pr: u32,
    sr: u32,
    ir: u32,
    ocr1: u32,
    cnt: u32,
    /// Counter increment applied on every `counter()` read
    ticks_per_read: u32,
    /// Compare writes still to be silently dropped
    drop_compare_writes: usize,
    /// Every value written to GPTOCR1, dropped or not
    compare_writes: Vec<u32>,
}

impl FakeGpt {
    /// Creates a simulated block with every register zeroed
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulated block with the counter at `cnt`
    pub fn with_counter(cnt: u32) -> Self {
        Self {
            cnt,
            ..Self::default()
        }
    }

    /// Advances the counter by `ticks`, latching `SR_ROV` and `SR_OF1` the way
    /// the hardware would
    ///
    /// # Panics
    ///
    /// Panics if `ticks` would wrap the counter more than once; the driver
    /// is not defined for that case and neither is the simulation.
    pub fn advance(&mut self, ticks: u64) {
        assert!(
            ticks <= u64::from(u32::MAX) + 1,
            "FakeGpt: advancing {} ticks wraps more than once",
            ticks
        );
        if ticks == 0 {
            return;
        }

        let start = u64::from(self.cnt);
        let end = start + ticks;

        // The compare fires when the counter steps onto ocr1.
        let target = u64::from(self.ocr1);
        let hits_before_wrap = target > start && target <= end;
        let hits_after_wrap = end > u64::from(u32::MAX) && target + (1 << 32) <= end;
        if hits_before_wrap || hits_after_wrap {
            self.sr |= SR_OF1;
        }

        if end > u64::from(u32::MAX) {
            self.sr |= SR_ROV;
        }
        self.cnt = end as u32;
    }

    /// Makes every `counter()` read advance the counter by `ticks` first
    pub fn set_ticks_per_read(&mut self, ticks: u32) {
        self.ticks_per_read = ticks;
    }

    /// Drops the next `count` writes to GPTOCR1 without changing it
    pub fn drop_next_compare_writes(&mut self, count: usize) {
        self.drop_compare_writes = count;
    }

    /// Returns all values written to GPTOCR1, including dropped writes
    pub fn compare_writes(&self) -> &[u32] {
        &self.compare_writes
    }

    /// Returns whether the interrupt line would be asserted
    pub fn irq_pending(&self) -> bool {
        let compare = self.sr & SR_OF1 != 0 && self.ir & IR_OF1IE != 0;
        let rollover = self.sr & SR_ROV != 0 && self.ir & IR_ROVIE != 0;
        compare || rollover
    }

    /// Returns GPTSR without side effects
    pub fn peek_status(&self) -> u32 {
        self.sr
    }

    /// Returns GPTIR without side effects
    pub fn peek_interrupt_enable(&self) -> u32 {
        self.ir
    }

    /// Returns GPTOCR1 without side effects
    pub fn peek_compare1(&self) -> u32 {
        self.ocr1
    }

    /// Returns GPTCNT without advancing it
    pub fn peek_counter(&self) -> u32 {
        self.cnt
    }

    /// Forces status bits on, as hardware would latch them
    pub fn latch_status(&mut self, bits: u32) {
        self.sr |= bits;
    }
}

impl GptRegisters for FakeGpt {
    fn status(&mut self) -> u32 {
        self.sr
    }

    fn write_status(&mut self, value: u32) {
        self.sr &= !value;
    }

    fn interrupt_enable(&mut self) -> u32 {
        self.ir
    }

    fn write_interrupt_enable(&mut self, value: u32) {
        self.ir = value;
    }

    fn compare1(&mut self) -> u32 {
        self.ocr1
    }

    fn write_compare1(&mut self, value: u32) {
        self.compare_writes.push(value);
        if self.drop_compare_writes > 0 {
            self.drop_compare_writes -= 1;
            return;
        }
        self.ocr1 = value;
    }

    fn prescaler(&mut self) -> u32 {
        self.pr
    }

    fn write_prescaler(&mut self, value: u32) {
        self.pr = value & PRESCALER_MASK;
    }

    fn counter(&mut self) -> u32 {
        if self.ticks_per_read != 0 {
            self.advance(u64::from(self.ticks_per_read));
        }
        self.cnt
    }
}
