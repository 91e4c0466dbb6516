//! # i.MX31 Hardware Abstraction Layer
//!
//! This crate implements the HAL timer traits on the i.MX31 General Purpose
//! Timer (GPT).
//!
//! ## Scope
//!
//! - A 64-bit monotonic clock built from the 32-bit free-running counter
//!   and its rollover flag
//! - A one-shot deadline interrupt on output compare channel 1
//!
//! Mapping the register block, routing the interrupt and selecting the
//! counter's clock source belong to the platform and are not done here.
//!
//! ## Example
//!
//! ```rust
//! use hal::{DeadlineTimer, TimerDevice};
//! use hal_imx31::regs::FakeGpt;
//! use hal_imx31::{Gpt, GptConfig};
//!
//! let config = GptConfig::from_json(r#"{ "ticks_per_us": 1 }"#).unwrap();
//! let mut timer = Gpt::new(FakeGpt::new(), &config).unwrap();
//!
//! let now = timer.poll_ticks();
//! timer.set_deadline(now + config.tick_rate().unwrap().us_to_ticks(500));
//! assert!(timer.is_armed());
//!
//! timer.registers_mut().advance(500);
//! assert!(timer.registers().irq_pending());
//!
//! timer.ack_deadline_irq();
//! assert!(!timer.is_armed());
//! ```

pub mod config;
pub mod critical;
pub mod error;
pub mod gpt;
pub mod regs;

pub use config::{GptConfig, TickRate};
pub use critical::with_interrupts_disabled;
#[cfg(target_arch = "arm")]
pub use critical::CpsrInterrupts;
pub use error::GptError;
pub use gpt::Gpt;
pub use regs::{FakeGpt, GptRegisters, MmioGpt};
