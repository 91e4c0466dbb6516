//! # Hardware Abstraction Layer (HAL)
//!
//! This crate defines hardware abstraction traits.
//!
//! ## Philosophy
//!
//! **Architecture must be fully abstracted and swappable.**
//!
//! No board-specific assumptions should leak into core logic.
//! The HAL provides traits that board-specific crates implement.
//!
//! ## Design Principles
//!
//! 1. **No board-specific assumptions**: Core logic must work on any timer
//! 2. **Trait-based**: All hardware operations go through traits
//! 3. **Minimal unsafe**: Hardware access requires unsafe, but keep it isolated
//! 4. **Testable**: HAL can be mocked for testing

#![no_std]

pub mod interrupts;
pub mod timer;

pub use interrupts::InterruptHal;
pub use timer::{DeadlineTimer, TimerDevice};
