//! Bring-up and configuration errors
//!
//! The timer operations themselves never fail; errors only exist at the
//! boundary where a register block and a configuration are handed to the
//! driver.

use thiserror::Error;

/// Errors that can occur while bringing up a GPT instance
#[derive(Debug, Error)]
pub enum GptError {
    /// Register block base address is null
    #[error("GPT register block base is null")]
    NullBase,

    /// Register block base address is not 32-bit aligned
    #[error("GPT register block base {0:#x} is not 4-byte aligned")]
    MisalignedBase(usize),

    /// Prescaler does not fit the 12-bit GPTPR field
    #[error("Prescaler {0} exceeds the 12-bit GPTPR field")]
    PrescalerOutOfRange(u32),

    /// Counter rate is zero
    #[error("Tick rate must be at least one tick per microsecond")]
    ZeroTickRate,

    /// Configuration could not be parsed
    #[error("Invalid GPT configuration: {0}")]
    Config(#[from] serde_json::Error),
}
