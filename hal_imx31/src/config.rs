//! GPT configuration and tick-rate conversions

use serde::{Deserialize, Serialize};

use crate::error::GptError;
use crate::regs::PRESCALER_MASK;

/// Configuration applied when a GPT instance is brought up
///
/// The clock feeding the counter is chosen by the platform's clock
/// bring-up; this only describes what the driver needs to know about it.
///
/// # Examples
///
/// ```
/// use hal_imx31::GptConfig;
///
/// let config = GptConfig::from_json(r#"{ "prescaler": 1, "ticks_per_us": 33 }"#).unwrap();
/// assert_eq!(config.prescaler, 1);
/// assert_eq!(config.tick_rate().unwrap().us_to_ticks(2), 66);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GptConfig {
    /// GPTPR divider value; the counter runs at clock / (prescaler + 1)
    pub prescaler: u32,
    /// Counter ticks per microsecond after prescaling
    pub ticks_per_us: u32,
}

impl GptConfig {
    /// Default divider: count every input clock edge
    pub const DEFAULT_PRESCALER: u32 = 0;
    /// Default rate: a 1 MHz counter
    pub const DEFAULT_TICKS_PER_US: u32 = 1;

    /// Parses a configuration from JSON, filling missing fields with defaults
    ///
    /// # Errors
    ///
    /// Returns `GptError::Config` if the text is not valid JSON for this
    /// structure, or the relevant error from [`GptConfig::validate`].
    pub fn from_json(text: &str) -> Result<Self, GptError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field fits the hardware
    pub fn validate(&self) -> Result<(), GptError> {
        if self.prescaler & !PRESCALER_MASK != 0 {
            return Err(GptError::PrescalerOutOfRange(self.prescaler));
        }
        if self.ticks_per_us == 0 {
            return Err(GptError::ZeroTickRate);
        }
        Ok(())
    }

    /// Returns the tick-rate converter for this configuration
    pub fn tick_rate(&self) -> Result<TickRate, GptError> {
        TickRate::new(self.ticks_per_us)
    }
}

impl Default for GptConfig {
    fn default() -> Self {
        Self {
            prescaler: Self::DEFAULT_PRESCALER,
            ticks_per_us: Self::DEFAULT_TICKS_PER_US,
        }
    }
}

/// Converts between counter ticks and microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    ticks_per_us: u64,
}

impl TickRate {
    /// Creates a converter for a counter running at `ticks_per_us`
    pub fn new(ticks_per_us: u32) -> Result<Self, GptError> {
        if ticks_per_us == 0 {
            return Err(GptError::ZeroTickRate);
        }
        Ok(Self {
            ticks_per_us: u64::from(ticks_per_us),
        })
    }

    /// Returns the counter rate in ticks per microsecond
    pub fn ticks_per_us(&self) -> u64 {
        self.ticks_per_us
    }

    /// Converts ticks to whole microseconds, rounding down
    pub fn ticks_to_us(&self, ticks: u64) -> u64 {
        ticks / self.ticks_per_us
    }

    /// Converts microseconds to ticks, saturating at `u64::MAX`
    pub fn us_to_ticks(&self, us: u64) -> u64 {
        us.saturating_mul(self.ticks_per_us)
    }

    /// Largest microsecond count `us_to_ticks` converts without saturating
    pub fn max_us_to_ticks(&self) -> u64 {
        u64::MAX / self.ticks_per_us
    }
}
