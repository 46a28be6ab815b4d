//! Retry policy configuration types

use bac_application::resilience::{DEFAULT_BACKOFF_FACTOR, DelayUnit, RetryPolicy};
use bac_domain::error::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_RETRY_INITIAL_DELAY, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_DELAY,
};

/// Store population retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Delay before the first retry, in `delay_unit`
    pub initial_delay: u64,

    /// Upper bound on any delay, in `delay_unit`
    pub max_delay: u64,

    /// Unit of both delays
    pub delay_unit: DelayUnit,

    /// Attempts per store call, the first one included
    pub max_attempts: u32,

    /// Multiplier applied to the delay after each failure
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_RETRY_INITIAL_DELAY,
            max_delay: DEFAULT_RETRY_MAX_DELAY,
            delay_unit: DelayUnit::Milliseconds,
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        }
    }
}

impl RetryConfig {
    /// Validated policy
    pub fn to_policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(
            self.initial_delay,
            self.max_delay,
            self.delay_unit,
            self.max_attempts,
        )?
        .with_backoff_factor(self.backoff_factor)
    }
}
