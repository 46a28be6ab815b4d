//! Population Retry Policy
//!
//! Wraps legacy-store calls made while populating caches. Transient
//! connectivity failures are retried with bounded exponential backoff;
//! every other failure ends the run on its first occurrence.
//!
//! ```text
//! Idle -> Attempting -> Succeeded
//!              |  ^
//!              v  |
//!          BackingOff
//!              |
//!              v
//!        ExhaustedFailed
//! ```
//!
//! Each run keeps its own state, so a run that is backing off never delays
//! unrelated requests.

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use bac_domain::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default multiplier applied to the delay after each failure
pub const DEFAULT_BACKOFF_FACTOR: f64 = 2.0;

/// Unit in which delays are configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayUnit {
    /// Milliseconds
    #[default]
    Milliseconds,
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
}

impl DelayUnit {
    /// Convert an amount in this unit to a `Duration`
    pub fn to_duration(self, amount: u64) -> Duration {
        match self {
            Self::Milliseconds => Duration::from_millis(amount),
            Self::Seconds => Duration::from_secs(amount),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
        }
    }
}

impl FromStr for DelayUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ms" | "millis" | "milliseconds" => Ok(Self::Milliseconds),
            "s" | "secs" | "seconds" => Ok(Self::Seconds),
            "m" | "mins" | "minutes" => Ok(Self::Minutes),
            _ => Err(Error::configuration(format!(
                "Invalid delay unit: {s}. Use milliseconds, seconds or minutes"
            ))),
        }
    }
}

/// Bounded exponential backoff for cache population
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
    backoff_factor: f64,
}

impl RetryPolicy {
    /// Build a policy from externally supplied values.
    ///
    /// # Errors
    ///
    /// A configuration error if any value is zero or `max_delay` is shorter
    /// than `initial_delay`.
    pub fn new(
        initial_delay: u64,
        max_delay: u64,
        unit: DelayUnit,
        max_attempts: u32,
    ) -> Result<Self> {
        if initial_delay == 0 {
            return Err(Error::configuration("Retry initial delay must be positive"));
        }
        if max_delay == 0 {
            return Err(Error::configuration("Retry max delay must be positive"));
        }
        if max_attempts == 0 {
            return Err(Error::configuration("Retry max attempts must be positive"));
        }
        if max_delay < initial_delay {
            return Err(Error::configuration(format!(
                "Retry max delay ({max_delay}) is shorter than initial delay ({initial_delay})"
            )));
        }
        Ok(Self {
            initial_delay: unit.to_duration(initial_delay),
            max_delay: unit.to_duration(max_delay),
            max_attempts,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
        })
    }

    /// Replace the backoff factor
    ///
    /// # Errors
    ///
    /// A configuration error unless the factor is finite and at least 1.
    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Result<Self> {
        if !backoff_factor.is_finite() || backoff_factor < 1.0 {
            return Err(Error::configuration(format!(
                "Retry backoff factor must be at least 1.0, got {backoff_factor}"
            )));
        }
        self.backoff_factor = backoff_factor;
        Ok(self)
    }

    /// Delay before the first retry
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    /// Upper bound of any single delay
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Maximum number of attempts, the first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Multiplier applied per failure
    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    /// Delay after failed attempt number `attempt` (1-based), or `None` once
    /// no attempts remain.
    ///
    /// The delay is `min(initial_delay * backoff_factor^(attempt - 1), max_delay)`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled_ms = self.initial_delay.as_millis() as f64 * self.backoff_factor.powi(exponent);
        let max_ms = self.max_delay.as_millis() as f64;
        Some(Duration::from_millis(scaled_ms.min(max_ms) as u64))
    }

    /// Run `operation` under this policy.
    ///
    /// # Errors
    ///
    /// `ResolutionFailed` carrying the number of attempts made and the last
    /// error, once attempts are exhausted or a non-transient error occurs.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut state = RetryState::Idle.start();
        loop {
            let RetryState::Attempting { attempt } = state else {
                return Err(Error::internal(format!(
                    "Retry run for {operation} left the attempting state: {state}"
                )));
            };

            match call().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation, state = %state.on_success(), "Store call recovered");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    state = state.on_failure(self, err.is_transient());
                    match state {
                        RetryState::BackingOff { attempt, delay } => {
                            warn!(
                                operation,
                                attempt,
                                max_attempts = self.max_attempts,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                error = %err,
                                "Transient store failure, backing off"
                            );
                            tokio::time::sleep(delay).await;
                            state = state.resume();
                        }
                        RetryState::ExhaustedFailed { attempts } => {
                            warn!(
                                operation,
                                attempts,
                                max_attempts = self.max_attempts,
                                transient = err.is_transient(),
                                error = %err,
                                "Store call failed"
                            );
                            return Err(Error::resolution_failed(
                                operation,
                                attempts,
                                err.to_string(),
                            ));
                        }
                        other => {
                            return Err(Error::internal(format!(
                                "Unexpected retry state for {operation}: {other}"
                            )));
                        }
                    }
                }
            }
        }
    }
}

/// Progress of one retry run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Not started
    Idle,
    /// Attempt number `attempt` (1-based) is running
    Attempting {
        /// Current attempt
        attempt: u32,
    },
    /// Attempt `attempt` failed transiently; waiting `delay` before the next
    BackingOff {
        /// Attempt that failed
        attempt: u32,
        /// Wait before the next attempt
        delay: Duration,
    },
    /// An attempt succeeded
    Succeeded {
        /// Attempts made
        attempts: u32,
    },
    /// Gave up
    ExhaustedFailed {
        /// Attempts made
        attempts: u32,
    },
}

impl RetryState {
    /// Begin the first attempt
    pub fn start(self) -> Self {
        match self {
            Self::Idle => Self::Attempting { attempt: 1 },
            other => other,
        }
    }

    /// The running attempt succeeded
    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting { attempt } => Self::Succeeded { attempts: attempt },
            other => other,
        }
    }

    /// The running attempt failed
    pub fn on_failure(self, policy: &RetryPolicy, transient: bool) -> Self {
        match self {
            Self::Attempting { attempt } => {
                match policy.delay_for_attempt(attempt).filter(|_| transient) {
                    Some(delay) => Self::BackingOff { attempt, delay },
                    None => Self::ExhaustedFailed { attempts: attempt },
                }
            }
            other => other,
        }
    }

    /// The backoff delay elapsed
    pub fn resume(self) -> Self {
        match self {
            Self::BackingOff { attempt, .. } => Self::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    /// Whether the run is over
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::ExhaustedFailed { .. })
    }
}

impl fmt::Display for RetryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Attempting { attempt } => write!(f, "attempting #{attempt}"),
            Self::BackingOff { attempt, delay } => {
                write!(f, "backing off after #{attempt} for {delay:?}")
            }
            Self::Succeeded { attempts } => write!(f, "succeeded after {attempts}"),
            Self::ExhaustedFailed { attempts } => write!(f, "failed after {attempts}"),
        }
    }
}
