//! Resilience policies for backing-store access

pub mod retry;

pub use retry::{DEFAULT_BACKOFF_FACTOR, DelayUnit, RetryPolicy, RetryState};
