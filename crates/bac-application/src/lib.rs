//! Application Layer - Bridged Accessor Cache
//!
//! Orchestrates the named caches and the legacy store to resolve domain
//! entities into legacy-backed values with partial-result tracking.
//!
//! ## Components
//!
//! - `cache::*`: descriptor registry, cluster manager, key-mapping caches,
//!   request memoization
//! - `resilience::*`: population retry policy
//! - `use_cases::*`: bridging resolver and the filter-definition bridge
//!
//! ## Ports (Interfaces)
//!
//! - `ports::registry::*`: link-time registry of cluster transports
//! - `domain_services::*`: service interfaces
//!
//! ## Dependencies
//!
//! This crate depends only on:
//! - `bac-domain`: errors, value objects and port traits
//! - Pure Rust libraries for async, serialization, etc.

pub mod cache;
pub mod domain_services;
pub mod ports;
pub mod resilience;
pub mod use_cases;

pub use cache::*;
pub use domain_services::*;
pub use resilience::*;
pub use use_cases::*;
