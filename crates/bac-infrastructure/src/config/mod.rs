//! Configuration
//!
//! Sources are layered by [`ConfigLoader`]: defaults, a TOML file, then
//! `BAC__`-prefixed environment variables.

pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, validate_app_config};
pub use types::*;
