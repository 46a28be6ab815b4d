//! # Bridged Accessor Cache - Domain Layer
//!
//! Core types and port traits for caching legacy/domain identifier mappings
//! and memoizing bridging resolutions. Nothing in this crate performs I/O.
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`error`] | Error taxonomy and `Result` alias |
//! | [`constants`] | Default TTLs, batch limits, standard cache names |
//! | [`value_objects`] | Descriptors, fingerprints, resolution results, seismic ids |
//! | [`ports`] | Cache transport and legacy store contracts |

/// Domain constants
pub mod constants;
/// Error handling types
pub mod error;
/// Port traits
pub mod ports;
/// Domain value objects
pub mod value_objects;

pub use error::{Error, Result};
