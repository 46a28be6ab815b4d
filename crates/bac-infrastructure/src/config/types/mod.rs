//! Configuration types module

pub mod app;
pub mod cache;
pub mod cluster;
pub mod logging;
pub mod retry;

// Re-export main types
pub use app::*;
pub use cache::*;
pub use cluster::*;
pub use logging::*;
pub use retry::*;
