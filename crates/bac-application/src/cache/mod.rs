//! Cache layer
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheRegistry`] | Validated catalog of cache descriptors |
//! | [`CacheClusterManager`] | Joins the cluster and hands out cache handles |
//! | [`KeyMappingCache`] | One direction of a legacy/domain id mapping |
//! | [`RequestMemoCache`] | Memoized resolution results by fingerprint |

pub mod cluster;
pub mod key_mapping;
pub mod memo;
pub mod registry;

pub use cluster::{CacheClusterManager, CacheHandle, ClusterHandle};
pub use key_mapping::{BidirectionalMapping, KeyMappingCache};
pub use memo::RequestMemoCache;
pub use registry::{CacheRegistry, standard_catalog};
