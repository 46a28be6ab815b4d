//! Transport Provider Registry
//!
//! Compile-time registration of cluster transports using the `linkme`
//! crate. Transports that are linked into the binary become selectable by
//! name from configuration.
//!
//! ```text
//! 1. Provider defines:  #[linkme::distributed_slice(CACHE_PROVIDERS)]
//!                       static ENTRY: CacheProviderEntry = ...
//! 2. Registry declares: #[linkme::distributed_slice]
//!                       pub static CACHE_PROVIDERS: [CacheProviderEntry] = [..]
//! 3. Resolver queries:  CACHE_PROVIDERS.iter()
//! 4. Config selects:    "provider = redis" -> RedisCacheProvider
//! ```
//!
//! ### Registering a Provider (in bac-providers)
//!
//! ```ignore
//! use bac_application::ports::registry::{CacheProviderEntry, CACHE_PROVIDERS};
//!
//! #[linkme::distributed_slice(CACHE_PROVIDERS)]
//! static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
//!     name: "moka",
//!     description: "Moka in-memory single-node transport",
//!     factory: |config| Ok(Arc::new(MokaCacheProvider::from_config(config))),
//! };
//! ```

pub mod cache;

pub use cache::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry, list_cache_providers,
    resolve_cache_provider,
};
