//! Bootstrap - configuration to running cluster
//!
//! The composition root: validates the configured caches, joins the cluster
//! through the configured transport, and builds resolvers over it.
//!
//! ```text
//! AppConfig -> CacheRegistry -> CacheClusterManager -> ClusterHandle
//!                   ^                   ^                    |
//!              [[caches]]         linkme registry            v
//!                                                 FilterDefinitionBridge
//!                                                 ChannelSegmentWaveformIds
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let context = init_app(ConfigLoader::new().load()?).await?;
//! let resolver = context.filter_definition_resolver(stores)?;
//! let result = resolver.resolve(&hypotheses).await?;
//! context.shutdown().await?;
//! ```

use std::sync::Arc;

use bac_application::cache::{CacheClusterManager, ClusterHandle};
use bac_application::resilience::RetryPolicy;
use bac_application::use_cases::{
    BridgingResolver, ChannelSegmentWaveformIds, ChannelSegmentWaveformStore,
    FilterDefinitionBridge, FilterDefinitionStores, filter_definition_resolver,
};
use bac_domain::error::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::config::loader::validate_app_config;

/// Running application: configuration, cluster membership and retry policy
pub struct AppContext {
    /// Application configuration
    pub config: Arc<AppConfig>,

    manager: Arc<CacheClusterManager>,
    cluster: ClusterHandle,
    retry_policy: RetryPolicy,
}

impl AppContext {
    /// Build a context with its own cluster manager
    pub async fn new(config: AppConfig) -> Result<Self> {
        Self::with_manager(config, Arc::new(CacheClusterManager::new())).await
    }

    /// Build a context on a caller-owned cluster manager. If the manager
    /// already holds an active membership, that membership is reused.
    pub async fn with_manager(config: AppConfig, manager: Arc<CacheClusterManager>) -> Result<Self> {
        validate_app_config(&config)?;
        let registry = config.registry()?;
        let retry_policy = config.retry_policy()?;

        let cluster = manager
            .initialize(&config.cluster.to_provider_config(), registry)
            .await?;

        info!(
            provider = cluster.provider_name(),
            caches = cluster.registry().len(),
            max_attempts = retry_policy.max_attempts(),
            "Application context ready"
        );

        Ok(Self {
            config: Arc::new(config),
            manager,
            cluster,
            retry_policy,
        })
    }

    /// Active cluster membership
    pub fn cluster(&self) -> &ClusterHandle {
        &self.cluster
    }

    /// The manager that owns the membership
    pub fn manager(&self) -> Arc<CacheClusterManager> {
        Arc::clone(&self.manager)
    }

    /// Configured population retry policy
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Filter-definition resolver over the given legacy stores
    pub fn filter_definition_resolver(
        &self,
        stores: FilterDefinitionStores,
    ) -> Result<BridgingResolver<FilterDefinitionBridge>> {
        filter_definition_resolver(&self.cluster, stores, self.retry_policy.clone())
    }

    /// Channel segment waveform-id lookup over the given legacy store
    pub fn channel_segment_waveform_ids(
        &self,
        store: ChannelSegmentWaveformStore,
    ) -> Result<ChannelSegmentWaveformIds> {
        ChannelSegmentWaveformIds::new(&self.cluster, store, self.retry_policy.clone())
    }

    /// Leave the cluster
    pub async fn shutdown(&self) -> Result<()> {
        self.manager.shutdown().await
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("provider", &self.cluster.provider_name())
            .field("caches", &self.cluster.registry().len())
            .field("active", &self.cluster.is_active())
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

/// Initialize the application from configuration
pub async fn init_app(config: AppConfig) -> Result<AppContext> {
    AppContext::new(config).await
}
