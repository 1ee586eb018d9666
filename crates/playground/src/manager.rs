use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use catalog::{ExperimentDescriptor, ExperimentRegistry, Family};
use labconfig::PlaygroundConfig;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, CacheManager, CacheStats};
use crate::capabilities::DeviceCapabilities;
use crate::compat::{check_compatibility, CompatibilityResult, Incompatibility};
use crate::errors::{ErrorKind, ErrorLog, PlaygroundError};
use crate::metadata::ExperimentMetadata;
use crate::settings::{recommend_settings, PerformanceSettings};
use crate::share::{self, ShareState, SharedSession};
use crate::stats::Statistics;

const ALL_EXPERIMENTS: CacheKey<Vec<ExperimentDescriptor>> =
    CacheKey::new_static("all-experiments");
const STATISTICS: CacheKey<Statistics> = CacheKey::new_static("statistics");

fn family_key(family: Family) -> CacheKey<Vec<ExperimentDescriptor>> {
    CacheKey::new(format!("experiments-{family}"))
}

fn metadata_key(id: &str) -> CacheKey<ExperimentMetadata> {
    CacheKey::new(format!("metadata-{id}"))
}

static GLOBAL: OnceLock<PlaygroundManager> = OnceLock::new();

/// Entry point for the presentation layer. Catalog views and metadata are
/// memoized; errors reported by the rendering layer go into a bounded log.
/// Every method takes `&self`, so one instance can be shared across threads.
#[derive(Debug)]
pub struct PlaygroundManager {
    registry: ExperimentRegistry,
    config: PlaygroundConfig,
    cache: Mutex<CacheManager>,
    errors: Mutex<ErrorLog>,
}

impl PlaygroundManager {
    pub fn new(registry: ExperimentRegistry, config: PlaygroundConfig) -> Self {
        debug!(
            experiments = registry.len(),
            error_capacity = config.errors.capacity,
            cache_ttl = ?config.cache.ttl,
            "initialising playground manager"
        );
        Self {
            cache: Mutex::new(CacheManager::from_settings(&config.cache)),
            errors: Mutex::new(ErrorLog::new(config.errors.capacity)),
            registry,
            config,
        }
    }

    /// Process-wide instance over the built-in catalog and default policy,
    /// created on first use.
    pub fn global() -> &'static PlaygroundManager {
        GLOBAL.get_or_init(Self::default)
    }

    pub fn registry(&self) -> &ExperimentRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PlaygroundConfig {
        &self.config
    }

    pub fn all_experiments(&self) -> Arc<Vec<ExperimentDescriptor>> {
        self.cached(&ALL_EXPERIMENTS, || self.registry.experiments().to_vec())
    }

    pub fn experiments_by_family(&self, family: Family) -> Arc<Vec<ExperimentDescriptor>> {
        self.cached(&family_key(family), || {
            self.registry.by_family(family).cloned().collect()
        })
    }

    pub fn experiment(&self, id: &str) -> Option<&ExperimentDescriptor> {
        self.registry.get(id)
    }

    pub fn experiment_metadata(&self, id: &str) -> Option<Arc<ExperimentMetadata>> {
        let experiment = self.registry.get(id)?;
        Some(self.cached(&metadata_key(id), || {
            ExperimentMetadata::derive(experiment, &self.config.memory)
        }))
    }

    pub fn is_experiment_compatible(
        &self,
        id: &str,
        capabilities: &DeviceCapabilities,
    ) -> CompatibilityResult {
        let (Some(experiment), Some(metadata)) =
            (self.registry.get(id), self.experiment_metadata(id))
        else {
            debug!(experiment = id, "compatibility requested for unknown experiment");
            return CompatibilityResult::incompatible(Incompatibility::NotFound);
        };
        let result = check_compatibility(experiment, &metadata, capabilities);
        debug!(
            experiment = id,
            compatible = result.compatible,
            reason = ?result.reason,
            "evaluated compatibility"
        );
        result
    }

    /// `None` when the experiment is unknown.
    pub fn recommended_settings(
        &self,
        id: &str,
        capabilities: &DeviceCapabilities,
    ) -> Option<PerformanceSettings> {
        let experiment = self.registry.get(id)?;
        let metadata = self.experiment_metadata(id)?;
        Some(recommend_settings(
            experiment,
            &metadata,
            capabilities,
            &self.config.recommend,
        ))
    }

    pub fn add_error(&self, error: PlaygroundError) {
        if error.recoverable {
            info!(
                kind = %error.kind,
                message = %error.message,
                details = ?error.details,
                "playground reported recoverable error"
            );
        } else {
            warn!(
                kind = %error.kind,
                message = %error.message,
                details = ?error.details,
                "playground reported fatal error"
            );
        }
        if let Some(evicted) = self.lock_errors().push(error) {
            debug!(
                kind = %evicted.kind,
                message = %evicted.message,
                "error log full; dropped oldest entry"
            );
        }
    }

    /// Snapshot of the error log, oldest first.
    pub fn errors(&self) -> Vec<PlaygroundError> {
        self.lock_errors().snapshot()
    }

    pub fn errors_by_kind(&self, kind: ErrorKind) -> Vec<PlaygroundError> {
        self.lock_errors().by_kind(kind)
    }

    pub fn clear_errors(&self) {
        self.lock_errors().clear();
    }

    pub fn create_share_data(
        &self,
        id: &str,
        settings: PerformanceSettings,
        capabilities: &DeviceCapabilities,
    ) -> ShareState {
        ShareState::new(id, settings, capabilities)
    }

    pub fn generate_share_url(&self, state: &ShareState) -> String {
        share::generate_share_url(state)
    }

    pub fn parse_share_url(&self, url: &str) -> Option<SharedSession> {
        share::parse_share_url(url)
    }

    pub fn statistics(&self) -> Arc<Statistics> {
        self.cached(&STATISTICS, || {
            Statistics::from_experiments(self.registry.experiments())
        })
    }

    /// Drops every memoized view so the next read recomputes it.
    pub fn invalidate_cache(&self) {
        self.lock_cache().clear();
        debug!("playground cache invalidated");
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.lock_cache().stats()
    }

    fn cached<T, F>(&self, key: &CacheKey<T>, compute: F) -> Arc<T>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let mut cache = self.lock_cache();
        if let Some(hit) = cache.get(key) {
            return hit;
        }
        debug!(key = key.name(), "computing cache entry");
        cache.set(key, compute())
    }

    fn lock_cache(&self) -> MutexGuard<'_, CacheManager> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_errors(&self) -> MutexGuard<'_, ErrorLog> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PlaygroundManager {
    fn default() -> Self {
        Self::new(ExperimentRegistry::builtin(), PlaygroundConfig::default())
    }
}
