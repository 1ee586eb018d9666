//! Runtime core of the experiment playground: matches the experiment catalog
//! against device capabilities, recommends safe performance settings, keeps a
//! bounded log of errors reported by the rendering layer and encodes shareable
//! session links. Derived views are memoized in a [`CacheManager`].
mod cache;
mod capabilities;
mod compat;
mod errors;
mod manager;
mod metadata;
mod settings;
mod share;
mod stats;

pub use cache::{CacheKey, CacheManager, CacheStats};
pub use capabilities::{DeviceCapabilities, DeviceSummary};
pub use compat::{check_compatibility, CompatibilityResult, Incompatibility};
pub use errors::{ErrorKind, ErrorLog, PlaygroundError, DEFAULT_ERROR_CAPACITY};
pub use manager::PlaygroundManager;
pub use metadata::{estimate_memory, target_fps, ExperimentMetadata};
pub use settings::{recommend_settings, PerformanceSettings, QualityLevel};
pub use share::{
    generate_share_url, generate_share_url_with_base, parse_share_url, ShareState, SharedSession,
};
pub use stats::Statistics;

pub use catalog::{
    Category, Difficulty, ExperimentDescriptor, ExperimentRegistry, Family, PerformanceLevel,
};
pub use labconfig::PlaygroundConfig;
