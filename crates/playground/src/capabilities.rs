use catalog::PerformanceLevel;
use serde::{Deserialize, Serialize};

/// Snapshot produced by the device capability probe. The playground reads it
/// per call and never keeps one between calls.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceCapabilities {
    #[serde(rename = "webglSupport", alias = "webgl_support")]
    pub webgl_support: bool,
    #[serde(rename = "webgl2Support", alias = "webgl2_support")]
    pub webgl2_support: bool,
    #[serde(alias = "touch_support")]
    pub touch_support: bool,
    #[serde(alias = "performance_level")]
    pub performance_level: PerformanceLevel,
    #[serde(alias = "max_texture_size")]
    pub max_texture_size: u32,
    #[serde(alias = "device_pixel_ratio")]
    pub device_pixel_ratio: f32,
    #[serde(alias = "hardware_concurrency")]
    pub hardware_concurrency: u32,
    /// Same relative units as `ExperimentMetadata::estimated_memory_usage`.
    #[serde(alias = "memory_limit")]
    pub memory_limit: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            webgl_support: true,
            webgl2_support: true,
            touch_support: false,
            performance_level: PerformanceLevel::Medium,
            max_texture_size: 4096,
            device_pixel_ratio: 1.0,
            hardware_concurrency: 8,
            memory_limit: 1024,
        }
    }
}

impl DeviceCapabilities {
    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary::from(self)
    }
}

/// The part of a capability snapshot embedded in share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    pub performance_level: PerformanceLevel,
    #[serde(rename = "webglSupport")]
    pub webgl_support: bool,
    #[serde(rename = "webgl2Support")]
    pub webgl2_support: bool,
    pub touch_support: bool,
}

impl From<&DeviceCapabilities> for DeviceSummary {
    fn from(capabilities: &DeviceCapabilities) -> Self {
        Self {
            performance_level: capabilities.performance_level,
            webgl_support: capabilities.webgl_support,
            webgl2_support: capabilities.webgl2_support,
            touch_support: capabilities.touch_support,
        }
    }
}
