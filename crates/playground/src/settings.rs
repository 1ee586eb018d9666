use std::fmt;
use std::str::FromStr;

use catalog::{ExperimentDescriptor, Family, PerformanceLevel};
use labconfig::RecommendPolicy;
use serde::{Deserialize, Serialize};

use crate::capabilities::DeviceCapabilities;
use crate::metadata::ExperimentMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Low,
    Medium,
    High,
}

impl QualityLevel {
    /// Quality tier that goes with a frame rate target.
    pub fn for_fps(fps: u32) -> Self {
        match fps {
            0..=30 => QualityLevel::Low,
            31..=45 => QualityLevel::Medium,
            _ => QualityLevel::High,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLevel::Low => "low",
            QualityLevel::Medium => "medium",
            QualityLevel::High => "high",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "low" => Ok(QualityLevel::Low),
            "medium" => Ok(QualityLevel::Medium),
            "high" => Ok(QualityLevel::High),
            other => Err(format!("invalid quality level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSettings {
    #[serde(rename = "targetFPS")]
    pub target_fps: u32,
    pub quality_level: QualityLevel,
    pub enable_optimizations: bool,
}

/// Soft operating point for an experiment on a device. Unlike the
/// compatibility gate this never refuses; it only lowers the frame rate and
/// quality. WebGL experiments always run with optimizations on.
pub fn recommend_settings(
    experiment: &ExperimentDescriptor,
    metadata: &ExperimentMetadata,
    capabilities: &DeviceCapabilities,
    policy: &RecommendPolicy,
) -> PerformanceSettings {
    let mobile = capabilities.touch_support
        && capabilities.device_pixel_ratio >= policy.high_dpr_threshold;
    let constrained = capabilities.performance_level == PerformanceLevel::Low
        || mobile
        || capabilities.hardware_concurrency <= policy.low_core_threshold;

    let target_fps = if constrained {
        metadata.target_fps.min(policy.clamped_fps)
    } else {
        metadata.target_fps
    };

    PerformanceSettings {
        target_fps,
        quality_level: QualityLevel::for_fps(target_fps),
        enable_optimizations: constrained || experiment.family() == Family::WebGl,
    }
}
