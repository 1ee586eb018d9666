use catalog::ExperimentDescriptor;
use serde::{Serialize, Serializer};

use crate::capabilities::DeviceCapabilities;
use crate::metadata::ExperimentMetadata;

/// The single blocker reported for an incompatible experiment. Display text is
/// what the presentation layer shows to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Incompatibility {
    #[error("Experiment not found")]
    NotFound,
    #[error("WebGL not supported")]
    WebGlUnsupported,
    #[error("WebGL2 not supported")]
    WebGl2Unsupported,
    #[error("Insufficient memory")]
    InsufficientMemory,
    #[error("Device performance too low")]
    PerformanceTooLow,
}

impl Serialize for Incompatibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompatibilityResult {
    pub compatible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Incompatibility>,
}

impl CompatibilityResult {
    pub fn compatible() -> Self {
        Self {
            compatible: true,
            reason: None,
        }
    }

    pub fn incompatible(reason: Incompatibility) -> Self {
        Self {
            compatible: false,
            reason: Some(reason),
        }
    }
}

/// Runs the checks in fixed priority order and reports the first failure:
/// WebGL, WebGL2, memory, then performance tier.
pub fn check_compatibility(
    experiment: &ExperimentDescriptor,
    metadata: &ExperimentMetadata,
    capabilities: &DeviceCapabilities,
) -> CompatibilityResult {
    if experiment.requires_webgl() && !capabilities.webgl_support {
        return CompatibilityResult::incompatible(Incompatibility::WebGlUnsupported);
    }
    if experiment.requires_webgl2() && !capabilities.webgl2_support {
        return CompatibilityResult::incompatible(Incompatibility::WebGl2Unsupported);
    }
    if metadata.estimated_memory_usage > capabilities.memory_limit {
        return CompatibilityResult::incompatible(Incompatibility::InsufficientMemory);
    }
    if experiment.performance() > capabilities.performance_level {
        return CompatibilityResult::incompatible(Incompatibility::PerformanceTooLow);
    }
    CompatibilityResult::compatible()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Category, Difficulty, PerformanceLevel};
    use labconfig::MemoryPolicy;

    fn check(experiment: &ExperimentDescriptor, caps: &DeviceCapabilities) -> CompatibilityResult {
        let metadata = ExperimentMetadata::derive(experiment, &MemoryPolicy::default());
        check_compatibility(experiment, &metadata, caps)
    }

    fn heavy_shader() -> ExperimentDescriptor {
        ExperimentDescriptor::new(
            "heavy",
            "Heavy",
            Category::Shader,
            Difficulty::Advanced,
            PerformanceLevel::High,
        )
    }

    #[test]
    fn webgl_failure_outranks_memory_failure() {
        let caps = DeviceCapabilities {
            webgl_support: false,
            webgl2_support: false,
            memory_limit: 1,
            performance_level: PerformanceLevel::Low,
            ..DeviceCapabilities::default()
        };
        assert_eq!(
            check(&heavy_shader(), &caps),
            CompatibilityResult::incompatible(Incompatibility::WebGlUnsupported)
        );
    }

    #[test]
    fn webgl2_checked_before_memory() {
        let caps = DeviceCapabilities {
            webgl2_support: false,
            memory_limit: 1,
            ..DeviceCapabilities::default()
        };
        assert_eq!(
            check(&heavy_shader(), &caps).reason,
            Some(Incompatibility::WebGl2Unsupported)
        );
    }

    #[test]
    fn memory_checked_before_performance() {
        let caps = DeviceCapabilities {
            memory_limit: 100,
            performance_level: PerformanceLevel::Low,
            ..DeviceCapabilities::default()
        };
        assert_eq!(
            check(&heavy_shader(), &caps).reason,
            Some(Incompatibility::InsufficientMemory)
        );
    }

    #[test]
    fn performance_tier_is_last() {
        let caps = DeviceCapabilities {
            performance_level: PerformanceLevel::Medium,
            ..DeviceCapabilities::default()
        };
        let result = check(&heavy_shader(), &caps);
        assert!(!result.compatible);
        assert_eq!(
            result.reason.map(|reason| reason.to_string()).as_deref(),
            Some("Device performance too low")
        );
    }

    #[test]
    fn design_experiment_ignores_missing_webgl() {
        let sketch = ExperimentDescriptor::new(
            "sketch",
            "Sketch",
            Category::Canvas,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        );
        let caps = DeviceCapabilities {
            webgl_support: false,
            webgl2_support: false,
            performance_level: PerformanceLevel::Low,
            ..DeviceCapabilities::default()
        };
        assert_eq!(check(&sketch, &caps), CompatibilityResult::compatible());
    }

    #[test]
    fn serializes_reason_as_message() {
        let json = serde_json::to_string(&CompatibilityResult::incompatible(
            Incompatibility::InsufficientMemory,
        ))
        .unwrap();
        assert_eq!(json, r#"{"compatible":false,"reason":"Insufficient memory"}"#);
        let ok = serde_json::to_string(&CompatibilityResult::compatible()).unwrap();
        assert_eq!(ok, r#"{"compatible":true}"#);
    }
}
