use catalog::{Difficulty, ExperimentDescriptor, Family, PerformanceLevel};
use labconfig::MemoryPolicy;
use serde::Serialize;

/// Derived, cacheable facts about one experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentMetadata {
    pub id: String,
    #[serde(rename = "requiresWebGL")]
    pub requires_webgl: bool,
    #[serde(rename = "requiresWebGL2")]
    pub requires_webgl2: bool,
    pub estimated_memory_usage: u32,
    #[serde(rename = "targetFPS")]
    pub target_fps: u32,
}

impl ExperimentMetadata {
    pub fn derive(experiment: &ExperimentDescriptor, policy: &MemoryPolicy) -> Self {
        Self {
            id: experiment.id().to_string(),
            requires_webgl: experiment.requires_webgl(),
            requires_webgl2: experiment.requires_webgl2(),
            estimated_memory_usage: estimate_memory(experiment, policy),
            target_fps: target_fps(experiment.performance()),
        }
    }
}

pub fn target_fps(level: PerformanceLevel) -> u32 {
    match level {
        PerformanceLevel::Low => 30,
        PerformanceLevel::Medium => 45,
        PerformanceLevel::High => 60,
    }
}

/// Relative memory estimate: a per-family base, scaled for advanced
/// experiments and again for shader/3d work.
pub fn estimate_memory(experiment: &ExperimentDescriptor, policy: &MemoryPolicy) -> u32 {
    let base = match experiment.family() {
        Family::Design => policy.design_base,
        Family::WebGl => policy.webgl_base,
    };
    let mut estimate = f64::from(base);
    if experiment.difficulty() == Difficulty::Advanced {
        estimate *= f64::from(policy.advanced_scale);
    }
    if experiment.category().is_gpu_heavy() {
        estimate *= f64::from(policy.gpu_heavy_scale);
    }
    // A validated policy keeps every estimate within u32.
    estimate.round().min(f64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Category, ExperimentRegistry};

    #[test]
    fn frame_rate_follows_declared_level() {
        assert_eq!(target_fps(PerformanceLevel::Low), 30);
        assert_eq!(target_fps(PerformanceLevel::Medium), 45);
        assert_eq!(target_fps(PerformanceLevel::High), 60);
    }

    #[test]
    fn default_policy_estimates() {
        let policy = MemoryPolicy::default();
        let estimate = |category, difficulty| {
            estimate_memory(
                &ExperimentDescriptor::new("x", "X", category, difficulty, PerformanceLevel::Low),
                &policy,
            )
        };
        assert_eq!(estimate(Category::Css, Difficulty::Beginner), 64);
        assert_eq!(estimate(Category::Canvas, Difficulty::Advanced), 128);
        assert_eq!(estimate(Category::Particle, Difficulty::Intermediate), 128);
        assert_eq!(estimate(Category::Shader, Difficulty::Beginner), 192);
        assert_eq!(estimate(Category::ThreeD, Difficulty::Advanced), 384);
    }

    #[test]
    fn large_bases_keep_families_apart() {
        let policy = MemoryPolicy {
            design_base: 1_000_000_000,
            webgl_base: 1_000_000_001,
            advanced_scale: 2.0,
            gpu_heavy_scale: 2.0,
        };
        let estimate = |category, difficulty| {
            estimate_memory(
                &ExperimentDescriptor::new("x", "X", category, difficulty, PerformanceLevel::Low),
                &policy,
            )
        };
        assert_eq!(
            estimate(Category::Canvas, Difficulty::Advanced),
            2_000_000_000
        );
        assert_eq!(
            estimate(Category::Effect, Difficulty::Advanced),
            2_000_000_002
        );
        assert_eq!(
            estimate(Category::ThreeD, Difficulty::Advanced),
            4_000_000_004
        );
    }

    #[test]
    fn webgl_always_costs_more_than_design_at_equal_difficulty() {
        let policy = MemoryPolicy::default();
        let registry = ExperimentRegistry::builtin();
        for difficulty in Difficulty::ALL {
            let max_design = Category::ALL
                .into_iter()
                .filter(|category| category.family() == Family::Design)
                .map(|category| {
                    let probe = ExperimentDescriptor::new(
                        "d",
                        "D",
                        category,
                        difficulty,
                        PerformanceLevel::High,
                    );
                    estimate_memory(&probe, &policy)
                })
                .max()
                .unwrap();
            let min_webgl = Category::ALL
                .into_iter()
                .filter(|category| category.family() == Family::WebGl)
                .map(|category| {
                    let probe = ExperimentDescriptor::new(
                        "w",
                        "W",
                        category,
                        difficulty,
                        PerformanceLevel::Low,
                    );
                    estimate_memory(&probe, &policy)
                })
                .min()
                .unwrap();
            assert!(min_webgl > max_design, "{difficulty}: {min_webgl} <= {max_design}");
        }

        for experiment in registry.experiments() {
            let metadata = ExperimentMetadata::derive(experiment, &policy);
            assert!(!metadata.requires_webgl2 || metadata.requires_webgl);
            assert!([30, 45, 60].contains(&metadata.target_fps));
        }
    }
}
