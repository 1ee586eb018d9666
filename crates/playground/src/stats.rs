use std::collections::BTreeMap;

use catalog::{Category, Difficulty, ExperimentDescriptor, Family};
use serde::Serialize;

/// Catalog-wide counts. Every difficulty and category appears in the maps,
/// including those with no experiments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_experiments: usize,
    pub design_experiments: usize,
    pub webgl_experiments: usize,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
    pub by_category: BTreeMap<Category, usize>,
    #[serde(rename = "requiresWebGL")]
    pub requires_webgl: usize,
    #[serde(rename = "requiresWebGL2")]
    pub requires_webgl2: usize,
}

impl Statistics {
    pub fn from_experiments(experiments: &[ExperimentDescriptor]) -> Self {
        let mut stats = Self {
            total_experiments: experiments.len(),
            design_experiments: 0,
            webgl_experiments: 0,
            by_difficulty: Difficulty::ALL.into_iter().map(|d| (d, 0)).collect(),
            by_category: Category::ALL.into_iter().map(|c| (c, 0)).collect(),
            requires_webgl: 0,
            requires_webgl2: 0,
        };

        for experiment in experiments {
            match experiment.family() {
                Family::Design => stats.design_experiments += 1,
                Family::WebGl => stats.webgl_experiments += 1,
            }
            *stats
                .by_difficulty
                .entry(experiment.difficulty())
                .or_default() += 1;
            *stats.by_category.entry(experiment.category()).or_default() += 1;
            if experiment.requires_webgl() {
                stats.requires_webgl += 1;
            }
            if experiment.requires_webgl2() {
                stats.requires_webgl2 += 1;
            }
        }
        stats
    }
}
