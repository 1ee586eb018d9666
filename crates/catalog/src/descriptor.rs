use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// High-level grouping of a category: DOM/2D work versus GPU work.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Design,
    #[serde(rename = "webgl")]
    WebGl,
}

impl Family {
    pub const ALL: [Family; 2] = [Family::Design, Family::WebGl];

    pub fn of(category: Category) -> Self {
        match category {
            Category::Css | Category::Canvas | Category::Svg | Category::Animation => {
                Family::Design
            }
            Category::ThreeD | Category::Shader | Category::Particle | Category::Effect => {
                Family::WebGl
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Family::Design => "design",
            Family::WebGl => "webgl",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "design" => Ok(Family::Design),
            "webgl" => Ok(Family::WebGl),
            other => Err(format!(
                "invalid experiment family '{other}'; expected 'design' or 'webgl'"
            )),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Css,
    Canvas,
    Svg,
    Animation,
    #[serde(rename = "3d")]
    ThreeD,
    Shader,
    Particle,
    Effect,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Css,
        Category::Canvas,
        Category::Svg,
        Category::Animation,
        Category::ThreeD,
        Category::Shader,
        Category::Particle,
        Category::Effect,
    ];

    pub fn family(self) -> Family {
        Family::of(self)
    }

    /// Categories whose advanced variants need WebGL2 and cost extra memory.
    pub fn is_gpu_heavy(self) -> bool {
        matches!(self, Category::ThreeD | Category::Shader)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Css => "css",
            Category::Canvas => "canvas",
            Category::Svg => "svg",
            Category::Animation => "animation",
            Category::ThreeD => "3d",
            Category::Shader => "shader",
            Category::Particle => "particle",
            Category::Effect => "effect",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource tier, used both for what an experiment declares and what a device
/// reports. Ordered `Low < Medium < High`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

impl PerformanceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            PerformanceLevel::Low => "low",
            PerformanceLevel::Medium => "medium",
            PerformanceLevel::High => "high",
        }
    }
}

impl Default for PerformanceLevel {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceLevel {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(PerformanceLevel::Low),
            "medium" => Ok(PerformanceLevel::Medium),
            "high" => Ok(PerformanceLevel::High),
            other => Err(format!(
                "invalid performance level '{other}'; expected low, medium or high"
            )),
        }
    }
}

/// Opaque handle naming the visual implementation of an experiment. The
/// playground never interprets it; the rendering layer resolves it.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RenderEntry(String);

impl RenderEntry {
    pub fn new(entry: impl Into<String>) -> Self {
        Self(entry.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable catalog entry. The WebGL requirement flags are derived from the
/// category and difficulty at construction and cannot drift afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentDescriptor {
    id: String,
    title: String,
    description: String,
    technology: Vec<String>,
    category: Category,
    difficulty: Difficulty,
    #[serde(rename = "performanceLevel")]
    performance: PerformanceLevel,
    #[serde(rename = "requiresWebGL")]
    requires_webgl: bool,
    #[serde(rename = "requiresWebGL2")]
    requires_webgl2: bool,
    render_entry: RenderEntry,
}

impl ExperimentDescriptor {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        difficulty: Difficulty,
        performance: PerformanceLevel,
    ) -> Self {
        let id = id.into();
        let requires_webgl = category.family() == Family::WebGl;
        let requires_webgl2 =
            requires_webgl && difficulty == Difficulty::Advanced && category.is_gpu_heavy();
        let render_entry = RenderEntry::new(format!("{}/{}", category.family(), id));
        Self {
            id,
            title: title.into(),
            description: String::new(),
            technology: Vec::new(),
            category,
            difficulty,
            performance,
            requires_webgl,
            requires_webgl2,
            render_entry,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_technology<I, S>(mut self, technology: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.technology = technology.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_render_entry(mut self, entry: RenderEntry) -> Self {
        self.render_entry = entry;
        self
    }

    /// Opts a WebGL-family experiment into WebGL2. Design-family experiments
    /// never touch the GPU, so the request is ignored for them.
    pub fn with_webgl2(mut self) -> Self {
        self.requires_webgl2 = self.requires_webgl;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn technology(&self) -> &[String] {
        &self.technology
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn family(&self) -> Family {
        self.category.family()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn performance(&self) -> PerformanceLevel {
        self.performance
    }

    pub fn requires_webgl(&self) -> bool {
        self.requires_webgl
    }

    pub fn requires_webgl2(&self) -> bool {
        self.requires_webgl2
    }

    pub fn render_entry(&self) -> &RenderEntry {
        &self.render_entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_category() {
        let design: Vec<_> = Category::ALL
            .iter()
            .filter(|category| category.family() == Family::Design)
            .collect();
        assert_eq!(
            design,
            [
                &Category::Css,
                &Category::Canvas,
                &Category::Svg,
                &Category::Animation
            ]
        );
        assert_eq!(Family::of(Category::ThreeD), Family::WebGl);
        assert_eq!(Family::of(Category::Effect), Family::WebGl);
    }

    #[test]
    fn derives_webgl_requirements() {
        let css = ExperimentDescriptor::new(
            "d",
            "D",
            Category::Css,
            Difficulty::Advanced,
            PerformanceLevel::High,
        );
        assert!(!css.requires_webgl());
        assert!(!css.requires_webgl2());

        let particles = ExperimentDescriptor::new(
            "p",
            "P",
            Category::Particle,
            Difficulty::Advanced,
            PerformanceLevel::High,
        );
        assert!(particles.requires_webgl());
        assert!(!particles.requires_webgl2());

        let shader = ExperimentDescriptor::new(
            "s",
            "S",
            Category::Shader,
            Difficulty::Advanced,
            PerformanceLevel::High,
        );
        assert!(shader.requires_webgl2());
    }

    #[test]
    fn webgl2_opt_in_is_ignored_for_design_family() {
        let svg = ExperimentDescriptor::new(
            "svg",
            "Svg",
            Category::Svg,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        )
        .with_webgl2();
        assert!(!svg.requires_webgl2());

        let effect = ExperimentDescriptor::new(
            "fx",
            "Fx",
            Category::Effect,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        )
        .with_webgl2();
        assert!(effect.requires_webgl());
        assert!(effect.requires_webgl2());
    }

    #[test]
    fn performance_levels_are_ordered() {
        assert!(PerformanceLevel::Low < PerformanceLevel::Medium);
        assert!(PerformanceLevel::Medium < PerformanceLevel::High);
        assert_eq!("HIGH".parse::<PerformanceLevel>(), Ok(PerformanceLevel::High));
        assert!("ultra".parse::<PerformanceLevel>().is_err());
    }

    #[test]
    fn serializes_category_names() {
        assert_eq!(serde_json::to_string(&Category::ThreeD).unwrap(), "\"3d\"");
        assert_eq!(serde_json::to_string(&Family::WebGl).unwrap(), "\"webgl\"");
        assert_eq!(Category::ThreeD.to_string(), "3d");
    }
}
