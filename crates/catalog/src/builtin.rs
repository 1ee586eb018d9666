use crate::descriptor::{Category, Difficulty, ExperimentDescriptor, PerformanceLevel};

/// DOM and 2D canvas experiments, in display order.
pub fn design_family() -> Vec<ExperimentDescriptor> {
    vec![
        ExperimentDescriptor::new(
            "design-1",
            "Gradient Drift",
            Category::Css,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        )
        .with_description("Layered conic gradients that slowly rotate and blend")
        .with_technology(["CSS", "Custom Properties"]),
        ExperimentDescriptor::new(
            "design-2",
            "Flow Field Sketch",
            Category::Canvas,
            Difficulty::Intermediate,
            PerformanceLevel::Medium,
        )
        .with_description("Thousands of strokes following a Perlin noise flow field")
        .with_technology(["Canvas 2D", "TypeScript"]),
        ExperimentDescriptor::new(
            "design-3",
            "Morphing Blobs",
            Category::Svg,
            Difficulty::Intermediate,
            PerformanceLevel::Medium,
        )
        .with_description("Organic SVG paths interpolated between random shapes")
        .with_technology(["SVG", "Path Interpolation"]),
        ExperimentDescriptor::new(
            "design-4",
            "Kinetic Typography",
            Category::Animation,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        )
        .with_description("Letters that react to the cursor with spring physics")
        .with_technology(["Web Animations API", "CSS"]),
        ExperimentDescriptor::new(
            "design-5",
            "Generative Grid",
            Category::Canvas,
            Difficulty::Advanced,
            PerformanceLevel::High,
        )
        .with_description("Recursive tile subdivision redrawn every frame")
        .with_technology(["Canvas 2D", "OffscreenCanvas"]),
        ExperimentDescriptor::new(
            "design-6",
            "Glass Cards",
            Category::Css,
            Difficulty::Intermediate,
            PerformanceLevel::Low,
        )
        .with_description("Frosted glass panels with parallax tilt")
        .with_technology(["CSS", "backdrop-filter"]),
    ]
}

/// GPU experiments, in display order.
pub fn webgl_family() -> Vec<ExperimentDescriptor> {
    vec![
        ExperimentDescriptor::new(
            "webgl-1",
            "Orbiting Lights",
            Category::ThreeD,
            Difficulty::Intermediate,
            PerformanceLevel::Medium,
        )
        .with_description("Point lights circling a reflective torus knot")
        .with_technology(["Three.js", "WebGL"]),
        ExperimentDescriptor::new(
            "webgl-2",
            "Raymarched Terrain",
            Category::Shader,
            Difficulty::Advanced,
            PerformanceLevel::High,
        )
        .with_description("Signed distance field terrain with soft shadows")
        .with_technology(["GLSL", "WebGL2"]),
        ExperimentDescriptor::new(
            "webgl-3",
            "Galaxy Particles",
            Category::Particle,
            Difficulty::Advanced,
            PerformanceLevel::High,
        )
        .with_description("A hundred thousand GPU particles forming a spiral galaxy")
        .with_technology(["Three.js", "BufferGeometry"]),
        ExperimentDescriptor::new(
            "webgl-4",
            "Bloom Post-Process",
            Category::Effect,
            Difficulty::Intermediate,
            PerformanceLevel::Medium,
        )
        .with_description("Emissive scene passed through a multi-pass bloom chain")
        .with_technology(["Three.js", "EffectComposer"]),
        ExperimentDescriptor::new(
            "webgl-5",
            "Plasma Shader",
            Category::Shader,
            Difficulty::Beginner,
            PerformanceLevel::Low,
        )
        .with_description("Classic sine plasma written as a single fragment shader")
        .with_technology(["GLSL", "WebGL"]),
        ExperimentDescriptor::new(
            "webgl-6",
            "Instanced City",
            Category::ThreeD,
            Difficulty::Advanced,
            PerformanceLevel::High,
        )
        .with_description("Procedural skyline drawn with instanced geometry")
        .with_technology(["Three.js", "InstancedMesh", "WebGL2"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Family;

    #[test]
    fn families_only_hold_their_own_categories() {
        assert!(design_family()
            .iter()
            .all(|experiment| experiment.family() == Family::Design));
        assert!(webgl_family()
            .iter()
            .all(|experiment| experiment.family() == Family::WebGl));
    }

    #[test]
    fn advanced_gpu_heavy_entries_need_webgl2() {
        let webgl2: Vec<_> = webgl_family()
            .into_iter()
            .filter(|experiment| experiment.requires_webgl2())
            .map(|experiment| experiment.id().to_string())
            .collect();
        assert_eq!(webgl2, ["webgl-2", "webgl-6"]);
    }
}
