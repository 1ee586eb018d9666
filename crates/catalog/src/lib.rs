mod builtin;
mod descriptor;
mod manifest;
mod registry;

pub use builtin::{design_family, webgl_family};
pub use descriptor::{
    Category, Difficulty, ExperimentDescriptor, Family, PerformanceLevel, RenderEntry,
};
pub use manifest::{CatalogManifest, ManifestEntry};
pub use registry::{ExperimentRegistry, RegistryError};
