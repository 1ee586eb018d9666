//! TOML schema for catalogs supplied from disk instead of the built-in lists.
//! A manifest keeps the two families in separate tables so their order stays
//! observable, and `validate` reports every problem it finds rather than
//! stopping at the first one.
//!
//! Types:
//!
//! - `CatalogManifest` holds the `[[design]]` and `[[webgl]]` entry tables.
//! - `ManifestEntry` is one experiment as written by an author; the WebGL
//!   requirement flags are not part of it because the descriptor derives them.
//!
//! Functions:
//!
//! - `CatalogManifest::validate` returns human-readable issues.
//! - `CatalogManifest::into_families` converts entries into descriptors,
//!   preserving source order within each family.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::descriptor::{
    Category, Difficulty, ExperimentDescriptor, Family, PerformanceLevel, RenderEntry,
};

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct CatalogManifest {
    #[serde(default)]
    pub design: Vec<ManifestEntry>,
    #[serde(default)]
    pub webgl: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ManifestEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Vec<String>,
    pub category: Category,
    pub difficulty: Difficulty,
    pub performance: PerformanceLevel,
    #[serde(default)]
    pub webgl2: bool,
    #[serde(default)]
    pub entry: Option<String>,
}

impl ManifestEntry {
    fn into_descriptor(self) -> ExperimentDescriptor {
        let mut descriptor = ExperimentDescriptor::new(
            self.id,
            self.title,
            self.category,
            self.difficulty,
            self.performance,
        )
        .with_description(self.description)
        .with_technology(self.technology);
        if let Some(entry) = self.entry {
            descriptor = descriptor.with_render_entry(RenderEntry::new(entry));
        }
        if self.webgl2 {
            descriptor = descriptor.with_webgl2();
        }
        descriptor
    }
}

impl CatalogManifest {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.design.is_empty() && self.webgl.is_empty() {
            issues.push("catalog must declare at least one experiment".to_string());
        }

        let mut seen = HashSet::new();
        let tables = [(Family::Design, &self.design), (Family::WebGl, &self.webgl)];
        for (family, entries) in tables {
            for entry in entries {
                if entry.id.trim().is_empty() {
                    issues.push(format!("{family} table contains an entry with empty id"));
                    continue;
                }
                if !seen.insert(entry.id.as_str()) {
                    issues.push(format!("experiment id '{}' is declared twice", entry.id));
                }
                if entry.category.family() != family {
                    issues.push(format!(
                        "experiment '{}' has category '{}' which belongs to the {} family, not {}",
                        entry.id,
                        entry.category,
                        entry.category.family(),
                        family
                    ));
                }
                if entry.webgl2 && family == Family::Design {
                    issues.push(format!(
                        "experiment '{}' requests webgl2 but is a design experiment",
                        entry.id
                    ));
                }
            }
        }
        issues
    }

    pub fn into_families(self) -> (Vec<ExperimentDescriptor>, Vec<ExperimentDescriptor>) {
        let design = self
            .design
            .into_iter()
            .map(ManifestEntry::into_descriptor)
            .collect();
        let webgl = self
            .webgl
            .into_iter()
            .map(ManifestEntry::into_descriptor)
            .collect();
        (design, webgl)
    }
}
