//! Owns the canonical, read-only experiment list the playground serves. The
//! registry is assembled once from the design and webgl source lists (built-in
//! or from a TOML manifest) and never mutated afterwards, so callers share it
//! by reference.
//!
//! Types:
//!
//! - `RegistryError` classifies manifest I/O, parsing, validation and identity
//!   failures.
//! - `ExperimentRegistry` stores descriptors in canonical order (design family
//!   first, each family in source order) plus an id index.
//!
//! Functions:
//!
//! - `ExperimentRegistry::builtin` wraps the compiled-in catalog.
//! - `ExperimentRegistry::from_families`, `from_manifest` and `load` build a
//!   registry from caller-supplied lists, rejecting duplicates and entries
//!   filed under the wrong family.
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::builtin::{design_family, webgl_family};
use crate::descriptor::{ExperimentDescriptor, Family};
use crate::manifest::CatalogManifest;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("catalog not found at {0}")]
    ManifestMissing(PathBuf),

    #[error("failed to parse catalog: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("catalog validation failed: {0:?}")]
    ManifestValidation(Vec<String>),

    #[error("experiment id '{0}' is declared more than once")]
    DuplicateId(String),

    #[error("experiment '{id}' was supplied as {expected} but its category belongs to {actual}")]
    FamilyMismatch {
        id: String,
        expected: Family,
        actual: Family,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct ExperimentRegistry {
    experiments: Vec<ExperimentDescriptor>,
    index: HashMap<String, usize>,
}

impl ExperimentRegistry {
    pub fn builtin() -> Self {
        let experiments: Vec<_> = design_family().into_iter().chain(webgl_family()).collect();
        let index = build_index(&experiments);
        debug_assert_eq!(index.len(), experiments.len(), "built-in ids must be unique");
        Self { experiments, index }
    }

    pub fn from_families(
        design: Vec<ExperimentDescriptor>,
        webgl: Vec<ExperimentDescriptor>,
    ) -> Result<Self, RegistryError> {
        for (expected, list) in [(Family::Design, &design), (Family::WebGl, &webgl)] {
            if let Some(stray) = list.iter().find(|item| item.family() != expected) {
                return Err(RegistryError::FamilyMismatch {
                    id: stray.id().to_string(),
                    expected,
                    actual: stray.family(),
                });
            }
        }

        let experiments: Vec<_> = design.into_iter().chain(webgl).collect();
        let index = build_index(&experiments);
        if index.len() != experiments.len() {
            let mut seen = HashSet::new();
            for experiment in &experiments {
                if !seen.insert(experiment.id()) {
                    return Err(RegistryError::DuplicateId(experiment.id().to_string()));
                }
            }
        }

        debug!(
            experiments = experiments.len(),
            "assembled experiment registry"
        );
        Ok(Self { experiments, index })
    }

    pub fn from_manifest(manifest: CatalogManifest) -> Result<Self, RegistryError> {
        let issues = manifest.validate();
        if !issues.is_empty() {
            return Err(RegistryError::ManifestValidation(issues));
        }
        let (design, webgl) = manifest.into_families();
        Self::from_families(design, webgl)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RegistryError::ManifestMissing(path.to_path_buf()));
        }
        debug!(path = %path.display(), "loading experiment catalog");
        let raw = fs::read_to_string(path)?;
        let manifest = CatalogManifest::from_toml_str(&raw)?;
        Self::from_manifest(manifest)
    }

    /// All experiments in canonical order.
    pub fn experiments(&self) -> &[ExperimentDescriptor] {
        &self.experiments
    }

    pub fn get(&self, id: &str) -> Option<&ExperimentDescriptor> {
        self.index.get(id).map(|&position| &self.experiments[position])
    }

    pub fn by_family(&self, family: Family) -> impl Iterator<Item = &ExperimentDescriptor> {
        self.experiments
            .iter()
            .filter(move |experiment| experiment.family() == family)
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

impl Default for ExperimentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn build_index(experiments: &[ExperimentDescriptor]) -> HashMap<String, usize> {
    experiments
        .iter()
        .enumerate()
        .map(|(position, experiment)| (experiment.id().to_string(), position))
        .collect()
}
