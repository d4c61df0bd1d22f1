//! The skill catalog: a cross-referenced graph of skills, tasks, and categories.
//!
//! The catalog is loaded once from a YAML manifest, validated in full, and
//! immutable afterwards. Reloads produce a fresh snapshot that readers swap
//! in atomically; a half-loaded catalog is never observable.

mod loader;
mod validator;

pub use loader::{load, load_from_str};
pub use validator::validate;

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// A named, documentation-backed capability unit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Skill {
    /// Filled from the manifest map key after parsing.
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Relative location of the skill's documentation directory.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub depends_on: Vec<String>,
}

/// A user-intent-labeled bundle of skills, activated by trigger phrases.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// A documentation-only grouping of tasks and skills. Never routes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Category {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

/// The validated in-memory catalog.
///
/// Maps are name-indexed `BTreeMap`s so every iteration order in the crate
/// is deterministic (matcher tie-breaks, prompt listings, cycle reports).
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub skills: BTreeMap<String, Skill>,
    pub tasks: BTreeMap<String, Task>,
    pub categories: BTreeMap<String, Category>,
}

impl Catalog {
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.get(name)
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn has_skill(&self, name: &str) -> bool {
        self.skills.contains_key(name)
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }
}

/// Shared handle to the current catalog snapshot.
///
/// Routing reads a snapshot (`Arc<Catalog>`) and works against it for the
/// whole request; `reload` swaps the snapshot in one write so concurrent
/// readers see either the old or the new catalog, never a mix.
pub struct CatalogHandle {
    path: PathBuf,
    inner: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    /// Load the catalog at `path` and wrap it for shared access.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref().to_path_buf();
        let catalog = load(&path)?;
        Ok(Self {
            path,
            inner: RwLock::new(Arc::new(catalog)),
        })
    }

    /// The snapshot current at the time of the call.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Re-read the catalog file and swap the snapshot. On failure the old
    /// snapshot stays in place and the error is returned to the caller.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let fresh = load(&self.path)?;
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(fresh);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
