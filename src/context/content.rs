//! Per-skill documentation loading.
//!
//! Resolves `<skills_root>/<path>/SKILL.md` and reads it. A missing or
//! unreadable file yields a human-readable placeholder plus a warning, so
//! the assembled block stays intelligible in degraded deployments.
//!
//! Successful reads are cached; the cache must be invalidated whenever the
//! catalog snapshot is swapped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub struct ContentLoader {
    skills_root: PathBuf,
    cache: RwLock<HashMap<PathBuf, String>>,
}

impl ContentLoader {
    pub fn new(skills_root: impl Into<PathBuf>) -> Self {
        Self {
            skills_root: skills_root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn skills_root(&self) -> &Path {
        &self.skills_root
    }

    /// Load a skill's documentation. Returns the content and, for degraded
    /// reads, a warning naming the expected path.
    pub fn load(&self, skill_name: &str, skill_path: &str) -> (String, Option<String>) {
        let full_path = self.skills_root.join(skill_path).join("SKILL.md");

        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&full_path)
        {
            return (cached.clone(), None);
        }

        match std::fs::read_to_string(&full_path) {
            Ok(content) => {
                self.cache
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .insert(full_path, content.clone());
                (content, None)
            }
            Err(err) => {
                let placeholder = format!("(Skill file not found: {})", full_path.display());
                let warning = format!(
                    "SKILL.md for '{}' unavailable at {}: {}",
                    skill_name,
                    full_path.display(),
                    err
                );
                (placeholder, Some(warning))
            }
        }
    }

    /// Drop all cached reads. Called on catalog reload.
    pub fn invalidate(&self) {
        self.cache
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, path: &str, body: &str) {
        let dir = root.join(path);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), body).unwrap();
    }

    #[test]
    fn test_load_existing_skill() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "terraform-base", "# Terraform Base\nUse remote state.");

        let loader = ContentLoader::new(dir.path());
        let (content, warning) = loader.load("terraform-base", "terraform-base");
        assert!(content.contains("remote state"));
        assert!(warning.is_none());
    }

    #[test]
    fn test_missing_skill_yields_placeholder_and_warning() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let (content, warning) = loader.load("ghost", "ghost");
        assert!(content.starts_with("(Skill file not found:"));
        assert!(content.contains("ghost"));
        let warning = warning.unwrap();
        assert!(warning.contains("ghost"));
        assert!(warning.contains("SKILL.md"));
    }

    #[test]
    fn test_cache_serves_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "s", "version one");

        let loader = ContentLoader::new(dir.path());
        let (first, _) = loader.load("s", "s");
        assert_eq!(first, "version one");

        write_skill(dir.path(), "s", "version two");
        let (cached, _) = loader.load("s", "s");
        assert_eq!(cached, "version one");

        loader.invalidate();
        let (fresh, _) = loader.load("s", "s");
        assert_eq!(fresh, "version two");
    }

    #[test]
    fn test_failed_reads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let (_, warning) = loader.load("late", "late");
        assert!(warning.is_some());

        write_skill(dir.path(), "late", "arrived");
        let (content, warning) = loader.load("late", "late");
        assert_eq!(content, "arrived");
        assert!(warning.is_none());
    }
}
