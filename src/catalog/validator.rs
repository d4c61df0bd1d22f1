//! Cross-reference validation for a parsed catalog.
//!
//! Collects every unresolved reference instead of failing fast, so one load
//! attempt reports the whole repair list. Dependency cycles are deliberately
//! not checked here; they surface at resolution time with a warning so the
//! router stays useful against a degraded catalog.

use super::Catalog;

/// Check every name reference in the catalog. Returns all offenders.
pub fn validate(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, skill) in &catalog.skills {
        for dep in &skill.depends_on {
            if !catalog.has_skill(dep) {
                errors.push(format!(
                    "skill '{}' depends on unknown skill '{}'",
                    name, dep
                ));
            }
        }
    }

    for (name, task) in &catalog.tasks {
        for skill_ref in &task.skills {
            if !catalog.has_skill(skill_ref) {
                errors.push(format!(
                    "task '{}' references unknown skill '{}'",
                    name, skill_ref
                ));
            }
        }
    }

    for (name, category) in &catalog.categories {
        for task_ref in &category.tasks {
            if !catalog.has_task(task_ref) {
                errors.push(format!(
                    "category '{}' references unknown task '{}'",
                    name, task_ref
                ));
            }
        }
        for skill_ref in &category.skills {
            if !catalog.has_skill(skill_ref) {
                errors.push(format!(
                    "category '{}' references unknown skill '{}'",
                    name, skill_ref
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, Skill, Task};

    fn catalog_with(
        skills: &[(&str, &[&str])],
        tasks: &[(&str, &[&str])],
        categories: &[(&str, &[&str], &[&str])],
    ) -> Catalog {
        let mut catalog = Catalog::default();
        for (name, deps) in skills {
            catalog.skills.insert(
                name.to_string(),
                Skill {
                    name: name.to_string(),
                    depends_on: deps.iter().map(|d| d.to_string()).collect(),
                    ..Default::default()
                },
            );
        }
        for (name, task_skills) in tasks {
            catalog.tasks.insert(
                name.to_string(),
                Task {
                    name: name.to_string(),
                    skills: task_skills.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                },
            );
        }
        for (name, cat_tasks, cat_skills) in categories {
            catalog.categories.insert(
                name.to_string(),
                Category {
                    name: name.to_string(),
                    tasks: cat_tasks.iter().map(|t| t.to_string()).collect(),
                    skills: cat_skills.iter().map(|s| s.to_string()).collect(),
                    ..Default::default()
                },
            );
        }
        catalog
    }

    #[test]
    fn test_valid_catalog_has_no_errors() {
        let catalog = catalog_with(
            &[("a", &[]), ("b", &["a"])],
            &[("t", &["a", "b"])],
            &[("c", &["t"], &["a"])],
        );
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_unknown_skill_dependency() {
        let catalog = catalog_with(&[("a", &["ghost"])], &[], &[]);
        let errors = validate(&catalog);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("skill 'a'"));
        assert!(errors[0].contains("'ghost'"));
    }

    #[test]
    fn test_unknown_task_skill_reference() {
        let catalog = catalog_with(&[("a", &[])], &[("t", &["a", "ghost"])], &[]);
        let errors = validate(&catalog);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("task 't'"));
    }

    #[test]
    fn test_unknown_category_references() {
        let catalog = catalog_with(&[("a", &[])], &[], &[("c", &["ghost-task"], &["ghost-skill"])]);
        let errors = validate(&catalog);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_all_offenders_collected_not_fail_fast() {
        let catalog = catalog_with(
            &[("a", &["x", "y"])],
            &[("t", &["z"])],
            &[("c", &[], &["w"])],
        );
        assert_eq!(validate(&catalog).len(), 4);
    }

    #[test]
    fn test_cycles_are_not_a_validation_concern() {
        let catalog = catalog_with(&[("a", &["b"]), ("b", &["a"])], &[], &[]);
        assert!(validate(&catalog).is_empty());
    }
}
