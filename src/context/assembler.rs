//! `<skill_context>` block assembly.
//!
//! Sections appear in execution order, dependencies first. A skill is
//! `[PRIMARY]` iff its name is in the route result's primary list; for task
//! routes every declared task skill is primary even when another primary
//! depends on it. Error routes assemble to the empty string so the hook can
//! emit nothing rather than a malformed block.

use super::{ContentLoader, SkillRole, SkillSection};
use crate::catalog::Catalog;
use crate::router::{RouteResult, RouteType};
use std::collections::HashSet;

pub struct ContextAssembler<'a> {
    catalog: &'a Catalog,
    loader: &'a ContentLoader,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(catalog: &'a Catalog, loader: &'a ContentLoader) -> Self {
        Self { catalog, loader }
    }

    /// Assemble the injection block for a route result.
    pub fn assemble(&self, route: &RouteResult) -> String {
        if route.route_type == RouteType::Error {
            return String::new();
        }

        if route.execution_order.is_empty() {
            return format!(
                "<skill_context>\nMatched: {} '{}'\nExecution order: (none)\n\n</skill_context>",
                route.route_type, route.matched
            );
        }

        let primary: HashSet<&str> = route.skills.iter().map(String::as_str).collect();

        let mut sections = Vec::with_capacity(route.execution_order.len());
        for name in &route.execution_order {
            let role = if primary.contains(name.as_str()) {
                SkillRole::Primary
            } else {
                SkillRole::Dependency
            };

            let (content, warning) = match self.catalog.skill(name) {
                Some(skill) => self.loader.load(name, &skill.path),
                None => (
                    format!("(Skill '{}' not found in catalog)", name),
                    Some(format!(
                        "skill '{}' appears in execution order but not in the catalog",
                        name
                    )),
                ),
            };
            if let Some(warning) = &warning {
                tracing::warn!("{}", warning);
            }

            sections.push(SkillSection {
                name: name.clone(),
                role,
                content,
                warning,
            });
        }

        let mut lines = vec![
            "<skill_context>".to_string(),
            format!("Matched: {} '{}'", route.route_type, route.matched),
            format!("Execution order: {}", route.execution_order.join(" -> ")),
            String::new(),
        ];

        for section in &sections {
            lines.push(format!("## {} [{}]", section.name, section.role.label()));
            lines.push(section.content.clone());
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }

        lines.push("</skill_context>".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::load_from_str;
    use std::path::Path;

    const MANIFEST: &str = r#"
skills:
  terraform-base:
    description: Base terraform layout
    path: terraform-base
  aws-static-hosting:
    description: S3 hosting
    path: aws-static-hosting
    depends_on: [terraform-base]
  nextjs-standards:
    description: Next.js conventions
    path: nextjs-standards
tasks:
  static-website:
    description: Static site
    triggers: [build a static website]
    skills: [nextjs-standards, aws-static-hosting]
"#;

    fn write_skill(root: &Path, path: &str, body: &str) {
        let dir = root.join(path);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("SKILL.md"), body).unwrap();
    }

    #[test]
    fn test_error_route_assembles_to_empty_string() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());
        let block = ContextAssembler::new(&catalog, &loader).assemble(&RouteResult::no_match());
        assert_eq!(block, "");
    }

    #[test]
    fn test_framing_and_section_headers() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_skill(dir.path(), "terraform-base", "terraform docs");
        let loader = ContentLoader::new(dir.path());

        let route = RouteResult::skill_match(
            "terraform-base".to_string(),
            vec!["terraform-base".to_string()],
        );
        let block = ContextAssembler::new(&catalog, &loader).assemble(&route);

        assert!(block.starts_with("<skill_context>"));
        assert!(block.ends_with("</skill_context>"));
        assert!(block.contains("Matched: skill 'terraform-base'"));
        assert!(block.contains("Execution order: terraform-base"));
        assert!(block.contains("## terraform-base [PRIMARY]"));
        assert!(block.contains("terraform docs"));
    }

    #[test]
    fn test_dependencies_marked_and_ordered() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let route = RouteResult::skill_match(
            "aws-static-hosting".to_string(),
            vec!["terraform-base".to_string(), "aws-static-hosting".to_string()],
        );
        let block = ContextAssembler::new(&catalog, &loader).assemble(&route);

        assert!(block.contains("## terraform-base [DEPENDENCY]"));
        assert!(block.contains("## aws-static-hosting [PRIMARY]"));
        let dep_pos = block.find("## terraform-base").unwrap();
        let primary_pos = block.find("## aws-static-hosting").unwrap();
        assert!(dep_pos < primary_pos, "dependencies come first");
    }

    #[test]
    fn test_task_route_marks_every_declared_skill_primary() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let route = RouteResult::task_match(
            "static-website".to_string(),
            vec!["nextjs-standards".to_string(), "aws-static-hosting".to_string()],
            vec![
                "nextjs-standards".to_string(),
                "terraform-base".to_string(),
                "aws-static-hosting".to_string(),
            ],
        );
        let block = ContextAssembler::new(&catalog, &loader).assemble(&route);

        assert!(block.contains("Matched: task 'static-website'"));
        assert!(block.contains("## nextjs-standards [PRIMARY]"));
        assert!(block.contains("## aws-static-hosting [PRIMARY]"));
        assert!(block.contains("## terraform-base [DEPENDENCY]"));
        assert!(block.contains(
            "Execution order: nextjs-standards -> terraform-base -> aws-static-hosting"
        ));
    }

    #[test]
    fn test_missing_skill_file_gets_placeholder_section() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let route = RouteResult::skill_match(
            "nextjs-standards".to_string(),
            vec!["nextjs-standards".to_string()],
        );
        let block = ContextAssembler::new(&catalog, &loader).assemble(&route);
        assert!(block.contains("(Skill file not found:"));
        assert!(block.contains("## nextjs-standards [PRIMARY]"));
    }

    #[test]
    fn test_empty_execution_order_emits_header_only() {
        let catalog = load_from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let loader = ContentLoader::new(dir.path());

        let mut route = RouteResult::skill_match("terraform-base".to_string(), vec![]);
        route.execution_order.clear();
        let block = ContextAssembler::new(&catalog, &loader).assemble(&route);
        assert!(block.starts_with("<skill_context>"));
        assert!(block.ends_with("</skill_context>"));
        assert!(block.contains("Execution order: (none)"));
        assert!(!block.contains("##"));
    }
}
