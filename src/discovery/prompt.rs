//! Prompt construction for LLM discovery.
//!
//! The prompt carries the user's original (un-normalized) request, every
//! task and every skill in the catalog, instructions distinguishing the two
//! levels, and the JSON response shape.

use crate::catalog::{Skill, Task};
use crate::error::DiscoveryError;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Build the discovery prompt. Fails with `InvalidInput` when the request
/// is blank or the catalog has no skills to offer.
pub fn build_prompt(
    request: &str,
    tasks: &BTreeMap<String, Task>,
    skills: &BTreeMap<String, Skill>,
    max_results: usize,
) -> Result<String, DiscoveryError> {
    if request.trim().is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "request cannot be empty".to_string(),
        ));
    }
    if skills.is_empty() {
        return Err(DiscoveryError::InvalidInput(
            "catalog has no skills to match against".to_string(),
        ));
    }

    let tasks_section = if tasks.is_empty() {
        "(no tasks defined)".to_string()
    } else {
        listing(tasks.values().map(|t| (t.name.as_str(), t.description.as_str())))
    };
    let skills_section = listing(skills.values().map(|s| (s.name.as_str(), s.description.as_str())));

    Ok(format!(
        r#"You are a skill router for a development automation system. Analyze the user's request and select the most appropriate task or skill.

## User Request
{request}

## Available Tasks (High-Level)
Tasks are high-level workflows that map to multiple skills:
{tasks_section}

## Available Skills (Low-Level)
Skills are direct, specific capabilities:
{skills_section}

## Instructions
- Choose a **TASK** if the request is a high-level goal (e.g. "build a portal", "create an app")
- Choose a **SKILL** if the request is specific infrastructure (e.g. "set up PostgreSQL")
- Return up to {max_results} matches, ranked by confidence

## Output Format
Respond with JSON only:
{{"type": "task" or "skill", "name": "the-name", "confidence": 0.0-1.0, "reasoning": "why this matches"}}

Or for multiple matches (array sorted by confidence descending):
[
  {{"type": "task", "name": "...", "confidence": 0.9, "reasoning": "..."}},
  {{"type": "skill", "name": "...", "confidence": 0.7, "reasoning": "..."}}
]"#
    ))
}

fn listing<'a>(entries: impl Iterator<Item = (&'a str, &'a str)>) -> String {
    let mut out = String::new();
    for (name, description) in entries {
        let _ = writeln!(out, "- **{}**: {}", name, description);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, description: &str) -> (String, Skill) {
        (
            name.to_string(),
            Skill {
                name: name.to_string(),
                description: description.to_string(),
                ..Default::default()
            },
        )
    }

    fn task(name: &str, description: &str) -> (String, Task) {
        (
            name.to_string(),
            Task {
                name: name.to_string(),
                description: description.to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_prompt_includes_every_task_and_skill() {
        let tasks: BTreeMap<String, Task> = [
            task("static-website", "Static site with CI/CD"),
            task("rest-api", "HTTP API backend"),
        ]
        .into_iter()
        .collect();
        let skills: BTreeMap<String, Skill> = [
            skill("terraform-base", "Base terraform layout"),
            skill("ecr-setup", "Container registries"),
        ]
        .into_iter()
        .collect();

        let prompt = build_prompt("build me a thing", &tasks, &skills, 3).unwrap();
        for name in ["static-website", "rest-api", "terraform-base", "ecr-setup"] {
            assert!(prompt.contains(name), "prompt must list '{}'", name);
        }
        assert!(prompt.contains("build me a thing"));
        assert!(prompt.contains("up to 3 matches"));
    }

    #[test]
    fn test_empty_request_is_invalid() {
        let skills: BTreeMap<String, Skill> = [skill("a", "desc")].into_iter().collect();
        let err = build_prompt("   ", &BTreeMap::new(), &skills, 1).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_skill_listing_is_invalid() {
        let err = build_prompt("query", &BTreeMap::new(), &BTreeMap::new(), 1).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput(_)));
    }

    #[test]
    fn test_no_tasks_placeholder() {
        let skills: BTreeMap<String, Skill> = [skill("a", "desc")].into_iter().collect();
        let prompt = build_prompt("query", &BTreeMap::new(), &skills, 1).unwrap();
        assert!(prompt.contains("(no tasks defined)"));
    }
}
