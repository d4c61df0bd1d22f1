//! Tier 1: direct skill matching.
//!
//! Candidate names are tried longest-first so that when both `terraform`
//! and `terraform-base` exist and the query names the longer one, the longer
//! one wins. The exact pass runs before the pattern pass; an exact hit is
//! never downgraded to a pattern hit.

use super::normalize;
use super::patterns::PatternSet;
use super::MatchSkills;
use crate::catalog::Skill;
use std::collections::BTreeMap;

const EXACT_CONFIDENCE: f64 = 1.0;
const PATTERN_CONFIDENCE: f64 = 0.9;

/// How a Tier 1 match was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The skill name itself appears in the query.
    Exact,
    /// A request pattern like "use {skill}" appears in the query.
    Pattern,
}

/// A successful Tier 1 match.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectMatch {
    pub skill: String,
    pub kind: MatchKind,
    pub confidence: f64,
}

/// Matches queries that name a catalog skill directly.
#[derive(Debug, Clone, Default)]
pub struct DirectMatcher {
    patterns: PatternSet,
}

impl DirectMatcher {
    pub fn new(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    fn candidates<'a>(skills: &'a BTreeMap<String, Skill>) -> Vec<&'a str> {
        let mut names: Vec<&str> = skills.keys().map(String::as_str).collect();
        // Longest first; BTreeMap iteration keeps equal lengths in name order.
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        names
    }
}

impl MatchSkills for DirectMatcher {
    fn match_skills(&self, query: &str, skills: &BTreeMap<String, Skill>) -> Option<DirectMatch> {
        if query.is_empty() || skills.is_empty() {
            return None;
        }

        let names = Self::candidates(skills);

        for name in &names {
            if query.contains(&name.to_lowercase()) {
                return Some(DirectMatch {
                    skill: name.to_string(),
                    kind: MatchKind::Exact,
                    confidence: EXACT_CONFIDENCE,
                });
            }
        }

        for name in &names {
            for expansion in self.patterns.expand(name) {
                if query.contains(&normalize(&expansion)) {
                    return Some(DirectMatch {
                        skill: name.to_string(),
                        kind: MatchKind::Pattern,
                        confidence: PATTERN_CONFIDENCE,
                    });
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(names: &[&str]) -> BTreeMap<String, Skill> {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    Skill {
                        name: name.to_string(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    fn matcher() -> DirectMatcher {
        DirectMatcher::default()
    }

    #[test]
    fn test_exact_match_anywhere_in_query() {
        let skills = skills(&["terraform-base"]);
        let hit = matcher()
            .match_skills("use terraform-base for this project", &skills)
            .unwrap();
        assert_eq!(hit.skill, "terraform-base");
        assert_eq!(hit.kind, MatchKind::Exact);
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_longer_name_wins_over_prefix() {
        let skills = skills(&["terraform", "terraform-base"]);
        let hit = matcher()
            .match_skills("set up terraform-base now", &skills)
            .unwrap();
        assert_eq!(hit.skill, "terraform-base");
    }

    #[test]
    fn test_shorter_name_still_matches_alone() {
        let skills = skills(&["terraform", "terraform-base"]);
        let hit = matcher().match_skills("i need terraform here", &skills).unwrap();
        assert_eq!(hit.skill, "terraform");
    }

    #[test]
    fn test_case_insensitive_via_normalized_query() {
        let skills = skills(&["ecr-setup"]);
        let query = normalize("Apply ECR-Setup");
        let hit = matcher().match_skills(&query, &skills).unwrap();
        assert_eq!(hit.skill, "ecr-setup");
    }

    #[test]
    fn test_exact_pass_claims_pattern_phrasings() {
        // "docker skill" satisfies the "{skill} skill" template, but the bare
        // name is a substring too, so the exact pass reports it first.
        let skills = skills(&["docker"]);
        let hit = matcher().match_skills("docker skill", &skills).unwrap();
        assert_eq!(hit.kind, MatchKind::Exact);
        assert_eq!(hit.confidence, 1.0);
    }

    #[test]
    fn test_no_match() {
        let skills = skills(&["terraform-base"]);
        assert!(matcher().match_skills("make me a sandwich", &skills).is_none());
    }

    #[test]
    fn test_empty_query_or_catalog() {
        assert!(matcher().match_skills("", &skills(&["a"])).is_none());
        assert!(matcher().match_skills("anything", &skills(&[])).is_none());
    }

    #[test]
    fn test_custom_pattern_registry() {
        let custom = DirectMatcher::new(PatternSet::new(vec!["summon {skill}".to_string()]));
        let skill_map = skills(&["kraken"]);
        let hit = custom.match_skills("please summon kraken", &skill_map).unwrap();
        assert_eq!(hit.skill, "kraken");
        assert_eq!(hit.kind, MatchKind::Exact);

        // A query that only satisfies the custom pattern, not the bare name.
        let skill_map2 = skills(&["release-notes"]);
        let custom2 = DirectMatcher::new(PatternSet::new(vec!["draft {skill}".to_string()]));
        assert!(custom2.match_skills("draft something else", &skill_map2).is_none());
    }
}
