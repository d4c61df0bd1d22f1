//! Deterministic lexical matching: Tiers 1 and 2 of the routing pipeline.
//!
//! Nothing here performs I/O; both tiers are pure functions over the catalog
//! snapshot and complete without suspension.

mod direct;
mod normalize;
mod patterns;
mod triggers;

pub use direct::{DirectMatch, DirectMatcher, MatchKind};
pub use normalize::normalize;
pub use patterns::{PatternSet, DEFAULT_PATTERNS};
pub use triggers::{coverage, tokenize, TriggerMatch, TriggerMatcher, DEFAULT_TRIGGER_THRESHOLD};

use crate::catalog::{Skill, Task};
use std::collections::BTreeMap;

/// Tier 1 seam: recognize an explicit skill name or request pattern.
pub trait MatchSkills: Send + Sync {
    fn match_skills(&self, query: &str, skills: &BTreeMap<String, Skill>) -> Option<DirectMatch>;
}

/// Tier 2 seam: score the query against task trigger phrases.
pub trait MatchTasks: Send + Sync {
    fn match_tasks(&self, query: &str, tasks: &BTreeMap<String, Task>) -> Option<TriggerMatch>;
}
