//! Tier 2: task trigger matching by word-overlap coverage.
//!
//! Coverage is the fraction of a trigger's tokens present in the query, not
//! Jaccard similarity: extra user verbiage must not penalize a short trigger
//! that the query fully covers.

use super::MatchTasks;
use crate::catalog::Task;
use std::collections::{BTreeMap, BTreeSet};

/// Minimum coverage for a trigger to be considered at all.
pub const DEFAULT_TRIGGER_THRESHOLD: f64 = 0.60;

/// A successful Tier 2 match.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMatch {
    pub task: String,
    /// The trigger phrase that produced the best coverage.
    pub trigger: String,
    pub coverage: f64,
    /// The task's declared skill list, in declaration order.
    pub skills: Vec<String>,
}

/// Whitespace tokens of a lowercased string, as a set.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.to_string())
        .collect()
}

/// |query ∩ trigger| / |trigger|, or 0 for an empty trigger.
pub fn coverage(query_words: &BTreeSet<String>, trigger_words: &BTreeSet<String>) -> f64 {
    if trigger_words.is_empty() {
        return 0.0;
    }
    let overlap = query_words.intersection(trigger_words).count();
    overlap as f64 / trigger_words.len() as f64
}

/// Matches queries against task trigger phrases.
#[derive(Debug, Clone)]
pub struct TriggerMatcher {
    threshold: f64,
}

impl Default for TriggerMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_THRESHOLD)
    }
}

impl TriggerMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl MatchTasks for TriggerMatcher {
    fn match_tasks(&self, query: &str, tasks: &BTreeMap<String, Task>) -> Option<TriggerMatch> {
        if query.is_empty() || tasks.is_empty() {
            return None;
        }

        let query_words = tokenize(query);
        if query_words.is_empty() {
            return None;
        }

        let mut best: Option<TriggerMatch> = None;

        // Tasks iterate in deterministic catalog order; a strictly greater
        // score is required to displace the current best, so equal-coverage
        // ties resolve to the first task encountered.
        for (task_name, task) in tasks {
            for trigger in &task.triggers {
                let trigger_words = tokenize(trigger);
                if trigger_words.is_empty() {
                    continue;
                }

                let score = coverage(&query_words, &trigger_words);
                if score < self.threshold {
                    continue;
                }
                if best.as_ref().map_or(true, |b| score > b.coverage) {
                    best = Some(TriggerMatch {
                        task: task_name.clone(),
                        trigger: trigger.clone(),
                        coverage: score,
                        skills: task.skills.clone(),
                    });
                }
            }
        }

        best
    }
}
