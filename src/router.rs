//! The three-tier routing pipeline.
//!
//! Deterministic short-circuit: normalize, then direct match (Tier 1), then
//! trigger match (Tier 2), then LLM discovery (Tier 3). If tier k matches,
//! tier k+1 is never invoked; Tier 3 costs money and latency, and the
//! short-circuit is part of the contract, not an optimization.
//!
//! A query containing both a skill name and a task trigger resolves to the
//! skill: Tier 1 outranks Tier 2 by design.

use crate::catalog::Catalog;
use crate::discovery::{Discovery, DiscoveryResult};
use crate::matching::{
    normalize, DirectMatcher, MatchSkills, MatchTasks, PatternSet, TriggerMatcher,
};
use crate::metrics;
use crate::resolve::Resolver;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a route was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteType {
    Skill,
    Task,
    Discovery,
    Error,
}

impl std::fmt::Display for RouteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RouteType::Skill => "skill",
            RouteType::Task => "task",
            RouteType::Discovery => "discovery",
            RouteType::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Outcome of routing one query. This is also the wire shape for the
/// service transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub route_type: RouteType,
    /// Matched skill or task name; empty for error results.
    pub matched: String,
    /// Primary skills: the skill itself, or the task's declared skill list.
    pub skills: Vec<String>,
    /// Dependency-resolved load order over the transitive closure.
    pub execution_order: Vec<String>,
    /// 0 for error, otherwise the tier that produced the match.
    pub tier: u8,
    /// 1.0 for tiers 1 and 2, model-supplied for tier 3, 0.0 for error.
    pub confidence: f64,
}

impl RouteResult {
    pub fn skill_match(skill: String, execution_order: Vec<String>) -> Self {
        Self {
            route_type: RouteType::Skill,
            skills: vec![skill.clone()],
            matched: skill,
            execution_order,
            tier: 1,
            confidence: 1.0,
        }
    }

    pub fn task_match(task: String, skills: Vec<String>, execution_order: Vec<String>) -> Self {
        Self {
            route_type: RouteType::Task,
            matched: task,
            skills,
            execution_order,
            tier: 2,
            confidence: 1.0,
        }
    }

    pub fn discovery_skill(skill: String, execution_order: Vec<String>, confidence: f64) -> Self {
        Self {
            route_type: RouteType::Discovery,
            skills: vec![skill.clone()],
            matched: skill,
            execution_order,
            tier: 3,
            confidence,
        }
    }

    pub fn discovery_task(
        task: String,
        skills: Vec<String>,
        execution_order: Vec<String>,
        confidence: f64,
    ) -> Self {
        Self {
            route_type: RouteType::Discovery,
            matched: task,
            skills,
            execution_order,
            tier: 3,
            confidence,
        }
    }

    pub fn no_match() -> Self {
        Self {
            route_type: RouteType::Error,
            matched: String::new(),
            skills: Vec::new(),
            execution_order: Vec::new(),
            tier: 0,
            confidence: 0.0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.route_type != RouteType::Error
    }
}

/// Orchestrates the pipeline over one catalog snapshot. Stateless between
/// calls; safe to share across concurrent request handlers.
pub struct SkillRouter {
    catalog: Arc<Catalog>,
    direct: Box<dyn MatchSkills>,
    triggers: Box<dyn MatchTasks>,
    discovery: Arc<dyn Discovery>,
}

impl SkillRouter {
    /// Default wiring: direct matcher with the default pattern set, trigger
    /// matcher at the default threshold.
    pub fn new(catalog: Arc<Catalog>, discovery: Arc<dyn Discovery>) -> Self {
        Self::with_parts(
            catalog,
            Box::new(DirectMatcher::default()),
            Box::new(TriggerMatcher::default()),
            discovery,
        )
    }

    /// Full injection, used by the config wiring and by tests.
    pub fn with_parts(
        catalog: Arc<Catalog>,
        direct: Box<dyn MatchSkills>,
        triggers: Box<dyn MatchTasks>,
        discovery: Arc<dyn Discovery>,
    ) -> Self {
        Self {
            catalog,
            direct,
            triggers,
            discovery,
        }
    }

    /// Default matchers plus the threshold and pattern set from config.
    pub fn from_config(
        catalog: Arc<Catalog>,
        config: &crate::config::RouterConfig,
        discovery: Arc<dyn Discovery>,
    ) -> Self {
        let patterns = config
            .patterns
            .clone()
            .map(PatternSet::new)
            .unwrap_or_default();
        Self::with_parts(
            catalog,
            Box::new(DirectMatcher::new(patterns)),
            Box::new(TriggerMatcher::new(config.trigger_threshold)),
            discovery,
        )
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Route a raw query through the pipeline.
    pub async fn route(&self, raw_query: &str) -> RouteResult {
        let started = std::time::Instant::now();
        let result = self.route_inner(raw_query).await;
        metrics::record_route(result.tier, &result.route_type.to_string());
        metrics::observe_route_duration(result.tier, started.elapsed().as_secs_f64() * 1000.0);
        result
    }

    async fn route_inner(&self, raw_query: &str) -> RouteResult {
        let normalized = normalize(raw_query);
        if normalized.is_empty() {
            return RouteResult::no_match();
        }

        if let Some(hit) = self.direct.match_skills(&normalized, &self.catalog.skills) {
            tracing::debug!(skill = %hit.skill, kind = ?hit.kind, "tier 1 match");
            let resolved = Resolver::new(&self.catalog.skills).resolve(&hit.skill);
            log_warnings(&resolved.warnings);
            return RouteResult::skill_match(hit.skill, resolved.execution_order);
        }

        if let Some(hit) = self.triggers.match_tasks(&normalized, &self.catalog.tasks) {
            tracing::debug!(task = %hit.task, coverage = hit.coverage, "tier 2 match");
            let resolved = Resolver::new(&self.catalog.skills).resolve_multi(&hit.skills);
            log_warnings(&resolved.warnings);
            return RouteResult::task_match(hit.task, hit.skills, resolved.execution_order);
        }

        self.discover(raw_query).await
    }

    /// Tier 3. The original (un-normalized) query goes to the model; the
    /// model's answer is only trusted if it names something in the catalog.
    async fn discover(&self, raw_query: &str) -> RouteResult {
        let outcome = self.discovery.discover(raw_query, &self.catalog).await;

        let discovered: DiscoveryResult = match outcome {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(error = %err, "tier 3 discovery failed");
                metrics::record_discovery("failure");
                return RouteResult::no_match();
            }
        };
        metrics::record_discovery("success");
        if let (Some(input), Some(output)) =
            (discovered.prompt_tokens, discovered.completion_tokens)
        {
            metrics::record_discovery_tokens(input, output);
        }

        let top = match discovered.top() {
            Some(top) => top,
            None => return RouteResult::no_match(),
        };

        if self.catalog.has_skill(&top.name) {
            let resolved = Resolver::new(&self.catalog.skills).resolve(&top.name);
            log_warnings(&resolved.warnings);
            return RouteResult::discovery_skill(
                top.name.clone(),
                resolved.execution_order,
                top.confidence,
            );
        }

        if let Some(task) = self.catalog.task(&top.name) {
            let resolved = Resolver::new(&self.catalog.skills).resolve_multi(&task.skills);
            log_warnings(&resolved.warnings);
            return RouteResult::discovery_task(
                top.name.clone(),
                task.skills.clone(),
                resolved.execution_order,
                top.confidence,
            );
        }

        // The model invented a name. Never coerce to a nearest neighbor.
        tracing::warn!(name = %top.name, "discovery returned unknown name, rejecting");
        RouteResult::no_match()
    }
}

fn log_warnings(warnings: &[crate::resolve::ResolveWarning]) {
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}
