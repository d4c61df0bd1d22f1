//! Dependency resolution results and warnings.
//!
//! Resolution never throws: the outcome is always an ordered list plus the
//! warnings accumulated along the way, and callers decide presentation.

mod resolver;

pub use resolver::Resolver;

use std::fmt;

/// Outcome of resolving one or more skills into an execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyResult {
    /// Topological order over the transitive closure, dependencies first.
    /// When a cycle exists, cycle members are appended at the end.
    pub execution_order: Vec<String>,
    pub has_cycle: bool,
    pub warnings: Vec<ResolveWarning>,
}

/// Non-fatal problems encountered during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveWarning {
    /// A skill declares a dependency that is not in the catalog. The
    /// referring skill is still resolved; the missing name is skipped.
    MissingDependency { skill: String, missing: String },
    /// A requested skill is not in the catalog at all.
    UnknownSkill { name: String },
    /// Kahn's algorithm could not order these nodes; they were appended to
    /// the execution order so the router can degrade instead of crash.
    CycleBroken { cycle: Vec<String> },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::MissingDependency { skill, missing } => write!(
                f,
                "skill '{}' depends on '{}' which is not in the catalog",
                skill, missing
            ),
            ResolveWarning::UnknownSkill { name } => {
                write!(f, "requested skill '{}' is not in the catalog", name)
            }
            ResolveWarning::CycleBroken { cycle } => {
                let mut path = cycle.join(" -> ");
                if let Some(first) = cycle.first() {
                    path.push_str(" -> ");
                    path.push_str(first);
                }
                write!(f, "circular dependency detected: {}", path)
            }
        }
    }
}
