//! Transitive dependency collection and topological ordering.
//!
//! Collection is a depth-first walk from the requested skills; ordering is
//! Kahn's algorithm over the collected subgraph only, so cost is O(V+E) on
//! the closure rather than the whole catalog. Tie-breaking among ready nodes
//! follows collection order, which is deterministic.

use super::{DependencyResult, ResolveWarning};
use crate::catalog::Skill;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

/// Resolves execution orders against one catalog snapshot.
pub struct Resolver<'a> {
    skills: &'a BTreeMap<String, Skill>,
}

impl<'a> Resolver<'a> {
    pub fn new(skills: &'a BTreeMap<String, Skill>) -> Self {
        Self { skills }
    }

    /// The transitive closure of `name`, in deterministic discovery order.
    /// Unknown names and missing dependencies are skipped.
    pub fn collect(&self, name: &str) -> Vec<String> {
        let mut closure = Vec::new();
        let mut seen = HashSet::new();
        self.collect_into(name, &mut closure, &mut seen);
        closure
    }

    /// Resolve a single skill into an execution order.
    pub fn resolve(&self, name: &str) -> DependencyResult {
        self.resolve_multi(&[name.to_string()])
    }

    /// Resolve a set of skills into one deduplicated execution order.
    /// The empty input yields an empty result with no warnings.
    pub fn resolve_multi(&self, names: &[String]) -> DependencyResult {
        let mut warnings = Vec::new();
        let mut closure: Vec<String> = Vec::new();
        let mut seen = HashSet::new();

        for name in names {
            if !self.skills.contains_key(name.as_str()) {
                warnings.push(ResolveWarning::UnknownSkill { name: name.clone() });
                continue;
            }
            self.collect_into(name, &mut closure, &mut seen);
        }

        if closure.is_empty() {
            return DependencyResult {
                execution_order: Vec::new(),
                has_cycle: false,
                warnings,
            };
        }

        // Edges over the closure only. Missing dependencies warn and drop.
        let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
        for name in &closure {
            let skill = &self.skills[name.as_str()];
            let mut deps = Vec::new();
            for dep in &skill.depends_on {
                if self.skills.contains_key(dep.as_str()) {
                    deps.push(dep.as_str());
                } else {
                    warnings.push(ResolveWarning::MissingDependency {
                        skill: name.clone(),
                        missing: dep.clone(),
                    });
                }
            }
            edges.insert(name.as_str(), deps);
        }

        let (execution_order, ordered_count) = kahn_sort(&closure, &edges);
        let has_cycle = ordered_count < closure.len();
        if has_cycle {
            let cycles = find_cycles(&closure, &edges);
            if let Some(first) = cycles.first() {
                warnings.push(ResolveWarning::CycleBroken {
                    cycle: first.clone(),
                });
            }
        }

        DependencyResult {
            execution_order,
            has_cycle,
            warnings,
        }
    }

    /// All cycles reachable in the full skill graph, for diagnostics.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let nodes: Vec<String> = self.skills.keys().cloned().collect();
        let edges: HashMap<&str, Vec<&str>> = self
            .skills
            .iter()
            .map(|(name, skill)| {
                let deps = skill
                    .depends_on
                    .iter()
                    .filter(|dep| self.skills.contains_key(dep.as_str()))
                    .map(String::as_str)
                    .collect();
                (name.as_str(), deps)
            })
            .collect();
        find_cycles(&nodes, &edges)
    }

    fn collect_into(&self, name: &str, closure: &mut Vec<String>, seen: &mut HashSet<String>) {
        if !seen.insert(name.to_string()) {
            return;
        }
        closure.push(name.to_string());
        if let Some(skill) = self.skills.get(name) {
            for dep in &skill.depends_on {
                if self.skills.contains_key(dep.as_str()) {
                    self.collect_into(dep, closure, seen);
                }
            }
        }
    }
}

/// Kahn's algorithm. Returns the order (unorderable nodes appended at the
/// end, in `nodes` order) and how many nodes were properly ordered.
fn kahn_sort(nodes: &[String], edges: &HashMap<&str, Vec<&str>>) -> (Vec<String>, usize) {
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
    let mut dependents: HashMap<&str, Vec<&str>> =
        nodes.iter().map(|n| (n.as_str(), Vec::new())).collect();

    for node in nodes {
        for dep in edges.get(node.as_str()).into_iter().flatten() {
            dependents.get_mut(dep).expect("dep is in closure").push(node.as_str());
            *in_degree.get_mut(node.as_str()).expect("node is in closure") += 1;
        }
    }

    let mut queue: VecDeque<&str> = nodes
        .iter()
        .map(String::as_str)
        .filter(|n| in_degree[n] == 0)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(nodes.len());

    while let Some(node) = queue.pop_front() {
        order.push(node.to_string());
        for dependent in &dependents[node] {
            let degree = in_degree.get_mut(dependent).expect("dependent is in closure");
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(dependent);
            }
        }
    }

    let ordered_count = order.len();
    if ordered_count < nodes.len() {
        let placed: HashSet<&str> = order.iter().map(String::as_str).collect();
        let remaining: Vec<String> = nodes
            .iter()
            .filter(|node| !placed.contains(node.as_str()))
            .cloned()
            .collect();
        order.extend(remaining);
    }

    (order, ordered_count)
}

/// Depth-first cycle extraction with an explicit recursion stack.
fn find_cycles(nodes: &[String], edges: &HashMap<&str, Vec<&str>>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    for start in nodes {
        if visited.contains(start.as_str()) {
            continue;
        }
        let mut stack: Vec<&str> = Vec::new();
        let mut on_stack: HashSet<&str> = HashSet::new();
        dfs(
            start.as_str(),
            edges,
            &mut visited,
            &mut stack,
            &mut on_stack,
            &mut cycles,
        );
    }

    cycles
}

fn dfs<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    cycles: &mut Vec<Vec<String>>,
) {
    if on_stack.contains(node) {
        let from = stack.iter().position(|n| *n == node).unwrap_or(0);
        let cycle: Vec<String> = stack[from..].iter().map(|n| n.to_string()).collect();
        if !cycles.contains(&cycle) {
            cycles.push(cycle);
        }
        return;
    }
    if visited.contains(node) {
        return;
    }

    visited.insert(node);
    stack.push(node);
    on_stack.insert(node);

    for dep in edges.get(node).into_iter().flatten() {
        dfs(dep, edges, visited, stack, on_stack, cycles);
    }

    stack.pop();
    on_stack.remove(node);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Skill;

    fn skills(defs: &[(&str, &[&str])]) -> BTreeMap<String, Skill> {
        defs.iter()
            .map(|(name, deps)| {
                (
                    name.to_string(),
                    Skill {
                        name: name.to_string(),
                        depends_on: deps.iter().map(|d| d.to_string()).collect(),
                        ..Default::default()
                    },
                )
            })
            .collect()
    }

    /// Every existing dependency of every skill must precede it, unless a
    /// cycle was reported.
    fn assert_topological(result: &DependencyResult, skills: &BTreeMap<String, Skill>) {
        if result.has_cycle {
            return;
        }
        for (index, name) in result.execution_order.iter().enumerate() {
            for dep in &skills[name].depends_on {
                if let Some(dep_index) = result.execution_order.iter().position(|n| n == dep) {
                    assert!(
                        dep_index < index,
                        "'{}' must precede '{}' in {:?}",
                        dep,
                        name,
                        result.execution_order
                    );
                }
            }
        }
    }

    #[test]
    fn test_single_skill_no_deps() {
        let skills = skills(&[("solo", &[])]);
        let result = Resolver::new(&skills).resolve("solo");
        assert_eq!(result.execution_order, vec!["solo"]);
        assert!(!result.has_cycle);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_chain_orders_dependencies_first() {
        let skills = skills(&[
            ("aws-ecs-deployment", &["terraform-base", "ecr-setup"]),
            ("ecr-setup", &["terraform-base"]),
            ("terraform-base", &[]),
        ]);
        let result = Resolver::new(&skills).resolve("aws-ecs-deployment");
        assert_eq!(
            result.execution_order,
            vec!["terraform-base", "ecr-setup", "aws-ecs-deployment"]
        );
        assert_topological(&result, &skills);
    }

    #[test]
    fn test_closure_excludes_unrelated_skills() {
        let skills = skills(&[("a", &["b"]), ("b", &[]), ("unrelated", &[])]);
        let result = Resolver::new(&skills).resolve("a");
        assert_eq!(result.execution_order.len(), 2);
        assert!(!result.execution_order.contains(&"unrelated".to_string()));
    }

    #[test]
    fn test_resolve_multi_deduplicates_shared_deps() {
        let skills = skills(&[("a", &["base"]), ("b", &["base"]), ("base", &[])]);
        let result =
            Resolver::new(&skills).resolve_multi(&["a".to_string(), "b".to_string()]);
        let base_count = result
            .execution_order
            .iter()
            .filter(|n| n.as_str() == "base")
            .count();
        assert_eq!(base_count, 1);
        assert_eq!(result.execution_order.len(), 3);
        assert_topological(&result, &skills);
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let skills = skills(&[("a", &[])]);
        let result = Resolver::new(&skills).resolve_multi(&[]);
        assert!(result.execution_order.is_empty());
        assert!(!result.has_cycle);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_requested_skill_warns_and_continues() {
        let skills = skills(&[("a", &[])]);
        let result =
            Resolver::new(&skills).resolve_multi(&["ghost".to_string(), "a".to_string()]);
        assert_eq!(result.execution_order, vec!["a"]);
        assert!(matches!(
            result.warnings[0],
            ResolveWarning::UnknownSkill { .. }
        ));
    }

    #[test]
    fn test_missing_dependency_warns_but_keeps_referrer() {
        let skills = skills(&[("a", &["ghost", "b"]), ("b", &[])]);
        let result = Resolver::new(&skills).resolve("a");
        assert!(result.execution_order.contains(&"a".to_string()));
        assert!(result.execution_order.contains(&"b".to_string()));
        assert!(!result.has_cycle);
        assert_eq!(
            result.warnings,
            vec![ResolveWarning::MissingDependency {
                skill: "a".to_string(),
                missing: "ghost".to_string(),
            }]
        );
    }

    #[test]
    fn test_cycle_is_tolerated_not_fatal() {
        let skills = skills(&[("skill-a", &["skill-b"]), ("skill-b", &["skill-a"])]);
        let result = Resolver::new(&skills).resolve("skill-a");
        assert!(result.has_cycle);
        assert!(result.execution_order.contains(&"skill-a".to_string()));
        assert!(result.execution_order.contains(&"skill-b".to_string()));
        assert!(result
            .warnings
            .iter()
            .any(|w| matches!(w, ResolveWarning::CycleBroken { .. })));
    }

    #[test]
    fn test_cycle_members_appended_after_ordered_nodes() {
        let skills = skills(&[
            ("entry", &["loop-a", "free"]),
            ("loop-a", &["loop-b"]),
            ("loop-b", &["loop-a"]),
            ("free", &[]),
        ]);
        let result = Resolver::new(&skills).resolve("entry");
        assert!(result.has_cycle);
        assert_eq!(result.execution_order.len(), 4);
        // The only orderable node comes first.
        assert_eq!(result.execution_order[0], "free");
    }

    #[test]
    fn test_detect_cycles_finds_elementary_cycle() {
        let skills = skills(&[("a", &["b"]), ("b", &["c"]), ("c", &["a"]), ("d", &[])]);
        let cycles = Resolver::new(&skills).detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 3);
    }

    #[test]
    fn test_detect_cycles_clean_graph() {
        let skills = skills(&[("a", &["b"]), ("b", &[])]);
        assert!(Resolver::new(&skills).detect_cycles().is_empty());
    }

    #[test]
    fn test_self_cycle() {
        let skills = skills(&[("selfish", &["selfish"])]);
        let result = Resolver::new(&skills).resolve("selfish");
        assert!(result.has_cycle);
        assert_eq!(result.execution_order, vec!["selfish"]);
        let cycles = Resolver::new(&skills).detect_cycles();
        assert_eq!(cycles, vec![vec!["selfish".to_string()]]);
    }

    #[test]
    fn test_diamond_dependency_order() {
        let skills = skills(&[
            ("top", &["left", "right"]),
            ("left", &["base"]),
            ("right", &["base"]),
            ("base", &[]),
        ]);
        let result = Resolver::new(&skills).resolve("top");
        assert_eq!(result.execution_order.len(), 4);
        assert_eq!(result.execution_order[0], "base");
        assert_eq!(result.execution_order[3], "top");
        assert_topological(&result, &skills);
    }
}
