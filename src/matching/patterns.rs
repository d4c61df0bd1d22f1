//! Request-pattern templates for Tier 1 pattern matching.

/// Default phrase templates. `{skill}` is the placeholder.
pub const DEFAULT_PATTERNS: [&str; 8] = [
    "use {skill}",
    "apply {skill}",
    "run {skill}",
    "execute {skill}",
    "{skill} skill",
    "deploy with {skill}",
    "set up {skill}",
    "configure {skill}",
];

/// A registry of pattern templates. The defaults cover common command
/// phrasings; deployments can supply their own set.
#[derive(Debug, Clone)]
pub struct PatternSet {
    templates: Vec<String>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self {
            templates: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl PatternSet {
    pub fn new(templates: Vec<String>) -> Self {
        Self { templates }
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    /// Expand every template for one skill name, in registry order.
    pub fn expand<'a>(&'a self, skill: &'a str) -> impl Iterator<Item = String> + 'a {
        self.templates
            .iter()
            .map(move |template| template.replace("{skill}", skill))
    }
}
