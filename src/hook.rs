//! Pre-prompt hook entry point.
//!
//! Reads the user query from the `PROMPT` environment variable (if set and
//! non-empty) or stdin, routes it, and writes the assembled
//! `<skill_context>` block to stdout. Stdout carries only the block; all
//! diagnostics go to stderr via tracing. An error route emits nothing, and
//! the exit code stays zero unless the catalog itself fails to load.

use crate::catalog;
use crate::config::RouterConfig;
use crate::context::{ContentLoader, ContextAssembler};
use crate::discovery;
use crate::router::SkillRouter;
use anyhow::{Context as _, Result};
use std::io::Read;
use std::sync::Arc;

/// Environment variable consulted before stdin.
pub const QUERY_ENV_VAR: &str = "PROMPT";

/// Obtain the query: `$PROMPT` when set and non-empty, stdin otherwise.
pub fn query_from_env_or_stdin() -> String {
    if let Ok(value) = std::env::var(QUERY_ENV_VAR) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut buffer = String::new();
    match std::io::stdin().read_to_string(&mut buffer) {
        Ok(_) => buffer.trim().to_string(),
        Err(_) => String::new(),
    }
}

/// Run the hook once. Catalog failures are fatal; everything downstream
/// degrades to "emit nothing".
pub async fn run(config: &RouterConfig) -> Result<()> {
    let loaded = catalog::load(&config.catalog_path).with_context(|| {
        format!(
            "failed to load catalog from {}",
            config.catalog_path.display()
        )
    })?;
    let catalog = Arc::new(loaded);

    let query = query_from_env_or_stdin();
    if query.is_empty() {
        tracing::debug!("no query provided, emitting nothing");
        return Ok(());
    }

    let discovery = discovery::create_discovery(&config.discovery);
    let router = SkillRouter::from_config(catalog, config, discovery);
    let result = router.route(&query).await;

    let loader = ContentLoader::new(&config.skills_root);
    let block = ContextAssembler::new(router.catalog(), &loader).assemble(&result);
    if !block.is_empty() {
        println!("{}", block);
    }

    Ok(())
}
