//! NDJSON routing service over stdin/stdout.
//!
//! One JSON request per line in, one JSON response per line out. The
//! catalog is held behind a [`CatalogHandle`]; a `reload` request swaps the
//! snapshot atomically and invalidates the content cache, so in-flight
//! routes keep their snapshot while new ones see the fresh catalog.
//!
//! Requests:
//!   {"op": "route",   "query": "..."}   -> RouteResult wire shape
//!   {"op": "context", "query": "..."}   -> {"context": "<skill_context>..."}
//!   {"op": "skills"}                    -> {"skills": [{name, description, path}]}
//!   {"op": "reload"}                    -> {"status": "reloaded", "skills": N}
//!   {"op": "metrics"}                   -> {"metrics": "<prometheus text>"}
//!
//! Malformed requests produce {"error": "..."} and the loop continues.

use crate::catalog::CatalogHandle;
use crate::config::RouterConfig;
use crate::context::{ContentLoader, ContextAssembler};
use crate::discovery::{self, Discovery};
use crate::error::CatalogError;
use crate::metrics;
use crate::router::SkillRouter;
use anyhow::Result;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    Route { query: String },
    Context { query: String },
    Skills,
    Reload,
    Metrics,
}

pub struct RoutingService {
    config: RouterConfig,
    catalog: CatalogHandle,
    discovery: Arc<dyn Discovery>,
    content: ContentLoader,
}

impl RoutingService {
    /// Load the catalog and wire up discovery. Fails fast on a bad catalog;
    /// a service that cannot route should not start.
    pub fn new(config: RouterConfig) -> Result<Self, CatalogError> {
        let catalog = CatalogHandle::load(&config.catalog_path)?;
        let discovery = discovery::create_discovery(&config.discovery);
        let content = ContentLoader::new(&config.skills_root);
        Ok(Self {
            config,
            catalog,
            discovery,
            content,
        })
    }

    /// Serve until stdin closes.
    pub async fn run(&self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        let mut lines = stdin.lines();

        tracing::info!(
            catalog = %self.catalog.path().display(),
            skills = self.catalog.snapshot().skills.len(),
            "routing service ready"
        );

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let response = self.handle_line(&line).await;
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            stdout.write_all(payload.as_bytes()).await?;
            stdout.flush().await?;
        }

        Ok(())
    }

    /// Handle one raw request line.
    pub async fn handle_line(&self, line: &str) -> serde_json::Value {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(err) => json!({ "error": format!("invalid request: {err}") }),
        }
    }

    async fn handle(&self, request: Request) -> serde_json::Value {
        match request {
            Request::Route { query } => {
                let result = self.router().route(&query).await;
                serde_json::to_value(&result)
                    .unwrap_or_else(|err| json!({ "error": err.to_string() }))
            }
            Request::Context { query } => {
                let router = self.router();
                let result = router.route(&query).await;
                let block = ContextAssembler::new(router.catalog(), &self.content)
                    .assemble(&result);
                json!({ "context": block })
            }
            Request::Skills => {
                let snapshot = self.catalog.snapshot();
                let skills: Vec<serde_json::Value> = snapshot
                    .skills
                    .values()
                    .map(|skill| {
                        json!({
                            "name": skill.name,
                            "description": skill.description,
                            "path": skill.path,
                        })
                    })
                    .collect();
                json!({ "skills": skills })
            }
            Request::Reload => match self.catalog.reload() {
                Ok(()) => {
                    self.content.invalidate();
                    let snapshot = self.catalog.snapshot();
                    tracing::info!(skills = snapshot.skills.len(), "catalog reloaded");
                    json!({ "status": "reloaded", "skills": snapshot.skills.len() })
                }
                Err(err) => {
                    tracing::error!(error = %err, "catalog reload failed, keeping old snapshot");
                    json!({ "error": err.to_string() })
                }
            },
            Request::Metrics => json!({ "metrics": metrics::prometheus() }),
        }
    }

    fn router(&self) -> SkillRouter {
        SkillRouter::from_config(
            self.catalog.snapshot(),
            &self.config,
            self.discovery.clone(),
        )
    }
}
