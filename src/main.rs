use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skillroute::config::RouterConfig;
use skillroute::error::CatalogError;
use skillroute::router::SkillRouter;
use skillroute::service::RoutingService;
use skillroute::{catalog, discovery, hook};

#[derive(Parser)]
#[command(
    name = "skillroute",
    version,
    about = "Route natural-language requests to catalog skills"
)]
struct Cli {
    /// Catalog manifest path (overrides config)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Skills root for SKILL.md resolution (overrides config)
    #[arg(long, global = true)]
    skills_root: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the prompt from $PROMPT or stdin and print the skill context block
    Hook,
    /// Route one query and print the result as JSON
    Route { query: String },
    /// Serve NDJSON routing requests over stdin/stdout
    Serve,
    /// Load and validate the catalog, reporting every unresolved reference
    Check,
    /// List catalog skills as JSON
    Skills,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("skillroute: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logging goes to stderr only; stdout is reserved for hook/service output.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("skillroute=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skillroute=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = RouterConfig::load()?;
    if let Some(catalog_path) = cli.catalog {
        config.catalog_path = catalog_path;
    }
    if let Some(skills_root) = cli.skills_root {
        config.skills_root = skills_root;
    }

    match cli.command {
        Commands::Hook => hook::run(&config).await,
        Commands::Route { query } => cmd_route(&config, &query).await,
        Commands::Serve => RoutingService::new(config)?.run().await,
        Commands::Check => cmd_check(&config),
        Commands::Skills => cmd_skills(&config),
    }
}

async fn cmd_route(config: &RouterConfig, query: &str) -> Result<()> {
    let loaded = catalog::load(&config.catalog_path)?;
    let discovery = discovery::create_discovery(&config.discovery);
    let router = SkillRouter::from_config(Arc::new(loaded), config, discovery);
    let result = router.route(query).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn cmd_check(config: &RouterConfig) -> Result<()> {
    match catalog::load(&config.catalog_path) {
        Ok(catalog) => {
            println!(
                "catalog OK: {} skill(s), {} task(s), {} categor(ies)",
                catalog.skills.len(),
                catalog.tasks.len(),
                catalog.categories.len()
            );
            let cycles = skillroute::Resolver::new(&catalog.skills).detect_cycles();
            for cycle in &cycles {
                let mut path = cycle.join(" -> ");
                if let Some(first) = cycle.first() {
                    path.push_str(" -> ");
                    path.push_str(first);
                }
                eprintln!("warning: dependency cycle: {path}");
            }
            Ok(())
        }
        Err(CatalogError::Validation { errors }) => {
            for error in &errors {
                eprintln!("  - {error}");
            }
            anyhow::bail!("catalog validation failed with {} error(s)", errors.len())
        }
        Err(other) => Err(other.into()),
    }
}

fn cmd_skills(config: &RouterConfig) -> Result<()> {
    let catalog = catalog::load(&config.catalog_path)?;
    let skills: Vec<serde_json::Value> = catalog
        .skills
        .values()
        .map(|skill| {
            serde_json::json!({
                "name": skill.name,
                "description": skill.description,
                "path": skill.path,
                "depends_on": skill.depends_on,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&skills)?);
    Ok(())
}
