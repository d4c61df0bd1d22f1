//! skillroute: route natural-language requests to catalog skills.
//!
//! A declarative catalog maps skills (documentation-backed capability
//! units), tasks (trigger-phrase bundles of skills), and categories. A
//! query runs through a three-tier pipeline: direct skill match, task
//! trigger match, then LLM discovery as a last resort. The matched skills
//! are expanded into a dependency-ordered load sequence and assembled into
//! a `<skill_context>` block for prompt injection.
//!
//! The crate runs in-process as a library, as a one-shot pre-prompt hook,
//! or as a small NDJSON service over stdin/stdout.

pub mod catalog;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod hook;
pub mod matching;
pub mod metrics;
pub mod resolve;
pub mod router;
pub mod service;

pub use catalog::{Catalog, CatalogHandle};
pub use config::RouterConfig;
pub use context::{ContentLoader, ContextAssembler};
pub use error::{CatalogError, DiscoveryError};
pub use resolve::{DependencyResult, ResolveWarning, Resolver};
pub use router::{RouteResult, RouteType, SkillRouter};
pub use service::RoutingService;
