//! Typed error taxonomy for catalog loading and LLM discovery.
//!
//! Library code returns these structured errors so callers can match on the
//! failure class and pick a recovery strategy. The binary edges (hook,
//! service loop) wrap them in `anyhow` for ad-hoc context chains.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a skill catalog.
///
/// Variants are ordered by detection precedence: a missing file is reported
/// before an empty one, a parse failure before a missing section, and
/// validation runs only on a structurally complete catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog file not found: {0}")]
    NotFound(PathBuf),

    #[error("catalog is empty")]
    Empty,

    #[error("invalid catalog YAML: {message}")]
    Parse {
        message: String,
        /// Line hint when the parser supplies one.
        line: Option<usize>,
    },

    #[error("catalog is missing required section '{0}'")]
    MissingSection(&'static str),

    #[error("catalog validation failed with {} error(s)", .errors.len())]
    Validation { errors: Vec<String> },

    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// All unresolved references for a `Validation` failure, empty otherwise.
    pub fn validation_errors(&self) -> &[String] {
        match self {
            CatalogError::Validation { errors } => errors,
            _ => &[],
        }
    }
}

/// Errors raised by Tier 3 LLM discovery.
///
/// The provider client translates HTTP-layer failures into this taxonomy so
/// the router never has to inspect status codes or transport errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("discovery input invalid: {0}")]
    InvalidInput(String),

    #[error("provider authentication failed: {0}")]
    Auth(String),

    #[error("provider rate limited: {0}")]
    RateLimited(String),

    #[error("provider request timed out: {0}")]
    Timeout(String),

    #[error("provider request failed: {0}")]
    Client(String),

    #[error("response parse failure: {0}")]
    Parse(String),
}
