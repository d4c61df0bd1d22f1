//! Process-wide configuration.
//!
//! Layered TOML: built-in defaults, then the user file
//! (`~/.skillroute/config.toml`), then the project file
//! (`./.skillroute/config.toml`). Later layers override earlier ones.
//! Credentials are resolved once at initialization, never per request.

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    crate::discovery::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_max_results() -> usize {
    3
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

fn default_threshold() -> f64 {
    crate::matching::DEFAULT_TRIGGER_THRESHOLD
}

fn default_catalog_path() -> PathBuf {
    default_skills_root().join("manifest.yaml")
}

fn default_skills_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".claude").join("skills"))
        .unwrap_or_else(|| PathBuf::from(".claude/skills"))
}

/// Tier 3 provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Deadline for one provider call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Direct key; takes priority over the environment variable.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override for the provider endpoint (tests, proxies).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_ms: default_timeout_ms(),
            max_results: default_max_results(),
            api_key_env: default_api_key_env(),
            api_key: None,
            base_url: None,
        }
    }
}

impl DiscoveryConfig {
    /// Resolve the API key: direct config value first, then the environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,
    #[serde(default = "default_skills_root")]
    pub skills_root: PathBuf,
    #[serde(default = "default_threshold")]
    pub trigger_threshold: f64,
    /// Custom Tier 1 pattern templates; `None` keeps the defaults.
    #[serde(default)]
    pub patterns: Option<Vec<String>>,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            skills_root: default_skills_root(),
            trigger_threshold: default_threshold(),
            patterns: None,
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// Partial config as found in a single file; only set fields override.
#[derive(Debug, Default, Deserialize)]
struct ConfigOverlay {
    catalog_path: Option<PathBuf>,
    skills_root: Option<PathBuf>,
    trigger_threshold: Option<f64>,
    patterns: Option<Vec<String>>,
    discovery: Option<DiscoveryOverlay>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscoveryOverlay {
    enabled: Option<bool>,
    model: Option<String>,
    max_tokens: Option<u32>,
    timeout_ms: Option<u64>,
    max_results: Option<usize>,
    api_key_env: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl RouterConfig {
    /// Load configuration from the default layer stack.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user = home.join(".skillroute").join("config.toml");
            if user.exists() {
                config.merge_file(&user)?;
            }
        }

        let project = Path::new(".skillroute").join("config.toml");
        if project.exists() {
            config.merge_file(&project)?;
        }

        Ok(config)
    }

    /// Load a single config file on top of the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)?;
        let overlay: ConfigOverlay = toml::from_str(&content)?;
        self.merge(overlay);
        Ok(())
    }

    fn merge(&mut self, overlay: ConfigOverlay) {
        if let Some(path) = overlay.catalog_path {
            self.catalog_path = path;
        }
        if let Some(root) = overlay.skills_root {
            self.skills_root = root;
        }
        if let Some(threshold) = overlay.trigger_threshold {
            self.trigger_threshold = threshold;
        }
        if overlay.patterns.is_some() {
            self.patterns = overlay.patterns;
        }
        if let Some(discovery) = overlay.discovery {
            let d = &mut self.discovery;
            if let Some(enabled) = discovery.enabled {
                d.enabled = enabled;
            }
            if let Some(model) = discovery.model {
                d.model = model;
            }
            if let Some(max_tokens) = discovery.max_tokens {
                d.max_tokens = max_tokens;
            }
            if let Some(timeout_ms) = discovery.timeout_ms {
                d.timeout_ms = timeout_ms;
            }
            if let Some(max_results) = discovery.max_results {
                d.max_results = max_results;
            }
            if let Some(api_key_env) = discovery.api_key_env {
                d.api_key_env = api_key_env;
            }
            if discovery.api_key.is_some() {
                d.api_key = discovery.api_key;
            }
            if discovery.base_url.is_some() {
                d.base_url = discovery.base_url;
            }
        }
    }
}
