//! Lightweight configuration loader, typed settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (`APP_RETRIEVAL__RRF_C=60` sets `retrieval.rrf_c`).

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::deadline::millis;
use crate::error::{Error, Result};

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?;
        Ok(config)
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Typed, validated settings. Missing keys take their defaults.
    pub fn settings(&self) -> Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub router: RouterSettings,
    pub executors: ExecutorSettings,
    pub embedding: EmbeddingSettings,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        if self.executors.knowledge_top_k == 0 {
            return Err(Error::Configuration("executors.knowledge_top_k must be > 0".into()));
        }
        if self.embedding.dimension == 0 {
            return Err(Error::Configuration("embedding.dimension must be > 0".into()));
        }
        Ok(())
    }
}

/// Weighted reciprocal rank fusion parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub sparse_weight: f64,
    pub dense_weight: f64,
    /// Smoothing constant `c` in `w / (c + rank)`.
    pub rrf_c: f64,
    /// Truncate each ranked list to this many candidates before fusion.
    pub candidate_depth: Option<usize>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { sparse_weight: 0.5, dense_weight: 0.5, rrf_c: 100.0, candidate_depth: None }
    }
}

impl RetrievalSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.sparse_weight.is_finite()
            || !self.dense_weight.is_finite()
            || self.sparse_weight < 0.0
            || self.dense_weight < 0.0
        {
            return Err(Error::Configuration("fusion weights must be finite and non-negative".into()));
        }
        if (self.sparse_weight + self.dense_weight - 1.0).abs() > 1e-6 {
            return Err(Error::Configuration(format!(
                "fusion weights must sum to 1 (got {} + {})",
                self.sparse_weight, self.dense_weight
            )));
        }
        if self.rrf_c.is_nan() || self.rrf_c <= 0.0 {
            return Err(Error::Configuration("retrieval.rrf_c must be > 0".into()));
        }
        if self.candidate_depth == Some(0) {
            return Err(Error::Configuration("retrieval.candidate_depth must be > 0 when set".into()));
        }
        Ok(())
    }
}

/// Timeouts are in milliseconds; 0 disables the bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub classify_timeout_ms: u64,
    /// Name of the tool run alongside classification, if any.
    pub aux_tool: Option<String>,
    pub aux_timeout_ms: u64,
    /// Output for queries routed to DEFAULT. Empty when unset.
    pub default_message: Option<String>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self { classify_timeout_ms: 30_000, aux_tool: None, aux_timeout_ms: 5_000, default_message: None }
    }
}

impl RouterSettings {
    pub fn classify_timeout(&self) -> Option<Duration> { millis(self.classify_timeout_ms) }
    pub fn aux_timeout(&self) -> Option<Duration> { millis(self.aux_timeout_ms) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    pub knowledge_top_k: usize,
    pub calculator_tool: String,
    /// Phrase calculator results through the language model.
    pub polish_calculations: bool,
    pub generation_timeout_ms: u64,
    pub tool_timeout_ms: u64,
    pub embedding_timeout_ms: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            knowledge_top_k: 2,
            calculator_tool: "math_solver".to_string(),
            polish_calculations: true,
            generation_timeout_ms: 60_000,
            tool_timeout_ms: 10_000,
            embedding_timeout_ms: 30_000,
        }
    }
}

impl ExecutorSettings {
    pub fn generation_timeout(&self) -> Option<Duration> { millis(self.generation_timeout_ms) }
    pub fn tool_timeout(&self) -> Option<Duration> { millis(self.tool_timeout_ms) }
    pub fn embedding_timeout(&self) -> Option<Duration> { millis(self.embedding_timeout_ms) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub dimension: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self { dimension: 256 }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
