//! Layered configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (nested keys split on `__`, e.g. `APP_QUERY__TOP_N=4`) into [`Settings`].
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;
use crate::types::SearchMode;

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Merge `base` + `<base stem>.<env>.toml` + `APP_*` env vars, where env is
    /// taken from `RUST_ENV` (default `dev`). Missing files are skipped.
    pub fn load_from(base: &Path) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file(base));
        if let Some(env_file) = env_file_for(base, &env_name) {
            figment = figment.merge(Toml::file(env_file));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.validate_for_env(&env_name)?;
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

    /// Extract and validate the typed settings. Unset keys take their defaults.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to parse settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate_for_env(&self, env: &str) -> anyhow::Result<()> {
        match env {
            "prod" | "production" => {
                let fake: bool = self.get("embedding.fake").unwrap_or(false);
                if fake {
                    return Err(Error::InvalidConfig(
                        "embedding.fake must be disabled in production".to_string(),
                    )
                    .into());
                }
            }
            "dev" | "development" | "test" | "testing" => {}
            _ => {}
        }
        Ok(())
    }
}

fn env_file_for(base: &Path, env: &str) -> Option<PathBuf> {
    let suffix = match env {
        "dev" | "development" => "dev",
        "prod" | "production" => "prod",
        "test" | "testing" => "test",
        _ => return None,
    };
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("config");
    Some(base.with_file_name(format!("{stem}.{suffix}.toml")))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub embedding: EmbeddingSettings,
    pub store: StoreSettings,
    pub query: QuerySettings,
}

impl Settings {
    pub fn validate(&self) -> Result<(), Error> {
        if self.embedding.model.trim().is_empty() {
            return Err(Error::InvalidConfig("embedding.model is empty".to_string()));
        }
        for (key, url) in [("embedding.base_url", &self.embedding.base_url), ("store.base_url", &self.store.base_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!("{key} must be an http(s) URL, got '{url}'")));
            }
        }
        if self.store.database.trim().is_empty() || self.store.table.trim().is_empty() {
            return Err(Error::InvalidConfig("store.database and store.table are required".to_string()));
        }
        if self.query.top_n == 0 {
            return Err(Error::InvalidConfig("query.top_n must be at least 1".to_string()));
        }
        if self.embedding.fake && self.embedding.fake_dim == 0 {
            return Err(Error::InvalidConfig("embedding.fake_dim must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub base_url: String,
    pub model: String,
    /// Request timeout in seconds, `0` for none.
    pub timeout_secs: u64,
    /// Use the deterministic hashing embedder instead of the HTTP service.
    pub fake: bool,
    pub fake_dim: usize,
}

impl EmbeddingSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7997".to_string(),
            model: "michaelfeil/bge-small-en-v1.5".to_string(),
            timeout_secs: 0,
            fake: false,
            fake_dim: 384,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub base_url: String,
    pub database: String,
    pub table: String,
    pub mode: SearchMode,
    /// Distance metric for dense matches (`cosine`, `l2`, `ip`).
    pub metric: String,
    pub timeout_secs: u64,
}

impl StoreSettings {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:23820".to_string(),
            database: "rfs".to_string(),
            table: "data".to_string(),
            mode: SearchMode::Text,
            metric: "cosine".to_string(),
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub top_n: usize,
    /// Drop hits scoring below this before assembling context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    /// Prompt template file; the built-in template is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_path: Option<String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self { top_n: 2, min_score: None, template_path: None }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Expand env vars first
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    // Expand ~ at start
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
