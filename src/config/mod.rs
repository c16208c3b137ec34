// src/config/mod.rs
//! Service configuration: defaults -> optional TOML file -> environment.
//! Built once at startup and handed to the router as `Arc<ServiceConfig>`.

pub mod cors;

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::llm::gemini;
use crate::prompt::{DEFAULT_SECTIONS, MAX_SECTIONS};

pub use cors::CorsConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";
pub const DEFAULT_FEED_URL: &str = "http://localhost:8083/service/RelevantPotopsts";

pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
pub const ENV_GEMINI_API_URL: &str = "GEMINI_API_URL";
pub const ENV_FEED_URL: &str = "FEED_URL";
pub const ENV_DAILY_SECTIONS: &str = "DAILY_SECTIONS";
pub const ENV_CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Relevant-posts endpoint returning a JSON array.
    pub feed_url: String,
    /// Section count for `/summarize_daily` when the caller gives none.
    pub daily_sections: usize,
    pub gemini: GeminiConfig,
    pub cors: CorsConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            daily_sections: DEFAULT_SECTIONS,
            gemini: GeminiConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// "ENV" means: read from GEMINI_API_KEY.
    pub api_key: String,
    pub model: String,
    pub api_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: gemini::DEFAULT_MODEL.to_string(),
            api_url: gemini::API_URL.to_string(),
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.api_key.is_empty() {
            "<unset>"
        } else {
            "<redacted>"
        };
        f.debug_struct("GeminiConfig")
            .field("api_key", &key)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ServiceConfig {
    /// Load using env var + fallbacks:
    /// 1) $DIGEST_CONFIG_PATH (must exist)
    /// 2) config/digest.toml (if present)
    /// 3) built-in defaults
    ///
    /// Environment overrides are applied last.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
                }
                Self::from_file(&pb)?
            }
            Err(_) => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_overrides(|k| env::var(k).ok())?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ServiceConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Apply `KEY -> value` overrides (the environment in production) and validate.
    pub fn apply_overrides<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |k: &str| get(k).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_FEED_URL) {
            self.feed_url = v.trim().to_string();
        }
        if let Some(v) = non_empty(ENV_GEMINI_MODEL) {
            self.gemini.model = v.trim().to_string();
        }
        if let Some(v) = non_empty(ENV_GEMINI_API_URL) {
            self.gemini.api_url = v.trim().to_string();
        }
        if let Some(v) = non_empty(ENV_DAILY_SECTIONS) {
            self.daily_sections = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_DAILY_SECTIONS} must be an integer, got {v:?}"))?;
        }
        if let Some(v) = non_empty(ENV_CORS_ALLOWED_ORIGINS) {
            self.cors.default = cors::split_origins(&v);
        }

        // Resolve api key: explicit env wins, "ENV" placeholder requires it.
        match non_empty(ENV_GEMINI_API_KEY) {
            Some(k) => self.gemini.api_key = k.trim().to_string(),
            None if self.gemini.api_key.trim().eq_ignore_ascii_case("env") => {
                bail!("Missing {ENV_GEMINI_API_KEY} env var (config asks for api_key = \"ENV\")");
            }
            None => {}
        }

        if !(1..=MAX_SECTIONS).contains(&self.daily_sections) {
            bail!(
                "daily_sections must be between 1 and {MAX_SECTIONS}, got {}",
                self.daily_sections
            );
        }
        Ok(())
    }

    /// Check that the Gemini key is configured. Call before building the real client.
    pub fn require_gemini(&self) -> Result<()> {
        if self.gemini.api_key.trim().is_empty() {
            bail!(
                "{ENV_GEMINI_API_KEY} not set. Add it to your .env file or set \
                 [gemini] api_key in {DEFAULT_CONFIG_PATH}."
            );
        }
        Ok(())
    }
}
