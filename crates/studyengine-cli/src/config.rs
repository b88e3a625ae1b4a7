//! Layered configuration.
//!
//! `config/default.toml` (optional) is read first, then environment
//! variables, then command-line overrides applied by the caller.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use studyengine_intent::DEFAULT_CONFIDENCE_THRESHOLD;
use studyengine_llm::LlmClientConfig;
use studyengine_llm::client::{DEFAULT_MODEL, OPENAI_BASE_URL};
use studyengine_web::WebConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub store: StoreSection,
    pub intent: IntentSection,
    pub files: FilesSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: String,
    pub max_tokens: u32,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.into(),
            base_url: OPENAI_BASE_URL.into(),
            max_tokens: 4096,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/studyengine.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntentSection {
    pub confidence_threshold: f64,
}

impl Default for IntentSection {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilesSection {
    pub root: Option<PathBuf>,
}

impl AppConfig {
    /// Load `path` (if present) and overlay the process environment.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; a missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Overlay environment variables resolved through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(model) = get("STUDYENGINE_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = get("STUDYENGINE_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(path) = get("STUDYENGINE_DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(root) = get("LOCAL_FILES_DIR") {
            self.files.root = Some(PathBuf::from(root));
        }
        if let Some(raw) = get("STUDYENGINE_CONFIDENCE_THRESHOLD") {
            self.intent.confidence_threshold = raw
                .trim()
                .parse()
                .with_context(|| format!("STUDYENGINE_CONFIDENCE_THRESHOLD is not a number: {raw}"))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let threshold = self.intent.confidence_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            bail!("confidence_threshold must be within 0.0..=1.0, got {threshold}");
        }
        if self.llm.base_url.trim().is_empty() {
            bail!("llm.base_url must not be empty");
        }
        Ok(())
    }

    /// Client configuration without a key; the key is read on first use.
    pub fn llm_client_config(&self) -> LlmClientConfig {
        LlmClientConfig {
            max_tokens: self.llm.max_tokens,
            ..LlmClientConfig::openai_compatible(String::new(), &self.llm.model, &self.llm.base_url)
        }
    }

    pub fn web_config(&self) -> WebConfig {
        WebConfig {
            bind_addr: self.server.bind.clone(),
            port: self.server.port,
            files_root: self.files.root.clone(),
        }
    }
}
