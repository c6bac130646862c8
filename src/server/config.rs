//! Server configuration types

use inkwell_tools::{BackendEndpoint, BackendKind};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const REDACTED: &str = "***";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub backends: BackendsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Copy with every backend credential masked, for display
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for backend in copy.backends.iter_mut() {
            if !backend.api_key.is_empty() {
                backend.api_key = REDACTED.to_string();
            }
        }
        copy
    }

    /// SQLite database location: explicit path, then `data_dir`, then `~/.inkwell`
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        if let Some(path) = &self.store.path {
            return PathBuf::from(path);
        }
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir).join("workflows.db"),
            None => inkwell_store::default_db_path(),
        }
    }
}

/// HTTP listener
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

/// Workflow store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default)]
    pub path: Option<String>,
}

/// One tool backend. An empty `api_key` means unauthenticated calls.
#[derive(Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    inkwell_tools::backend::DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    fn default_for(kind: BackendKind) -> Self {
        Self {
            base_url: kind.default_base_url().to_string(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Endpoint for the tool client
    #[must_use]
    pub fn endpoint(&self, kind: BackendKind) -> BackendEndpoint {
        BackendEndpoint::new(kind, self.base_url.clone())
            .with_credential(self.api_key.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_empty() { "" } else { REDACTED },
            )
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    pub research: BackendConfig,
    pub seo: BackendConfig,
    pub storage: BackendConfig,
    pub draft: BackendConfig,
}

impl BackendsConfig {
    /// Settings for `kind`
    #[must_use]
    pub fn get(&self, kind: BackendKind) -> &BackendConfig {
        match kind {
            BackendKind::Research => &self.research,
            BackendKind::Seo => &self.seo,
            BackendKind::Storage => &self.storage,
            BackendKind::Draft => &self.draft,
        }
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut BackendConfig> {
        [
            &mut self.research,
            &mut self.seo,
            &mut self.storage,
            &mut self.draft,
        ]
        .into_iter()
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            research: BackendConfig::default_for(BackendKind::Research),
            seo: BackendConfig::default_for(BackendKind::Seo),
            storage: BackendConfig::default_for(BackendKind::Storage),
            draft: BackendConfig::default_for(BackendKind::Draft),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}
