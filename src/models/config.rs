//! Runtime configuration for the buildstock service.
//!
//! Values come from an optional `config.yaml` next to the binary, overridden
//! by `BUILDSTOCK__`-prefixed environment variables (double underscore as the
//! section separator, e.g. `BUILDSTOCK__EXTRACTION__API_KEY`). Every field has
//! a default so a bare environment boots against a local database.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::material::MATERIAL_CATEGORIES;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Key material for the session cookie; must be at least 64 bytes.
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Base URL of the external identity provider.
    #[serde(default = "default_auth_service_url")]
    pub auth_service_url: String,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub sync: SyncSettings,
}

/// Connection details for the extraction service.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default = "default_extraction_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_extraction_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_extraction_max_retries")]
    pub max_retries: u32,
    /// URL pattern handed to the extraction service; retrieval is its concern.
    #[serde(default = "default_target_url_pattern")]
    pub target_url_pattern: String,
}

/// Knobs for the material sync pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_sync_source")]
    pub source: String,
    /// Vendor recorded on listings that do not name one.
    #[serde(default = "default_sync_vendor")]
    pub vendor: String,
    /// Categories to pull, in processing order.
    #[serde(default = "default_sync_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_per_category_limit")]
    pub per_category_limit: u32,
    /// When true, exhausted extraction retries fall back to deterministic
    /// placeholder records instead of surfacing the failure.
    #[serde(default)]
    pub synthetic_fallback: bool,
}

fn default_database_url() -> String {
    "buildstock.db".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_secret() -> String {
    // Development-only key; deployments override via BUILDSTOCK__SECRET.
    "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef".to_string()
}

fn default_auth_service_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_extraction_base_url() -> String {
    "https://api.firecrawl.dev".to_string()
}

fn default_extraction_timeout_secs() -> u64 {
    60
}

fn default_extraction_max_retries() -> u32 {
    2
}

fn default_target_url_pattern() -> String {
    "https://www.homedepot.com/*".to_string()
}

fn default_sync_source() -> String {
    "home_depot".to_string()
}

fn default_sync_vendor() -> String {
    "Home Depot".to_string()
}

fn default_sync_categories() -> Vec<String> {
    MATERIAL_CATEGORIES.iter().map(|c| c.to_string()).collect()
}

fn default_per_category_limit() -> u32 {
    10
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_extraction_base_url(),
            api_key: String::new(),
            timeout_secs: default_extraction_timeout_secs(),
            max_retries: default_extraction_max_retries(),
            target_url_pattern: default_target_url_pattern(),
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            source: default_sync_source(),
            vendor: default_sync_vendor(),
            categories: default_sync_categories(),
            per_category_limit: default_per_category_limit(),
            synthetic_fallback: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            bind_address: default_bind_address(),
            secret: default_secret(),
            auth_service_url: default_auth_service_url(),
            extraction: ExtractionConfig::default(),
            sync: SyncSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from `config.yaml` (when present) and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("BUILDSTOCK").separator("__"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let config = ServerConfig::default();
        assert_eq!(config.sync.categories.len(), MATERIAL_CATEGORIES.len());
        assert_eq!(config.sync.per_category_limit, 10);
        assert_eq!(config.extraction.max_retries, 2);
        assert!(!config.sync.synthetic_fallback);
        assert!(config.secret.len() >= 64);
    }
}
