//! Application configuration
//!
//! Built-in defaults, optionally overlaid by a TOML file, then by a `.env`
//! file and the process environment. Each section is handed to the entry
//! point that needs it; nothing reads configuration globally.

pub mod repository;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ingest::PipelineSettings;

/// Remote location of the launch-map workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub site_url: String,
    /// Server-relative path of the workbook inside the site
    pub file_path: String,
    pub username: String,
    /// Prompted for interactively when unset
    pub password: Option<String>,
    pub tenant: String,
    /// Public client registered for the password grant
    pub client_id: String,
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            file_path: String::new(),
            username: String::new(),
            password: None,
            tenant: "organizations".to_string(),
            client_id: String::new(),
            timeout_seconds: 120,
        }
    }
}

/// Local reference workbooks and the audit artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReferenceConfig {
    pub posted_products: PathBuf,
    pub inconsistencies: PathBuf,
    pub output: PathBuf,
    pub output_sheet: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            posted_products: PathBuf::from("CatalogoProdutos.xlsx"),
            inconsistencies: PathBuf::from("Inconsistencias.xlsx"),
            output: PathBuf::from("planilha_tratada.xlsx"),
            output_sheet: crate::ingest::artifact::DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub database: PathBuf,
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("dados.db"),
            table: "dados".to_string(),
        }
    }
}

/// Secrets accepted by the lookup page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    pub secrets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub references: ReferenceConfig,
    pub store: StoreConfig,
    pub access: AccessConfig,
    pub server: ServerConfig,
    pub pipeline: PipelineSettings,
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("mapa-cli").join("config.toml"))
}

/// Pick the config file: explicit path, then `MAPA_CONFIG`, then the user
/// config directory if a file exists there
pub fn resolve_config_path(raw_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = raw_path {
        return Some(path);
    }

    if let Ok(value) = std::env::var("MAPA_CONFIG") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    user_config_path().filter(|path| path.exists())
}

pub fn load_config_file(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&content).context("Failed to parse TOML config")
}

/// Load the full configuration for this process
pub fn load_config(raw_path: Option<PathBuf>) -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        log::debug!("Loaded environment from {}", path.display());
    }

    let mut config = match resolve_config_path(raw_path) {
        Some(path) => {
            log::debug!("Using config file {}", path.display());
            load_config_file(&path)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Overlay environment variables onto the configuration
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("SHAREPOINT_SITE_URL") {
        config.source.site_url = v;
    }
    if let Some(v) = get("SHAREPOINT_FILE_PATH") {
        config.source.file_path = v;
    }
    if let Some(v) = get("SHAREPOINT_USERNAME") {
        config.source.username = v;
    }
    if let Some(v) = get("SHAREPOINT_PASSWORD") {
        config.source.password = Some(v);
    }
    if let Some(v) = get("SHAREPOINT_TENANT") {
        config.source.tenant = v;
    }
    if let Some(v) = get("SHAREPOINT_CLIENT_ID") {
        config.source.client_id = v;
    }

    for key in ["SENHA_CORRETA", "SENHA_CORRETA1"] {
        if let Some(v) = get(key) {
            if !config.access.secrets.contains(&v) {
                config.access.secrets.push(v);
            }
        }
    }

    if let Some(v) = get("MAPA_DATABASE") {
        config.store.database = PathBuf::from(v);
    }
    if let Some(v) = get("MAPA_TABLE") {
        config.store.table = v;
    }
    if let Some(v) = get("MAPA_POSTED_PRODUCTS") {
        config.references.posted_products = PathBuf::from(v);
    }
    if let Some(v) = get("MAPA_INCONSISTENCIES") {
        config.references.inconsistencies = PathBuf::from(v);
    }
    if let Some(v) = get("MAPA_OUTPUT") {
        config.references.output = PathBuf::from(v);
    }
    if let Some(v) = get("MAPA_HOST") {
        config.server.host = v;
    }
    if let Some(v) = get("MAPA_PORT") {
        config.server.port = v
            .trim()
            .parse()
            .with_context(|| format!("MAPA_PORT is not a valid port: {}", v))?;
    }

    Ok(())
}
