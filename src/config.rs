//! Application configuration.
//!
//! Values are resolved with priority: config.toml > environment (.env) > default.

use crate::models::SessionOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

// ==================== Defaults ====================

pub const DEFAULT_CSV_DIR: &str = "csv_flashcard_files";
pub const DEFAULT_DATABASE_PATH: &str = "flashcards.db";
pub const DEFAULT_NOTION_VERSION: &str = "2021-08-16";
pub const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com/v1";
pub const DEFAULT_SPEECH_COMMAND: &str = "espeak";
/// Words per minute passed to the speech program.
pub const DEFAULT_SPEECH_RATE: u32 = 220;

// ==================== Resolved configuration ====================

/// Where the local catalog lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    #[default]
    Csv,
    Sqlite,
}

impl CatalogSource {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Some(CatalogSource::Csv),
            "sqlite" | "db" => Some(CatalogSource::Sqlite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    pub csv_dir: PathBuf,
    pub database_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotionConfig {
    /// Remote refresh is skipped without a key.
    pub api_key: Option<String>,
    pub version: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: Some(DEFAULT_SPEECH_COMMAND.to_string()),
            args: vec!["-s".to_string(), DEFAULT_SPEECH_RATE.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub notion: NotionConfig,
    pub speech: SpeechConfig,
    pub window: WindowConfig,
    /// Initial state of the options on the selection screen.
    pub session: SessionOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        resolve(RawConfig::default(), |_| None)
    }
}

// ==================== config.toml structure ====================

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    catalog: Option<RawCatalog>,
    notion: Option<RawNotion>,
    speech: Option<SpeechConfig>,
    window: Option<WindowConfig>,
    session: Option<SessionOptions>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCatalog {
    source: Option<CatalogSource>,
    csv_dir: Option<String>,
    database_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNotion {
    api_key: Option<String>,
    version: Option<String>,
    base_url: Option<String>,
}

/// Loads `config.toml` from the working directory, falling back to the
/// environment and defaults for anything it leaves out.
pub fn load() -> AppConfig {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    load_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> AppConfig {
    let raw = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<RawConfig>(&contents) {
            Ok(raw) => {
                tracing::info!("Using configuration from {}", path.display());
                raw
            }
            Err(e) => {
                tracing::warn!("Ignoring invalid {}: {}", path.display(), e);
                RawConfig::default()
            }
        },
        Err(_) => RawConfig::default(),
    };
    resolve(raw, env)
}

fn resolve(raw: RawConfig, env: impl Fn(&str) -> Option<String>) -> AppConfig {
    let catalog = raw.catalog.unwrap_or_default();
    let notion = raw.notion.unwrap_or_default();
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    let source = catalog
        .source
        .or_else(|| non_empty("FLASHCARD_CATALOG_SOURCE").and_then(|v| CatalogSource::parse(&v)))
        .unwrap_or_default();

    let csv_dir = catalog
        .csv_dir
        .or_else(|| non_empty("FLASHCARD_DATA_DIR"))
        .unwrap_or_else(|| DEFAULT_CSV_DIR.to_string());

    let database_path = catalog
        .database_path
        .or_else(|| non_empty("FLASHCARD_DB_PATH"))
        .unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string());

    let api_key = notion
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| non_empty("NOTION_API_KEY"));

    let version = notion
        .version
        .or_else(|| non_empty("NOTION_VERSION"))
        .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string());

    AppConfig {
        catalog: CatalogConfig {
            source,
            csv_dir: PathBuf::from(csv_dir),
            database_path: PathBuf::from(database_path),
        },
        notion: NotionConfig {
            api_key,
            version,
            base_url: notion
                .base_url
                .unwrap_or_else(|| DEFAULT_NOTION_BASE_URL.to_string()),
        },
        speech: raw.speech.unwrap_or_default(),
        window: raw.window.unwrap_or_default(),
        session: raw.session.unwrap_or_default(),
    }
}
