//! Loading the catalog of card sets.
//!
//! The local store (CSV directory or SQLite database) is the source of truth.
//! When a Notion key is configured the shared databases are fetched first and
//! written into the local store. Failures on either path are logged and never
//! reach the study session: the worst case is an empty catalog.

pub mod csv_store;
pub mod notion;

use crate::config::{AppConfig, CatalogSource};
use crate::database::db;
use crate::error::CatalogError;
use crate::models::{CardSet, Flashcard};
use std::time::Instant;

use notion::NotionClient;

type Result<T> = std::result::Result<T, CatalogError>;

/// Reads every set from the configured local store.
pub fn load_local(config: &AppConfig) -> Result<Vec<CardSet>> {
    match config.catalog.source {
        CatalogSource::Csv => csv_store::load_dir(&config.catalog.csv_dir),
        CatalogSource::Sqlite => {
            let conn = db::init_database(&config.catalog.database_path)?;
            Ok(db::load_all_sets(&conn)?)
        }
    }
}

/// Writes sets into the configured local store, replacing same-named sets.
pub fn persist_sets(config: &AppConfig, sets: &[CardSet]) -> Result<()> {
    match config.catalog.source {
        CatalogSource::Csv => {
            for set in sets {
                csv_store::write_set(&config.catalog.csv_dir, set)?;
            }
        }
        CatalogSource::Sqlite => {
            let mut conn = db::init_database(&config.catalog.database_path)?;
            for set in sets {
                db::replace_set(set, &mut conn)?;
            }
        }
    }
    Ok(())
}

/// Fetches every shared Notion database and stores it locally.
/// Returns `None` when no API key is configured.
pub fn refresh_remote(config: &AppConfig) -> Result<Option<usize>> {
    let Some(api_key) = config.notion.api_key.as_deref() else {
        return Ok(None);
    };
    let client = NotionClient::new(api_key, &config.notion)?;
    let sets = client.fetch_catalog()?;
    persist_sets(config, &sets)?;
    Ok(Some(sets.len()))
}

/// Starter set written on first run so the selection list is not empty.
pub fn sample_set() -> CardSet {
    CardSet::new(
        "Polish Vocabulary",
        vec![
            Flashcard::new("cześć", "hello"),
            Flashcard::new("dziękuję", "thank you"),
            Flashcard::new("proszę", "please"),
        ],
    )
}

/// Refreshes from Notion if configured, then loads the local store.
pub fn load_catalog(config: &AppConfig) -> Vec<CardSet> {
    let start = Instant::now();
    match refresh_remote(config) {
        Ok(Some(count)) => tracing::info!(
            "Retrieved {} sets from Notion in {:.2} seconds",
            count,
            start.elapsed().as_secs_f64()
        ),
        Ok(None) => tracing::debug!("No Notion API key configured, skipping remote refresh"),
        Err(e) => tracing::warn!(
            "Failed to refresh flashcard sets from Notion, using local sets: {}",
            e
        ),
    }

    match load_local(config) {
        Ok(sets) => {
            tracing::info!("Loaded {} flashcard sets", sets.len());
            sets
        }
        Err(e) => {
            tracing::warn!("Failed to load local flashcard sets: {}", e);
            Vec::new()
        }
    }
}
