//! Remote refresh from a Notion workspace.
//!
//! Every database shared with the integration becomes one set. Rows are read
//! from a `Term` (or `Name`) title column, a `Definition` text column and an
//! optional `Exclude` checkbox.

use crate::config::NotionConfig;
use crate::error::CatalogError;
use crate::models::{CardSet, Flashcard};
use serde_json::{Value, json};
use std::time::Duration;

use super::csv_store::parse_exclude;

type Result<T> = std::result::Result<T, CatalogError>;

const TERM_COLUMNS: [&str; 2] = ["Term", "Name"];
const DEFINITION_COLUMN: &str = "Definition";
const EXCLUDE_COLUMN: &str = "Exclude";
const PAGE_SIZE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// A shared database found by search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedDatabase {
    pub id: String,
    pub title: String,
}

pub struct NotionClient {
    http: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    version: String,
}

impl NotionClient {
    pub fn new(api_key: &str, config: &NotionConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            version: config.version.clone(),
        })
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.version)
            .json(body)
            .send()?;

        let status = response.status();
        let value: Value = response.json()?;
        if !status.is_success() {
            let message = value["message"].as_str().unwrap_or("no message");
            return Err(CatalogError::Api(format!("{} ({})", message, status)));
        }
        Ok(value)
    }

    /// Follows `next_cursor` until `has_more` is false, collecting `results`.
    fn paginate(&self, path: &str, base_body: Value) -> Result<Vec<Value>> {
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut body = base_body.clone();
            body["page_size"] = json!(PAGE_SIZE);
            if let Some(start) = &cursor {
                body["start_cursor"] = json!(start);
            }

            let page = self.post(path, &body)?;
            let (items, next) = page_results(&page);
            results.extend(items);
            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        Ok(results)
    }

    pub fn search_databases(&self) -> Result<Vec<SharedDatabase>> {
        let body = json!({
            "filter": { "property": "object", "value": "database" }
        });
        let results = self.paginate("search", body)?;
        Ok(results.iter().filter_map(parse_database).collect())
    }

    pub fn query_database(&self, id: &str) -> Result<Vec<Flashcard>> {
        let rows = self.paginate(&format!("databases/{}/query", id), json!({}))?;
        Ok(rows.iter().filter_map(parse_row).collect())
    }

    /// One set per shared database, in search order.
    pub fn fetch_catalog(&self) -> Result<Vec<CardSet>> {
        let databases = self.search_databases()?;
        tracing::info!("Found {} shared Notion databases", databases.len());

        let mut sets = Vec::with_capacity(databases.len());
        for database in databases {
            let cards = self.query_database(&database.id)?;
            tracing::debug!("Notion database '{}' has {} cards", database.title, cards.len());
            sets.push(CardSet::new(database.title, cards));
        }
        Ok(sets)
    }
}

/// Splits a paginated response into its results and the cursor of the next page.
pub fn page_results(page: &Value) -> (Vec<Value>, Option<String>) {
    let items = page["results"].as_array().cloned().unwrap_or_default();
    let next = if page["has_more"].as_bool().unwrap_or(false) {
        page["next_cursor"].as_str().map(|s| s.to_string())
    } else {
        None
    };
    (items, next)
}

/// Concatenated plain text of a rich text or title array.
fn plain_text(fragments: &Value) -> String {
    fragments
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| {
                    part["plain_text"]
                        .as_str()
                        .or_else(|| part["text"]["content"].as_str())
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Text of a title or rich_text property.
fn property_text(property: &Value) -> Option<String> {
    let text = match property["type"].as_str() {
        Some("title") => plain_text(&property["title"]),
        Some("rich_text") => plain_text(&property["rich_text"]),
        _ => {
            if property["title"].is_array() {
                plain_text(&property["title"])
            } else if property["rich_text"].is_array() {
                plain_text(&property["rich_text"])
            } else {
                return None;
            }
        }
    };
    Some(text)
}

pub fn parse_database(object: &Value) -> Option<SharedDatabase> {
    if object["object"].as_str() != Some("database") {
        return None;
    }
    let id = object["id"].as_str()?.to_string();
    let title = plain_text(&object["title"]);
    if title.trim().is_empty() {
        return None;
    }
    Some(SharedDatabase { id, title })
}

/// Reads one database row. Rows without a term are skipped.
pub fn parse_row(row: &Value) -> Option<Flashcard> {
    let properties = &row["properties"];

    let term = TERM_COLUMNS
        .iter()
        .filter_map(|column| property_text(&properties[*column]))
        .find(|text| !text.trim().is_empty())?;

    let definition = property_text(&properties[DEFINITION_COLUMN]).unwrap_or_default();

    let exclude_property = &properties[EXCLUDE_COLUMN];
    let exclude = match exclude_property["checkbox"].as_bool() {
        Some(checked) => checked,
        None => property_text(exclude_property).is_some_and(|text| parse_exclude(&text)),
    };

    Some(Flashcard {
        term,
        definition,
        exclude,
    })
}
