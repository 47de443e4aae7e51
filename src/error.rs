//! Error types for the study session and the catalog collaborators.

use thiserror::Error;

use crate::session::SessionState;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("cannot {operation} while the session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },

    #[error("nothing selected: the deck has no cards to study")]
    EmptyDeck,

    #[error("invalid session options: {0}")]
    Configuration(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(Box<reqwest::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("notes API error: {0}")]
    Api(String),

    #[error("not a card set file: {0}")]
    InvalidSetFile(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(error: std::io::Error) -> Self {
        CatalogError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(error: reqwest::Error) -> Self {
        CatalogError::Http(Box::new(error))
    }
}
