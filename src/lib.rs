pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod session;
pub mod speech;

pub use error::{CatalogError, SessionError};
pub use models::{CardSet, Flashcard, SessionOptions};
pub use session::{SessionController, SessionEvent, SessionState};
