pub mod card_set;
pub mod flashcard;
pub mod session_options;

pub use card_set::{CardSet, Catalog};
pub use flashcard::{Flashcard, Side};
pub use session_options::SessionOptions;
