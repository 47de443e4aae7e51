//! Everything that happens between pressing START and the end of a deck.

pub mod controller;
pub mod deck;
pub mod timer;

pub use controller::{
    CardPosition, SessionController, SessionEvent, SessionObserver, SessionState,
};
pub use deck::{build_deck, build_deck_default};
pub use timer::{AutoflipTimer, Clock, ManualClock, MonotonicClock, TimerAction};
