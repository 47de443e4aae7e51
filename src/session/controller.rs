//! Study session state machine.
//!
//! One controller drives one pass through a deck: it owns the cursor, the
//! flipped state of the current card and the autoflip timer, pushes what to
//! show to a [`SessionObserver`], and asks a [`Speaker`] to read faces aloud.
//! The presentation layer forwards user intents and pumps [`SessionController::poll`]
//! from its event loop; the controller never reaches back into rendering.

use std::fmt;
use std::sync::mpsc::Sender;
use std::time::Duration;

use super::timer::{AutoflipTimer, Clock, TimerAction};
use crate::error::SessionError;
use crate::models::{Flashcard, SessionOptions, Side};
use crate::speech::Speaker;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    ShowingFront,
    ShowingBack,
    /// Terminal. The controller is dropped afterwards.
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::NotStarted => "not started",
            SessionState::ShowingFront => "showing the front of a card",
            SessionState::ShowingBack => "showing the back of a card",
            SessionState::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// 1-based position of the shown card, e.g. `2/10`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardPosition {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for CardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    CardShown { face: String, position: CardPosition },
    SessionEnded,
    PauseStateChanged(bool),
}

/// Receives state changes pushed by the controller.
pub trait SessionObserver {
    fn on_card_shown(&mut self, face: &str, position: CardPosition);
    fn on_session_ended(&mut self);
    fn on_pause_state_changed(&mut self, paused: bool);
}

/// Forwards every notification as a [`SessionEvent`]. A dropped receiver is ignored.
impl SessionObserver for Sender<SessionEvent> {
    fn on_card_shown(&mut self, face: &str, position: CardPosition) {
        let _ = self.send(SessionEvent::CardShown {
            face: face.to_string(),
            position,
        });
    }

    fn on_session_ended(&mut self) {
        let _ = self.send(SessionEvent::SessionEnded);
    }

    fn on_pause_state_changed(&mut self, paused: bool) {
        let _ = self.send(SessionEvent::PauseStateChanged(paused));
    }
}

pub struct SessionController {
    options: SessionOptions,
    deck: Vec<Flashcard>,
    /// `None` until the first card is shown.
    cursor: Option<usize>,
    flipped: bool,
    state: SessionState,
    timer: AutoflipTimer,
    timer_paused: bool,
    clock: Box<dyn Clock>,
    observer: Box<dyn SessionObserver>,
    speaker: Box<dyn Speaker>,
}

impl SessionController {
    pub fn new(
        options: SessionOptions,
        clock: Box<dyn Clock>,
        observer: Box<dyn SessionObserver>,
        speaker: Box<dyn Speaker>,
    ) -> Self {
        Self {
            options,
            deck: Vec::new(),
            cursor: None,
            flipped: false,
            state: SessionState::NotStarted,
            timer: AutoflipTimer::new(),
            timer_paused: false,
            clock,
            observer,
            speaker,
        }
    }

    /// Shows the first card of `deck`.
    ///
    /// Options are validated first; an invalid interval or an empty deck leaves
    /// the controller in `NotStarted`.
    pub fn start(&mut self, deck: Vec<Flashcard>) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(self.invalid("start"));
        }
        self.options.validate()?;
        if deck.is_empty() {
            return Err(SessionError::EmptyDeck);
        }

        tracing::info!(
            "Starting study session with {} cards (randomize: {}, autoflip: {})",
            deck.len(),
            self.options.randomize,
            self.options.autoflip
        );
        self.deck = deck;
        self.cursor = None;
        self.show_card(0);
        Ok(())
    }

    /// Turns the current card over. Flipping a card that already shows its
    /// back turns it to the front again.
    pub fn flip(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::ShowingFront => {
                self.timer.cancel();
                self.flipped = true;
                self.state = SessionState::ShowingBack;
            }
            SessionState::ShowingBack => {
                self.timer.cancel();
                self.flipped = false;
                self.state = SessionState::ShowingFront;
            }
            SessionState::NotStarted | SessionState::Finished => {
                return Err(self.invalid("flip"));
            }
        }
        tracing::debug!("Flipped card {:?} (flipped: {})", self.cursor, self.flipped);
        self.present();
        Ok(())
    }

    /// Moves to the next card, or finishes the session after the last one.
    pub fn next(&mut self) -> Result<(), SessionError> {
        let current = self.showing_cursor("go to the next card")?;
        self.timer.cancel();
        if current + 1 >= self.deck.len() {
            self.finish();
        } else {
            self.show_card(current + 1);
        }
        Ok(())
    }

    /// Moves to the previous card. Does nothing on the first card.
    pub fn back(&mut self) -> Result<(), SessionError> {
        let current = self.showing_cursor("go back")?;
        if current == 0 {
            tracing::debug!("Ignoring back on the first card");
            return Ok(());
        }
        self.timer.cancel();
        self.show_card(current - 1);
        Ok(())
    }

    pub fn toggle_pause_timer(&mut self) -> Result<(), SessionError> {
        if self.timer_paused {
            self.resume_timer()
        } else {
            self.pause_timer()
        }
    }

    /// Stops the autoflip countdown, keeping the time it had left.
    /// Pausing an already paused timer is a no-op.
    pub fn pause_timer(&mut self) -> Result<(), SessionError> {
        self.check_timer_control("pause the timer")?;
        if self.timer_paused {
            return Ok(());
        }
        let now = self.clock.now();
        if let Some(remaining) = self.timer.pause(now) {
            tracing::debug!("Autoflip paused with {:?} remaining", remaining);
        }
        self.timer_paused = true;
        self.observer.on_pause_state_changed(true);
        Ok(())
    }

    /// Restarts the countdown for exactly the time left when it was paused.
    /// Resuming a running timer is a no-op.
    pub fn resume_timer(&mut self) -> Result<(), SessionError> {
        self.check_timer_control("resume the timer")?;
        if !self.timer_paused {
            return Ok(());
        }
        self.timer_paused = false;
        let now = self.clock.now();
        if !self.timer.resume(now) {
            self.rearm();
        }
        tracing::debug!("Autoflip resumed with {:?} remaining", self.timer.remaining(now));
        self.observer.on_pause_state_changed(false);
        Ok(())
    }

    /// Ends the session immediately, wherever it is in the deck.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        if self.state == SessionState::Finished {
            return Err(self.invalid("quit"));
        }
        self.finish();
        Ok(())
    }

    /// Runs the autoflip action if its deadline has passed. Returns whether it fired.
    pub fn poll(&mut self) -> Result<bool, SessionError> {
        if !self.is_showing() {
            return Ok(false);
        }
        let now = self.clock.now();
        match self.timer.take_due(now) {
            Some(TimerAction::Flip) => {
                tracing::debug!("Autoflip timer fired: flip");
                self.flip()?;
                Ok(true)
            }
            Some(TimerAction::Advance) => {
                tracing::debug!("Autoflip timer fired: next card");
                self.next()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// How long until the running timer fires. `None` when paused or idle.
    pub fn time_until_timer(&self) -> Option<Duration> {
        if self.timer.is_armed() {
            self.timer.remaining(self.clock.now())
        } else {
            None
        }
    }

    /// Time left on the timer, running or paused.
    pub fn timer_remaining(&self) -> Option<Duration> {
        self.timer.remaining(self.clock.now())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn is_timer_paused(&self) -> bool {
        self.timer_paused
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        if !self.is_showing() {
            return None;
        }
        self.cursor.and_then(|index| self.deck.get(index))
    }

    pub fn current_face(&self) -> Option<&str> {
        let side = self.current_side();
        self.current_card().map(|card| card.face(side))
    }

    pub fn position(&self) -> Option<CardPosition> {
        if !self.is_showing() {
            return None;
        }
        self.cursor.map(|index| CardPosition {
            current: index + 1,
            total: self.deck.len(),
        })
    }

    fn current_side(&self) -> Side {
        let front = self.options.front_side();
        if self.flipped { front.other() } else { front }
    }

    fn is_showing(&self) -> bool {
        matches!(
            self.state,
            SessionState::ShowingFront | SessionState::ShowingBack
        )
    }

    fn showing_cursor(&self, operation: &'static str) -> Result<usize, SessionError> {
        match self.cursor {
            Some(index) if self.is_showing() => Ok(index),
            _ => Err(self.invalid(operation)),
        }
    }

    fn check_timer_control(&self, operation: &'static str) -> Result<(), SessionError> {
        if self.options.autoflip && self.is_showing() {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            state: self.state,
        }
    }

    fn show_card(&mut self, index: usize) {
        self.cursor = Some(index);
        self.flipped = false;
        self.state = SessionState::ShowingFront;
        tracing::debug!("Showing card {}/{}", index + 1, self.deck.len());
        self.present();
    }

    /// Pushes the current face out and re-arms the timer for it.
    fn present(&mut self) {
        let (Some(face), Some(position)) = (self.current_face(), self.position()) else {
            return;
        };
        let face = face.to_string();
        self.observer.on_card_shown(&face, position);
        if self.options.read_aloud {
            self.speaker.speak(&face);
        }
        self.rearm();
    }

    /// Attaches a fresh full-interval timer to the current face. A front face
    /// flips when it fires, a back face advances. While paused the action is
    /// only held until resume.
    fn rearm(&mut self) {
        self.timer.cancel();
        if !self.options.autoflip {
            return;
        }
        let action = if self.flipped {
            TimerAction::Advance
        } else {
            TimerAction::Flip
        };
        let interval = self.options.autoflip_interval();
        if self.timer_paused {
            self.timer.hold(action, interval);
        } else {
            self.timer.arm(action, interval, self.clock.now());
        }
    }

    fn finish(&mut self) {
        self.timer.cancel();
        self.state = SessionState::Finished;
        tracing::info!("Study session ended");
        self.observer.on_session_ended();
    }
}
