//! Text-to-speech for read-aloud sessions.
//!
//! The session only ever calls [`Speaker::speak`] and never waits on it.
//! A new utterance interrupts the one still playing.

use crate::config::SpeechConfig;
use std::cell::RefCell;
use std::process::{Child, Command, Stdio};

pub trait Speaker {
    fn speak(&self, text: &str);
}

/// Says nothing.
pub struct SilentSpeaker;

impl Speaker for SilentSpeaker {
    fn speak(&self, _text: &str) {}
}

/// Speaks by spawning a system TTS program such as `espeak` or `say`.
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
    current: RefCell<Option<Child>>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: RefCell::new(None),
        }
    }

    fn interrupt(&self) {
        if let Some(mut child) = self.current.borrow_mut().take() {
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.interrupt();

        match Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => {
                *self.current.borrow_mut() = Some(child);
            }
            Err(e) => {
                tracing::warn!("Failed to start speech program '{}': {}", self.program, e);
            }
        }
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.interrupt();
    }
}

/// Builds the speaker for a session. Read-aloud off means silence.
pub fn speaker_from_config(config: &SpeechConfig, read_aloud: bool) -> Box<dyn Speaker> {
    if !read_aloud {
        return Box::new(SilentSpeaker);
    }
    match config.command.as_deref() {
        Some(program) if !program.trim().is_empty() => {
            Box::new(CommandSpeaker::new(program, config.args.clone()))
        }
        _ => {
            tracing::warn!("Read aloud requested but no speech command is configured");
            Box::new(SilentSpeaker)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_does_not_panic() {
        let speaker = CommandSpeaker::new("definitely-not-a-tts-program-xyz", Vec::new());
        speaker.speak("hello");
        assert!(speaker.current.borrow().is_none());
    }

    #[test]
    fn test_blank_text_is_skipped() {
        let speaker = CommandSpeaker::new("definitely-not-a-tts-program-xyz", Vec::new());
        speaker.speak("   ");
        assert!(speaker.current.borrow().is_none());
    }

    #[test]
    fn test_read_aloud_off_is_silent() {
        let config = SpeechConfig {
            command: Some("definitely-not-a-tts-program-xyz".to_string()),
            args: Vec::new(),
        };
        let speaker = speaker_from_config(&config, false);
        speaker.speak("anything");
    }
}
