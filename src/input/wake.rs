//! Wake-word admission and debounce for the voice channel

use std::time::{Duration, Instant};

use tracing::debug;

/// Admits voice utterances that start with the wake word
///
/// Each admitted utterance locks the voice channel for the cool-down window,
/// so the assistant does not react to its own speech or to rapid repeats.
#[derive(Debug, Clone)]
pub struct InputGate {
    wake_word: String,
    cooldown: Duration,
    locked_until: Option<Instant>,
}

impl InputGate {
    pub fn new(wake_word: &str, cooldown: Duration) -> Self {
        Self {
            wake_word: wake_word.trim().to_lowercase(),
            cooldown,
            locked_until: None,
        }
    }

    /// Whether the voice channel is still cooling down at `now`
    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Return the command text of an admitted utterance
    ///
    /// The transcript is lower-cased and the wake word stripped. `None` means
    /// the utterance was dropped.
    pub fn admit(&mut self, transcript: &str, now: Instant) -> Option<String> {
        if self.is_locked(now) {
            debug!(transcript, "voice input locked, dropping utterance");
            return None;
        }

        let text = transcript.trim().to_lowercase();
        let Some(rest) = text.strip_prefix(&self.wake_word) else {
            debug!(transcript, "no wake word, dropping utterance");
            return None;
        };

        self.locked_until = Some(now + self.cooldown);
        Some(
            rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace())
                .trim_end()
                .to_string(),
        )
    }
}
