//! Speech synthesis backends

use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, trace};

use super::caption::CaptionTrack;

/// Rate/pitch pair applied to an utterance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceProfile {
    pub rate: f32,
    pub pitch: f32,
}

impl VoiceProfile {
    /// Profile for a session voice index; indices wrap
    pub fn for_index(index: usize) -> Self {
        match index % 3 {
            1 => Self {
                rate: 0.9,
                pitch: 0.8,
            },
            2 => Self {
                rate: 1.1,
                pitch: 1.2,
            },
            _ => Self {
                rate: 1.0,
                pitch: 1.0,
            },
        }
    }
}

/// One reply to be spoken
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub id: u64,
    pub text: String,
    pub profile: VoiceProfile,
}

/// Errors that can occur while speaking
#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("audio output failed: {0}")]
    Output(#[from] std::io::Error),
}

/// A text-to-speech engine
///
/// Implementations send the byte offset of each word as it is reached on
/// `boundaries` and return once the utterance has finished playing. Dropping
/// the returned future stops playback.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn speak(
        &self,
        utterance: &Utterance,
        boundaries: mpsc::Sender<usize>,
    ) -> Result<(), SpeechError>;
}

/// Writes replies to stdout and paces word boundaries like real speech
pub struct ConsoleSynthesizer {
    words_per_minute: u32,
}

impl ConsoleSynthesizer {
    pub fn new(words_per_minute: u32) -> Self {
        Self {
            words_per_minute: words_per_minute.max(1),
        }
    }

    fn word_duration(&self, profile: VoiceProfile) -> Duration {
        let base = 60.0 / self.words_per_minute as f32;
        Duration::from_secs_f32(base / profile.rate.max(0.1))
    }
}

#[async_trait]
impl Synthesizer for ConsoleSynthesizer {
    async fn speak(
        &self,
        utterance: &Utterance,
        boundaries: mpsc::Sender<usize>,
    ) -> Result<(), SpeechError> {
        let line = format!("jarvis> {}\n", utterance.text);
        let mut stdout = tokio::io::stdout();
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;

        let per_word = self.word_duration(utterance.profile);
        debug!(
            id = utterance.id,
            rate = utterance.profile.rate,
            pitch = utterance.profile.pitch,
            "speaking on console"
        );
        let track = CaptionTrack::new(&utterance.text);

        for &offset in track.word_starts() {
            trace!(id = utterance.id, offset, "word boundary");
            if boundaries.send(offset).await.is_err() {
                break;
            }
            tokio::time::sleep(per_word).await;
        }

        Ok(())
    }
}
