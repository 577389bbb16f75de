//! Speech and caption rendering
//!
//! Each reply is spoken on its own task. Starting a new reply aborts the
//! task of the previous one, so at most one utterance is ever in flight.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::events::CoreEvent;
use crate::state::SessionState;

use super::caption::CaptionTrack;
use super::synth::{Synthesizer, Utterance, VoiceProfile};

struct InFlight {
    id: u64,
    task: JoinHandle<()>,
}

/// Turns replies into speech and synchronized captions
pub struct SpeechRenderer {
    synthesizer: Arc<dyn Synthesizer>,
    event_tx: broadcast::Sender<CoreEvent>,
    captions_enabled: bool,
    next_id: u64,
    in_flight: Option<InFlight>,
}

impl SpeechRenderer {
    pub fn new(
        synthesizer: Arc<dyn Synthesizer>,
        event_tx: broadcast::Sender<CoreEvent>,
        captions_enabled: bool,
    ) -> Self {
        Self {
            synthesizer,
            event_tx,
            captions_enabled,
            next_id: 1,
            in_flight: None,
        }
    }

    pub fn captions_enabled(&self) -> bool {
        self.captions_enabled
    }

    pub fn set_captions(&mut self, enabled: bool) {
        debug!(enabled, "captions toggled");
        self.captions_enabled = enabled;
    }

    /// Speak a reply, preempting whatever is currently playing
    ///
    /// Returns the utterance id, or `None` when the session is muted.
    pub fn speak(&mut self, text: &str, session: &SessionState) -> Option<u64> {
        if session.muted {
            debug!(text, "muted, reply not spoken");
            return None;
        }

        self.cancel();

        let id = self.next_id;
        self.next_id += 1;

        let utterance = Utterance {
            id,
            text: text.to_string(),
            profile: VoiceProfile::for_index(session.voice_profile),
        };

        let _ = self.event_tx.send(CoreEvent::SpeechStarted {
            utterance_id: id,
            text: utterance.text.clone(),
        });

        let task = tokio::spawn(run_utterance(
            Arc::clone(&self.synthesizer),
            self.event_tx.clone(),
            utterance,
            self.captions_enabled,
        ));
        self.in_flight = Some(InFlight { id, task });

        Some(id)
    }

    /// Stop the in-flight utterance, if it has not finished yet
    pub fn cancel(&mut self) {
        let Some(previous) = self.in_flight.take() else {
            return;
        };
        if previous.task.is_finished() {
            return;
        }

        previous.task.abort();
        debug!(id = previous.id, "utterance preempted");
        let _ = self.event_tx.send(CoreEvent::SpeechCancelled {
            utterance_id: previous.id,
        });
    }

    /// Wait for the in-flight utterance to finish playing
    pub async fn finish(&mut self) {
        if let Some(current) = self.in_flight.take() {
            if let Err(e) = current.task.await {
                if !e.is_cancelled() {
                    warn!(?e, id = current.id, "utterance task failed");
                }
            }
        }
    }
}

/// Play one utterance and drive its captions
async fn run_utterance(
    synthesizer: Arc<dyn Synthesizer>,
    event_tx: broadcast::Sender<CoreEvent>,
    utterance: Utterance,
    captions: bool,
) {
    let track = CaptionTrack::new(&utterance.text);
    debug!(id = utterance.id, words = track.word_count(), "utterance started");
    let (boundary_tx, mut boundary_rx) = mpsc::channel::<usize>(32);

    if captions {
        let _ = event_tx.send(CoreEvent::CaptionVisibilityChanged { visible: true });
    }

    let playback = synthesizer.speak(&utterance, boundary_tx);
    let follow = async {
        let mut shown: Option<String> = None;
        while let Some(offset) = boundary_rx.recv().await {
            if !captions {
                continue;
            }
            let line = track.line_at(offset);
            if shown.as_deref() != Some(line.as_str()) {
                let _ = event_tx.send(CoreEvent::CaptionUpdated { text: line.clone() });
                shown = Some(line);
            }
        }
    };

    let (result, ()) = tokio::join!(playback, follow);
    if let Err(e) = result {
        warn!(%e, id = utterance.id, "speech synthesis failed");
    }

    if captions {
        let _ = event_tx.send(CoreEvent::CaptionVisibilityChanged { visible: false });
    }
    let _ = event_tx.send(CoreEvent::SpeechFinished {
        utterance_id: utterance.id,
    });
}
