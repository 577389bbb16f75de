//! Events module for core notifications
//!
//! Everything the presentation layer reacts to (status text, accent color,
//! captions, music, confirmation overlay) is published as a [`CoreEvent`]
//! on a broadcast channel.

use serde::{Deserialize, Serialize};

use crate::state::{CommandToken, Track};

/// Text shown by the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusText {
    Active,
    Standby,
    Offline,
    Thinking,
}

impl std::fmt::Display for StatusText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusText::Active => write!(f, "ACTIVE"),
            StatusText::Standby => write!(f, "STANDBY"),
            StatusText::Offline => write!(f, "SYSTEM OFFLINE"),
            StatusText::Thinking => write!(f, "THINKING"),
        }
    }
}

/// Events emitted by the pipeline for external collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CoreEvent {
    /// Status indicator text changed
    StatusChanged { status: StatusText },

    /// Accent color of the visual theme changed
    AccentColorChanged { name: String, hex: String },

    /// Input switched between voice and text
    InputModeChanged { voice: bool },

    /// Text mode was entered; the text field should take focus
    TextInputFocusRequested,

    /// Audio collaborator should start a track
    MusicRequested { track: Track },

    /// Audio collaborator should stop playback
    MusicStopped,

    /// Synthesis of a reply began
    SpeechStarted { utterance_id: u64, text: String },

    /// An utterance was preempted by a newer one
    SpeechCancelled { utterance_id: u64 },

    /// An utterance played to completion
    SpeechFinished { utterance_id: u64 },

    /// Caption line changed
    CaptionUpdated { text: String },

    /// Caption shown (utterance start) or faded out (utterance end)
    CaptionVisibilityChanged { visible: bool },

    /// A command is waiting for approval
    ConfirmationRequested { command: CommandToken },

    /// The pending command was approved or discarded
    ConfirmationResolved { approved: bool },
}

impl std::fmt::Display for CoreEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreEvent::StatusChanged { status } => write!(f, "STATUS_CHANGED ({})", status),
            CoreEvent::AccentColorChanged { name, hex } => {
                write!(f, "ACCENT_COLOR_CHANGED ({} {})", name, hex)
            }
            CoreEvent::InputModeChanged { voice } => {
                write!(f, "INPUT_MODE_CHANGED ({})", if *voice { "voice" } else { "text" })
            }
            CoreEvent::TextInputFocusRequested => write!(f, "TEXT_INPUT_FOCUS_REQUESTED"),
            CoreEvent::MusicRequested { track } => write!(f, "MUSIC_REQUESTED ({})", track),
            CoreEvent::MusicStopped => write!(f, "MUSIC_STOPPED"),
            CoreEvent::SpeechStarted { utterance_id, .. } => {
                write!(f, "SPEECH_STARTED (#{})", utterance_id)
            }
            CoreEvent::SpeechCancelled { utterance_id } => {
                write!(f, "SPEECH_CANCELLED (#{})", utterance_id)
            }
            CoreEvent::SpeechFinished { utterance_id } => {
                write!(f, "SPEECH_FINISHED (#{})", utterance_id)
            }
            CoreEvent::CaptionUpdated { text } => write!(f, "CAPTION_UPDATED ({})", text),
            CoreEvent::CaptionVisibilityChanged { visible } => {
                write!(f, "CAPTION_VISIBILITY_CHANGED ({})", visible)
            }
            CoreEvent::ConfirmationRequested { command } => {
                write!(f, "CONFIRMATION_REQUESTED ({})", command)
            }
            CoreEvent::ConfirmationResolved { approved } => {
                write!(f, "CONFIRMATION_RESOLVED (approved={})", approved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::AccentColorChanged {
            name: "teal".into(),
            hex: "#008080".into(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("accent_color_changed"));
        assert!(json.contains("#008080"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"status_changed","status":"offline"}"#;
        let event: CoreEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            CoreEvent::StatusChanged {
                status: StatusText::Offline
            }
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StatusText::Offline.to_string(), "SYSTEM OFFLINE");
        assert_eq!(StatusText::Thinking.to_string(), "THINKING");
    }
}
