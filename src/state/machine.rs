//! Core state machine implementation
//!
//! Owns the session state and is the only place it is mutated. Commands are
//! applied through [`StateMachine::execute`], which enforces the activation
//! guard and returns the reply to speak, if any.

use std::time::Instant;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::events::{CoreEvent, StatusText};

use super::command::{color_hex, CommandToken, PALETTE};

/// Number of selectable voice profiles
pub const VOICE_PROFILES: usize = 3;

/// The three activation states
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// Ignoring everything except Activate
    #[default]
    Offline,
    /// Accepting commands
    Active,
    /// Accepting commands, dimmed
    Standby,
}

impl std::fmt::Display for ActivationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivationState::Offline => write!(f, "Offline"),
            ActivationState::Active => write!(f, "Active"),
            ActivationState::Standby => write!(f, "Standby"),
        }
    }
}

/// Process-wide session flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub activated: bool,
    /// Only meaningful while `activated`
    pub standby: bool,
    pub muted: bool,
    /// Voice input accepted when true, typed input otherwise
    pub voice_mode: bool,
    /// Never holds `Repeat`
    pub last_command: Option<CommandToken>,
    pub voice_profile: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            activated: false,
            standby: false,
            muted: false,
            voice_mode: true,
            last_command: None,
            voice_profile: 0,
        }
    }
}

impl SessionState {
    pub fn activation(&self) -> ActivationState {
        match (self.activated, self.standby) {
            (false, _) => ActivationState::Offline,
            (true, false) => ActivationState::Active,
            (true, true) => ActivationState::Standby,
        }
    }
}

/// The state machine that applies commands to the session
pub struct StateMachine {
    session: SessionState,
    /// Time when the current activation state was entered
    state_entered_at: Instant,
    event_tx: broadcast::Sender<CoreEvent>,
}

impl StateMachine {
    /// Create a new state machine in the Offline state
    pub fn new(event_tx: broadcast::Sender<CoreEvent>) -> Self {
        Self {
            session: SessionState::default(),
            state_entered_at: Instant::now(),
            event_tx,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn state(&self) -> ActivationState {
        self.session.activation()
    }

    /// Apply a command and return the reply to speak
    ///
    /// Anything other than `Activate` is dropped without a reply while the
    /// system is offline.
    pub fn execute(&mut self, cmd: CommandToken) -> Option<String> {
        if cmd != CommandToken::Activate && !self.session.activated {
            debug!(command = %cmd, "ignoring command while offline");
            return None;
        }

        if cmd == CommandToken::Repeat {
            return self.repeat();
        }

        self.session.last_command = Some(cmd.clone());
        Some(self.apply(cmd))
    }

    /// Re-run the last stored command, one level deep
    fn repeat(&mut self) -> Option<String> {
        let Some(last) = self.session.last_command.clone() else {
            debug!("nothing to repeat");
            return None;
        };
        debug_assert!(last != CommandToken::Repeat);

        info!(command = %last, "repeating last command");
        let inner = self.apply(last);
        debug!(reply = %inner, "repeated command reply superseded");
        Some("Repeating Last Command".to_string())
    }

    fn apply(&mut self, cmd: CommandToken) -> String {
        match cmd {
            CommandToken::Activate => {
                self.session.activated = true;
                self.session.standby = false;
                self.transition_to(ActivationState::Active);
                "Activated".to_string()
            }
            CommandToken::Deactivate => {
                self.session.activated = false;
                self.session.standby = false;
                self.transition_to(ActivationState::Offline);
                "Deactivated".to_string()
            }
            CommandToken::Standby => {
                self.session.standby = true;
                self.transition_to(ActivationState::Standby);
                "Entering Standby Mode".to_string()
            }
            CommandToken::Resume => {
                self.session.standby = false;
                self.transition_to(ActivationState::Active);
                "Resuming".to_string()
            }
            CommandToken::Mute => {
                self.session.muted = true;
                "Muted".to_string()
            }
            CommandToken::Unmute => {
                self.session.muted = false;
                "Voice Restored".to_string()
            }
            CommandToken::ChangeVoice => {
                self.session.voice_profile = (self.session.voice_profile + 1) % VOICE_PROFILES;
                debug!(profile = self.session.voice_profile, "voice profile changed");
                "Voice Changed Successfully".to_string()
            }
            CommandToken::ToggleInputMode => {
                self.session.voice_mode = !self.session.voice_mode;
                let voice = self.session.voice_mode;
                self.emit(CoreEvent::InputModeChanged { voice });
                if voice {
                    "Input Changed to Voice".to_string()
                } else {
                    self.emit(CoreEvent::TextInputFocusRequested);
                    "Input Changed to Text".to_string()
                }
            }
            CommandToken::SetColor(name) => match color_hex(&name) {
                Some(hex) => self.set_accent(&name, hex),
                None => "Color not recognized".to_string(),
            },
            CommandToken::RandomColor => {
                let (name, hex) = PALETTE
                    .choose(&mut rand::thread_rng())
                    .copied()
                    .unwrap_or(PALETTE[0]);
                self.set_accent(name, hex)
            }
            CommandToken::Status => "All Commands Operational".to_string(),
            CommandToken::PlayMusic(track) => {
                self.emit(CoreEvent::MusicRequested { track });
                format!("{} music playing", track)
            }
            CommandToken::StopMusic => {
                self.emit(CoreEvent::MusicStopped);
                "Music stopped".to_string()
            }
            // Handled by `execute`; a stored command is never Repeat.
            CommandToken::Repeat => String::new(),
        }
    }

    fn set_accent(&self, name: &str, hex: &str) -> String {
        self.emit(CoreEvent::AccentColorChanged {
            name: name.to_string(),
            hex: hex.to_string(),
        });
        format!("Color changed to {}", name)
    }

    /// Record a transition and publish the matching status text
    ///
    /// Re-entering the current state still republishes the status.
    fn transition_to(&mut self, new_state: ActivationState) {
        let duration_ms = self.state_entered_at.elapsed().as_millis() as u64;
        info!(to = %new_state, duration_ms, "state transition");
        self.state_entered_at = Instant::now();

        let status = match new_state {
            ActivationState::Offline => StatusText::Offline,
            ActivationState::Active => StatusText::Active,
            ActivationState::Standby => StatusText::Standby,
        };
        self.emit(CoreEvent::StatusChanged { status });
    }

    fn emit(&self, event: CoreEvent) {
        debug!(%event, "emitting event");
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Track;

    fn create_state_machine() -> (StateMachine, broadcast::Receiver<CoreEvent>) {
        let (tx, rx) = broadcast::channel(64);
        (StateMachine::new(tx), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<CoreEvent>) -> Vec<CoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn all_commands() -> Vec<CommandToken> {
        vec![
            CommandToken::Deactivate,
            CommandToken::Standby,
            CommandToken::Resume,
            CommandToken::Mute,
            CommandToken::Unmute,
            CommandToken::ChangeVoice,
            CommandToken::Repeat,
            CommandToken::SetColor("teal".into()),
            CommandToken::RandomColor,
            CommandToken::ToggleInputMode,
            CommandToken::Status,
            CommandToken::PlayMusic(Track::Chill),
            CommandToken::StopMusic,
        ]
    }

    #[test]
    fn test_initial_state() {
        let (sm, _) = create_state_machine();
        assert_eq!(sm.state(), ActivationState::Offline);
        assert!(sm.session().voice_mode);
        assert_eq!(sm.session().last_command, None);
    }

    #[test]
    fn test_offline_ignores_everything_but_activate() {
        let (mut sm, mut rx) = create_state_machine();
        let before = sm.session().clone();

        for cmd in all_commands() {
            assert_eq!(sm.execute(cmd), None);
        }

        assert_eq!(sm.session(), &before);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_activate_from_any_state_clears_standby() {
        let (mut sm, mut rx) = create_state_machine();

        assert_eq!(sm.execute(CommandToken::Activate).as_deref(), Some("Activated"));
        assert_eq!(sm.state(), ActivationState::Active);

        sm.execute(CommandToken::Standby);
        assert_eq!(sm.state(), ActivationState::Standby);

        sm.execute(CommandToken::Activate);
        assert_eq!(sm.state(), ActivationState::Active);
        assert!(!sm.session().standby);

        sm.execute(CommandToken::Activate);
        assert_eq!(sm.state(), ActivationState::Active);

        let statuses: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                CoreEvent::StatusChanged { status } => Some(status),
                _ => None,
            })
            .collect();
        assert_eq!(
            statuses,
            vec![
                StatusText::Active,
                StatusText::Standby,
                StatusText::Active,
                StatusText::Active
            ]
        );
    }

    #[test]
    fn test_standby_resume_deactivate() {
        let (mut sm, _) = create_state_machine();
        sm.execute(CommandToken::Activate);

        assert_eq!(
            sm.execute(CommandToken::Standby).as_deref(),
            Some("Entering Standby Mode")
        );
        assert_eq!(sm.state(), ActivationState::Standby);

        assert_eq!(sm.execute(CommandToken::Resume).as_deref(), Some("Resuming"));
        assert_eq!(sm.state(), ActivationState::Active);

        sm.execute(CommandToken::Standby);
        assert_eq!(sm.execute(CommandToken::Deactivate).as_deref(), Some("Deactivated"));
        assert_eq!(sm.state(), ActivationState::Offline);
        assert!(!sm.session().standby);
    }

    #[test]
    fn test_mute_is_orthogonal() {
        let (mut sm, _) = create_state_machine();
        sm.execute(CommandToken::Activate);
        sm.execute(CommandToken::Mute);
        assert!(sm.session().muted);
        assert_eq!(sm.state(), ActivationState::Active);

        sm.execute(CommandToken::Standby);
        assert_eq!(sm.state(), ActivationState::Standby);
        assert!(sm.session().muted);

        assert_eq!(sm.execute(CommandToken::Unmute).as_deref(), Some("Voice Restored"));
        assert!(!sm.session().muted);
    }

    #[test]
    fn test_change_voice_cycles() {
        let (mut sm, _) = create_state_machine();
        sm.execute(CommandToken::Activate);

        let profiles: Vec<_> = (0..4)
            .map(|_| {
                sm.execute(CommandToken::ChangeVoice);
                sm.session().voice_profile
            })
            .collect();
        assert_eq!(profiles, vec![1, 2, 0, 1]);
    }

    #[test]
    fn test_repeat_without_history_is_noop() {
        let (mut sm, _) = create_state_machine();
        // Activate sets last_command, so clear it by hand for this case
        sm.session.activated = true;

        assert_eq!(sm.execute(CommandToken::Repeat), None);
        assert_eq!(sm.session().last_command, None);
    }

    #[test]
    fn test_repeat_reexecutes_once_and_is_never_stored() {
        let (mut sm, mut rx) = create_state_machine();
        sm.execute(CommandToken::Activate);
        drain(&mut rx);

        assert_eq!(
            sm.execute(CommandToken::Repeat).as_deref(),
            Some("Repeating Last Command")
        );
        assert_eq!(sm.session().last_command, Some(CommandToken::Activate));

        let events = drain(&mut rx);
        assert_eq!(
            events,
            vec![CoreEvent::StatusChanged {
                status: StatusText::Active
            }]
        );

        // Repeating twice still replays Activate, not Repeat
        sm.execute(CommandToken::Repeat);
        assert_eq!(sm.session().last_command, Some(CommandToken::Activate));
    }

    #[test]
    fn test_repeat_change_voice() {
        let (mut sm, _) = create_state_machine();
        sm.execute(CommandToken::Activate);
        sm.execute(CommandToken::ChangeVoice);
        sm.execute(CommandToken::Repeat);
        assert_eq!(sm.session().voice_profile, 2);
    }

    #[test]
    fn test_set_color() {
        let (mut sm, mut rx) = create_state_machine();
        sm.execute(CommandToken::Activate);
        drain(&mut rx);

        assert_eq!(
            sm.execute(CommandToken::SetColor("teal".into())).as_deref(),
            Some("Color changed to teal")
        );
        assert_eq!(
            drain(&mut rx),
            vec![CoreEvent::AccentColorChanged {
                name: "teal".into(),
                hex: "#008080".into()
            }]
        );

        assert_eq!(
            sm.execute(CommandToken::SetColor("beige".into())).as_deref(),
            Some("Color not recognized")
        );
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_random_color_uses_palette() {
        let (mut sm, mut rx) = create_state_machine();
        sm.execute(CommandToken::Activate);
        drain(&mut rx);

        sm.execute(CommandToken::RandomColor);
        match drain(&mut rx).as_slice() {
            [CoreEvent::AccentColorChanged { name, hex }] => {
                assert_eq!(color_hex(name), Some(hex.as_str()));
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn test_toggle_input_mode_requests_focus() {
        let (mut sm, mut rx) = create_state_machine();
        sm.execute(CommandToken::Activate);
        drain(&mut rx);

        assert_eq!(
            sm.execute(CommandToken::ToggleInputMode).as_deref(),
            Some("Input Changed to Text")
        );
        assert!(!sm.session().voice_mode);
        assert_eq!(
            drain(&mut rx),
            vec![
                CoreEvent::InputModeChanged { voice: false },
                CoreEvent::TextInputFocusRequested
            ]
        );

        assert_eq!(
            sm.execute(CommandToken::ToggleInputMode).as_deref(),
            Some("Input Changed to Voice")
        );
        assert!(sm.session().voice_mode);
    }

    #[test]
    fn test_music_commands() {
        let (mut sm, mut rx) = create_state_machine();
        sm.execute(CommandToken::Activate);
        drain(&mut rx);

        assert_eq!(
            sm.execute(CommandToken::PlayMusic(Track::Chill)).as_deref(),
            Some("chill music playing")
        );
        assert_eq!(sm.execute(CommandToken::StopMusic).as_deref(), Some("Music stopped"));
        assert_eq!(
            drain(&mut rx),
            vec![
                CoreEvent::MusicRequested { track: Track::Chill },
                CoreEvent::MusicStopped
            ]
        );
    }

    #[test]
    fn test_status_acknowledges_without_change() {
        let (mut sm, _) = create_state_machine();
        sm.execute(CommandToken::Activate);
        let before = sm.session().clone();

        assert_eq!(
            sm.execute(CommandToken::Status).as_deref(),
            Some("All Commands Operational")
        );
        assert_eq!(sm.session().last_command, Some(CommandToken::Status));
        assert_eq!(sm.state(), before.activation());
    }
}
