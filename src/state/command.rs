//! Command vocabulary
//!
//! The closed set of commands the state machine understands, plus the fixed
//! color palette and music track tables they refer to.

use serde::{Deserialize, Serialize};

/// Accent colors in lookup order
pub const PALETTE: &[(&str, &str)] = &[
    ("azure", "#007FFF"),
    ("teal", "#008080"),
    ("emerald", "#50C878"),
    ("lavender", "#B57EDC"),
    ("indigo", "#4B0082"),
    ("sapphire", "#0F52BA"),
    ("aqua", "#00FFFF"),
    ("mint", "#98FF98"),
    ("slate", "#708090"),
    ("periwinkle", "#CCCCFF"),
    ("cobalt", "#0047AB"),
    ("crimson", "#DC143C"),
];

/// Look up the hex value for a palette color name
pub fn color_hex(name: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, hex)| *hex)
}

/// Music tracks the audio collaborator knows how to play
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    #[default]
    Chill,
    Focus,
    Ambient,
}

impl Track {
    pub const ALL: [Track; 3] = [Track::Chill, Track::Focus, Track::Ambient];

    pub fn name(&self) -> &'static str {
        match self {
            Track::Chill => "chill",
            Track::Focus => "focus",
            Track::Ambient => "ambient",
        }
    }
}

impl std::fmt::Display for Track {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "arg", rename_all = "snake_case")]
pub enum CommandToken {
    Activate,
    Deactivate,
    Standby,
    Resume,
    Mute,
    Unmute,
    ChangeVoice,
    Repeat,
    SetColor(String),
    RandomColor,
    ToggleInputMode,
    Status,
    PlayMusic(Track),
    StopMusic,
}

impl std::fmt::Display for CommandToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandToken::Activate => write!(f, "activate"),
            CommandToken::Deactivate => write!(f, "deactivate"),
            CommandToken::Standby => write!(f, "standby"),
            CommandToken::Resume => write!(f, "resume"),
            CommandToken::Mute => write!(f, "mute"),
            CommandToken::Unmute => write!(f, "unmute"),
            CommandToken::ChangeVoice => write!(f, "change_voice"),
            CommandToken::Repeat => write!(f, "repeat"),
            CommandToken::SetColor(name) => write!(f, "set_color({})", name),
            CommandToken::RandomColor => write!(f, "random_color"),
            CommandToken::ToggleInputMode => write!(f, "toggle_input_mode"),
            CommandToken::Status => write!(f, "status"),
            CommandToken::PlayMusic(track) => write!(f, "play_music({})", track),
            CommandToken::StopMusic => write!(f, "stop_music"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_lookup() {
        assert_eq!(color_hex("teal"), Some("#008080"));
        assert_eq!(color_hex("crimson"), Some("#DC143C"));
        assert_eq!(color_hex("magenta"), None);
    }

    #[test]
    fn test_command_serialization() {
        let json = serde_json::to_string(&CommandToken::SetColor("mint".into())).unwrap();
        assert_eq!(json, r#"{"command":"set_color","arg":"mint"}"#);

        let cmd: CommandToken = serde_json::from_str(r#"{"command":"activate"}"#).unwrap();
        assert_eq!(cmd, CommandToken::Activate);

        let cmd: CommandToken =
            serde_json::from_str(r#"{"command":"play_music","arg":"focus"}"#).unwrap();
        assert_eq!(cmd, CommandToken::PlayMusic(Track::Focus));
    }
}
