//! Keyword-based command resolution

use crate::state::{CommandToken, Track, PALETTE};

use super::normalize::normalize_query;

/// Where a piece of input text should go next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A built-in command
    Command(CommandToken),
    /// A keyword matched but an argument was missing; speak this instead
    Clarify(&'static str),
    /// No keyword matched; look the normalized text up
    Query(String),
}

/// Keywords in precedence order
///
/// Longer keywords come before the shorter ones they contain
/// ("deactivate" before "activate", "unmute" before "mute").
const KEYWORDS: &[(&str, Keyword)] = &[
    ("deactivate", Keyword::Deactivate),
    ("activate", Keyword::Activate),
    ("standby", Keyword::Standby),
    ("resume", Keyword::Resume),
    ("unmute", Keyword::Unmute),
    ("mute", Keyword::Mute),
    ("voice", Keyword::Voice),
    ("repeat", Keyword::Repeat),
    ("color", Keyword::Color),
    ("input", Keyword::Input),
    ("status", Keyword::Status),
    ("play music", Keyword::PlayMusic),
    ("stop music", Keyword::StopMusic),
];

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Activate,
    Deactivate,
    Standby,
    Resume,
    Mute,
    Unmute,
    Voice,
    Repeat,
    Color,
    Input,
    Status,
    PlayMusic,
    StopMusic,
}

/// Resolve lower-cased input text; the first matching keyword wins
pub fn resolve(text: &str) -> Resolution {
    let Some(keyword) = KEYWORDS
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, keyword)| *keyword)
    else {
        return Resolution::Query(normalize_query(text));
    };

    let command = match keyword {
        Keyword::Activate => CommandToken::Activate,
        Keyword::Deactivate => CommandToken::Deactivate,
        Keyword::Standby => CommandToken::Standby,
        Keyword::Resume => CommandToken::Resume,
        Keyword::Mute => CommandToken::Mute,
        Keyword::Unmute => CommandToken::Unmute,
        Keyword::Voice => CommandToken::ChangeVoice,
        Keyword::Repeat => CommandToken::Repeat,
        Keyword::Color => match PALETTE.iter().find(|(name, _)| text.contains(name)) {
            Some((name, _)) => CommandToken::SetColor((*name).to_string()),
            None => return Resolution::Clarify("Specify a color name"),
        },
        Keyword::Input => CommandToken::ToggleInputMode,
        Keyword::Status => CommandToken::Status,
        Keyword::PlayMusic => {
            let track = Track::ALL
                .into_iter()
                .find(|track| text.contains(track.name()))
                .unwrap_or_default();
            CommandToken::PlayMusic(track)
        }
        Keyword::StopMusic => CommandToken::StopMusic,
    };

    Resolution::Command(command)
}
