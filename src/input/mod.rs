//! Input module for voice and typed text
//!
//! Voice utterances come from an external recognizer and must start with
//! the wake word; typed text is taken as-is.

mod console;
mod wake;

pub use console::ConsoleListener;
pub use wake::InputGate;

/// Raw input before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Final transcript from continuous recognition
    Utterance(String),
    /// Text submitted from a text field
    Typed(String),
}
