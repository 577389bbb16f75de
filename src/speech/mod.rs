//! Speech module for spoken replies and captions
//!
//! Replies are synthesized one at a time; a new reply cancels the one in
//! flight. While speaking, progress offsets reported by the synthesizer drive
//! a six-word caption line.

mod caption;
mod renderer;
mod synth;

pub use renderer::SpeechRenderer;
pub use synth::{ConsoleSynthesizer, Synthesizer};

#[cfg(test)]
pub(crate) use renderer::tests::RecordingSynthesizer;
