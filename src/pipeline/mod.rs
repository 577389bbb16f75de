//! Pipeline module wiring the command stages together
//!
//! raw input -> input gate -> resolver -> confirmation gate -> state machine
//! -> speech renderer, with the knowledge chain for unmatched text.

mod assistant;

pub use assistant::{Assistant, AssistantRequest, AssistantStatus};
