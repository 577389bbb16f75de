//! Confirmation module for human-approved command execution
//!
//! Sits between the resolver and the state machine. While enabled, each
//! resolved command waits for an approve or reject signal; only the most
//! recent one is kept.

mod gate;

pub use gate::{ConfirmationGate, GateDecision};
