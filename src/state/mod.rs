//! State machine module for session management
//!
//! Provides an explicit activation state machine with three states:
//! - Offline: only Activate is accepted
//! - Active: all commands are accepted
//! - Standby: all commands are accepted, status shows STANDBY

mod command;
mod machine;

pub use command::{CommandToken, Track, PALETTE};
pub use machine::{ActivationState, SessionState, StateMachine};
