//! Single-slot confirmation gate

use tracing::{debug, info};

use crate::state::CommandToken;

/// What the gate decided for a submitted command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Confirmation is off; run the command now
    Execute(CommandToken),
    /// The command is now pending; `superseded` is the one it replaced
    Held { superseded: Option<CommandToken> },
}

/// Holds at most one command awaiting approval
#[derive(Debug, Default)]
pub struct ConfirmationGate {
    enabled: bool,
    pending: Option<CommandToken>,
}

impl ConfirmationGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn pending(&self) -> Option<&CommandToken> {
        self.pending.as_ref()
    }

    /// Turn confirmation on or off
    ///
    /// Returns the pending command discarded by turning it off.
    pub fn set_enabled(&mut self, enabled: bool) -> Option<CommandToken> {
        info!(enabled, "command confirmation toggled");
        self.enabled = enabled;
        if enabled {
            None
        } else {
            self.pending.take()
        }
    }

    /// Pass a resolved command through the gate
    pub fn submit(&mut self, cmd: CommandToken) -> GateDecision {
        if !self.enabled {
            return GateDecision::Execute(cmd);
        }

        debug!(command = %cmd, "holding command for confirmation");
        let superseded = self.pending.replace(cmd);
        if let Some(old) = &superseded {
            debug!(command = %old, "pending command superseded");
        }
        GateDecision::Held { superseded }
    }

    /// Release the pending command for execution
    pub fn approve(&mut self) -> Option<CommandToken> {
        let cmd = self.pending.take();
        if let Some(cmd) = &cmd {
            info!(command = %cmd, "command approved");
        }
        cmd
    }

    /// Drop the pending command
    pub fn reject(&mut self) -> Option<CommandToken> {
        let cmd = self.pending.take();
        if let Some(cmd) = &cmd {
            info!(command = %cmd, "command rejected");
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_passes_through() {
        let mut gate = ConfirmationGate::default();
        assert_eq!(
            gate.submit(CommandToken::Mute),
            GateDecision::Execute(CommandToken::Mute)
        );
        assert!(gate.pending().is_none());
    }

    #[test]
    fn test_enabled_holds_command() {
        let mut gate = ConfirmationGate::new(true);
        assert_eq!(
            gate.submit(CommandToken::Mute),
            GateDecision::Held { superseded: None }
        );
        assert_eq!(gate.pending(), Some(&CommandToken::Mute));
    }

    #[test]
    fn test_newer_command_replaces_pending() {
        let mut gate = ConfirmationGate::new(true);
        gate.submit(CommandToken::Mute);
        assert_eq!(
            gate.submit(CommandToken::Status),
            GateDecision::Held {
                superseded: Some(CommandToken::Mute)
            }
        );

        assert_eq!(gate.approve(), Some(CommandToken::Status));
        assert_eq!(gate.approve(), None);
    }

    #[test]
    fn test_reject_clears() {
        let mut gate = ConfirmationGate::new(true);
        gate.submit(CommandToken::Deactivate);
        assert_eq!(gate.reject(), Some(CommandToken::Deactivate));
        assert!(gate.pending().is_none());
        assert_eq!(gate.approve(), None);
    }

    #[test]
    fn test_disabling_discards_pending() {
        let mut gate = ConfirmationGate::new(true);
        gate.submit(CommandToken::Standby);
        assert_eq!(gate.set_enabled(false), Some(CommandToken::Standby));
        assert!(!gate.is_enabled());
        assert_eq!(
            gate.submit(CommandToken::Standby),
            GateDecision::Execute(CommandToken::Standby)
        );
    }
}
