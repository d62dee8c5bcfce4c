//! Connection phases and command gating.

use crate::common::error::CommandError;
use crate::console::command::ClientCommand;

/// Lifecycle of one client session. Only `InGame` permits world-interaction
/// commands; everything else gates down to discovery and selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Initial,
    ConnectingToConnectServer,
    ConnectedToConnectServer,
    ReceivedServerList,
    ConnectingToGameServer,
    ConnectedToGameServer,
    InGame,
    Disconnected,
}

impl std::fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ConnectionPhase::Initial => "starting up",
            ConnectionPhase::ConnectingToConnectServer => "connecting to the Connect Server",
            ConnectionPhase::ConnectedToConnectServer => "talking to the Connect Server",
            ConnectionPhase::ReceivedServerList => "choosing a game server",
            ConnectionPhase::ConnectingToGameServer => "connecting to the game server",
            ConnectionPhase::ConnectedToGameServer => "selecting a character",
            ConnectionPhase::InGame => "in game",
            ConnectionPhase::Disconnected => "disconnected",
        };
        write!(f, "{text}")
    }
}

/// Check a user command against the current phase. Commands rejected here
/// must have no side effects.
pub fn command_allowed(
    command: &ClientCommand,
    phase: ConnectionPhase,
) -> Result<(), CommandError> {
    use ConnectionPhase::*;

    let allowed = match command {
        ClientCommand::RequestServers => {
            matches!(phase, ConnectedToConnectServer | ReceivedServerList)
        }
        ClientCommand::ConnectGameServer(_) => matches!(phase, ReceivedServerList),
        ClientCommand::SelectCharacter(_) => matches!(phase, ConnectedToGameServer),
        ClientCommand::Move(_, _) | ClientCommand::WalkTo(_, _) | ClientCommand::Pickup(_) => {
            matches!(phase, InGame)
        }
        ClientCommand::Refresh => matches!(phase, ConnectedToGameServer | InGame),
        // Local views and exit are phase-independent.
        ClientCommand::ShowScope
        | ClientCommand::ShowStats
        | ClientCommand::ShowInventory
        | ClientCommand::ShowSkills
        | ClientCommand::Exit => true,
    };

    if allowed {
        Ok(())
    } else {
        Err(CommandError::PhaseMismatch {
            command: command.name(),
            phase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::command::PickupTarget;

    #[test]
    fn world_commands_require_in_game() {
        for phase in [
            ConnectionPhase::Initial,
            ConnectionPhase::ConnectedToConnectServer,
            ConnectionPhase::ConnectedToGameServer,
            ConnectionPhase::Disconnected,
        ] {
            assert!(command_allowed(&ClientCommand::Move(10, 10), phase).is_err());
            assert!(command_allowed(&ClientCommand::WalkTo(10, 10), phase).is_err());
            assert!(
                command_allowed(&ClientCommand::Pickup(PickupTarget::Nearest), phase).is_err()
            );
        }
        assert!(command_allowed(&ClientCommand::Move(10, 10), ConnectionPhase::InGame).is_ok());
    }

    #[test]
    fn server_selection_requires_a_server_list() {
        assert!(command_allowed(
            &ClientCommand::ConnectGameServer(0),
            ConnectionPhase::ConnectedToConnectServer
        )
        .is_err());
        assert!(command_allowed(
            &ClientCommand::ConnectGameServer(0),
            ConnectionPhase::ReceivedServerList
        )
        .is_ok());
    }

    #[test]
    fn views_are_phase_independent() {
        for phase in [ConnectionPhase::Initial, ConnectionPhase::InGame] {
            assert!(command_allowed(&ClientCommand::ShowScope, phase).is_ok());
            assert!(command_allowed(&ClientCommand::Exit, phase).is_ok());
        }
    }

    #[test]
    fn rejected_commands_name_the_phase() {
        let err = command_allowed(
            &ClientCommand::SelectCharacter("Elf".into()),
            ConnectionPhase::InGame,
        )
        .unwrap_err();
        assert!(err.to_string().contains("select"));
        assert!(err.to_string().contains("in game"));
    }
}
