//! Command-line parsing for the console.

use crate::common::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupTarget {
    Nearest,
    Id(u16),
}

/// Everything a user can ask for. View commands are answered locally from
/// shared state; the rest is dispatched to the client task and gated by the
/// connection phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    RequestServers,
    ConnectGameServer(u16),
    SelectCharacter(String),
    Move(u8, u8),
    WalkTo(u8, u8),
    Pickup(PickupTarget),
    ShowScope,
    ShowStats,
    ShowInventory,
    ShowSkills,
    Refresh,
    Exit,
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ClientCommand::RequestServers => "servers",
            ClientCommand::ConnectGameServer(_) => "connect",
            ClientCommand::SelectCharacter(_) => "select",
            ClientCommand::Move(_, _) => "move",
            ClientCommand::WalkTo(_, _) => "walkto",
            ClientCommand::Pickup(_) => "pickup",
            ClientCommand::ShowScope => "scope",
            ClientCommand::ShowStats => "stats",
            ClientCommand::ShowInventory => "inv",
            ClientCommand::ShowSkills => "skills",
            ClientCommand::Refresh => "refresh",
            ClientCommand::Exit => "exit",
        }
    }

    /// View commands render from shared state on the console task and never
    /// reach the client.
    pub fn is_local_view(&self) -> bool {
        matches!(
            self,
            ClientCommand::ShowScope
                | ClientCommand::ShowStats
                | ClientCommand::ShowInventory
                | ClientCommand::ShowSkills
        )
    }
}

fn parse_coordinate(token: &str, usage: &'static str) -> Result<u8, CommandError> {
    token
        .parse::<u8>()
        .map_err(|_| CommandError::InvalidArguments { usage })
}

/// Parse one input line. Empty lines are reported as unknown.
pub fn parse_line(line: &str) -> Result<ClientCommand, CommandError> {
    let mut tokens = line.split_whitespace();
    let keyword = tokens.next().unwrap_or("").to_ascii_lowercase();
    let args: Vec<&str> = tokens.collect();

    match keyword.as_str() {
        "servers" => Ok(ClientCommand::RequestServers),
        "connect" => {
            const USAGE: &str = "connect <server id>";
            match args.as_slice() {
                [id] => id
                    .parse::<u16>()
                    .map(ClientCommand::ConnectGameServer)
                    .map_err(|_| CommandError::InvalidArguments { usage: USAGE }),
                _ => Err(CommandError::InvalidArguments { usage: USAGE }),
            }
        }
        "select" => {
            const USAGE: &str = "select <character name>";
            match args.as_slice() {
                [name] => Ok(ClientCommand::SelectCharacter((*name).to_string())),
                _ => Err(CommandError::InvalidArguments { usage: USAGE }),
            }
        }
        "move" => {
            const USAGE: &str = "move <x> <y>";
            match args.as_slice() {
                [x, y] => Ok(ClientCommand::Move(
                    parse_coordinate(x, USAGE)?,
                    parse_coordinate(y, USAGE)?,
                )),
                _ => Err(CommandError::InvalidArguments { usage: USAGE }),
            }
        }
        // `walk` is the deprecated spelling of `walkto`.
        "walk" | "walkto" => {
            const USAGE: &str = "walkto <x> <y>";
            match args.as_slice() {
                [x, y] => Ok(ClientCommand::WalkTo(
                    parse_coordinate(x, USAGE)?,
                    parse_coordinate(y, USAGE)?,
                )),
                _ => Err(CommandError::InvalidArguments { usage: USAGE }),
            }
        }
        "pickup" => {
            const USAGE: &str = "pickup near | pickup <object id>";
            match args.as_slice() {
                ["near"] => Ok(ClientCommand::Pickup(PickupTarget::Nearest)),
                [id] => id
                    .parse::<u16>()
                    .map(|id| ClientCommand::Pickup(PickupTarget::Id(id)))
                    .map_err(|_| CommandError::InvalidArguments { usage: USAGE }),
                _ => Err(CommandError::InvalidArguments { usage: USAGE }),
            }
        }
        "scope" => Ok(ClientCommand::ShowScope),
        "stats" => Ok(ClientCommand::ShowStats),
        "inv" => Ok(ClientCommand::ShowInventory),
        "skills" => Ok(ClientCommand::ShowSkills),
        "refresh" => Ok(ClientCommand::Refresh),
        "exit" | "quit" => Ok(ClientCommand::Exit),
        _ => Err(CommandError::UnknownCommand {
            line: line.to_string(),
        }),
    }
}
