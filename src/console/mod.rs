//! Console front end: line-oriented command input and event printing.
//!
//! A pure observer of the protocol core. Commands flow to the client task
//! over a channel; world and self state are only ever read through the
//! shared handles, never mutated here.

pub mod command;
pub mod view;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use crate::common::events::ClientEvent;
use crate::state::scope::ScopeMap;
use crate::state::SharedCharacterState;

use command::ClientCommand;

/// Print events as they arrive.
pub async fn run_printer(mut events: mpsc::UnboundedReceiver<ClientEvent>) {
    while let Some(event) = events.recv().await {
        if let Some(line) = view::describe_event(&event) {
            println!("{line}");
        }
    }
}

fn render_view(
    command: &ClientCommand,
    state: &SharedCharacterState,
    scope: &ScopeMap,
) -> String {
    match command {
        ClientCommand::ShowScope => view::render_scope(scope),
        ClientCommand::ShowStats => {
            view::render_stats(&state.read().expect("state lock poisoned"))
        }
        ClientCommand::ShowInventory => {
            view::render_inventory(&state.read().expect("state lock poisoned"))
        }
        ClientCommand::ShowSkills => {
            view::render_skills(&state.read().expect("state lock poisoned"))
        }
        _ => String::new(),
    }
}

/// Read commands from stdin until exit or EOF.
pub async fn run_console(
    state: SharedCharacterState,
    scope: Arc<ScopeMap>,
    command_tx: mpsc::UnboundedSender<ClientCommand>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.split_whitespace().next() == Some("walk") {
                    println!("note: 'walk' is deprecated, use 'walkto'");
                }
                match command::parse_line(line) {
                    Err(e) => println!("{e}"),
                    Ok(command) if command.is_local_view() => {
                        println!("{}", render_view(&command, &state, &scope));
                    }
                    Ok(command) => {
                        let is_exit = command == ClientCommand::Exit;
                        if command_tx.send(command).is_err() {
                            break;
                        }
                        if is_exit {
                            break;
                        }
                    }
                }
            }
            // EOF on stdin behaves like an exit request.
            Ok(None) => {
                let _ = command_tx.send(ClientCommand::Exit);
                break;
            }
            Err(e) => {
                warn!("Failed to read from stdin: {e}");
                break;
            }
        }
    }
}
