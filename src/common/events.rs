//! Events emitted by the protocol core for the presentation layer.
//!
//! The console task consumes these over an unbounded channel; it never holds
//! references into core data, so every event carries owned snapshots.

use tokio::sync::mpsc;
use tracing::debug;

use crate::client::phase::ConnectionPhase;
use crate::protocol::connect::packets::ServerListEntry;
use crate::protocol::game::packets::CharacterPreview;
use crate::state::scope::ScopeObjectKind;

/// Character-state field groups, for change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    Identity,
    Level,
    Experience,
    MasterLevel,
    Vitals,
    Stats,
    Zen,
    Inventory,
    Skills,
    Position,
}

/// One visible object, summarized for display.
#[derive(Debug, Clone)]
pub struct ScopeSummary {
    pub masked_id: u16,
    pub kind: ScopeObjectKind,
    pub label: String,
    pub x: u8,
    pub y: u8,
}

/// Events surfaced by the client core.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    PhaseChanged(ConnectionPhase),
    ServerList(Vec<ServerListEntry>),
    LoginSucceeded,
    LoginFailed { code: u8, reason: &'static str },
    CharacterList(Vec<CharacterPreview>),
    EnteredGame { map_id: u16, x: u8, y: u8 },
    MapChanged { map_id: u16, x: u8, y: u8 },
    ScopeObjectAdded(ScopeSummary),
    ScopeObjectRemoved { masked_id: u16 },
    CharacterStateChanged(StateField),
    MovementConfirmed { x: u8, y: u8 },
    MovementTimedOut,
    Died { killer: Option<String> },
    Notice(String),
    Disconnected,
}

/// Sending half of the event channel.
///
/// Sends are fire-and-forget; a closed receiver (console shut down first)
/// only logs at debug level.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<ClientEvent>,
}

impl EventSink {
    pub fn new(tx: mpsc::UnboundedSender<ClientEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: ClientEvent) {
        if self.tx.send(event).is_err() {
            debug!("Event receiver dropped, discarding event");
        }
    }

    /// Convenience for player-facing one-liners.
    pub fn notice(&self, text: impl Into<String>) {
        self.emit(ClientEvent::Notice(text.into()));
    }
}
