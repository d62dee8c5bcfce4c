//! The client task: owns the connection state machine, drives the Connect
//! Server and Game Server connections in sequence and executes user
//! commands against the current phase.
//!
//! This task is the single writer of character state and scope; the console
//! observes through the event channel and read-only state handles.

pub mod connection;
pub mod movement;
pub mod phase;

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Sleep};
use tracing::{debug, info, warn};

use crate::common::events::{ClientEvent, EventSink};
use crate::config::Config;
use crate::console::command::{ClientCommand, PickupTarget};
use crate::protocol::connect::packets::{build_connection_info_request, build_server_list_request};
use crate::protocol::connect::{ConnectAction, ConnectHandler};
use crate::protocol::framing::{CryptoMode, Frame, Side};
use crate::protocol::game::builder::{PacketBuilder, MAX_WALK_STEPS};
use crate::protocol::game::{GameAction, GameHandler, HandlerContext};
use crate::protocol::packets::{codes, hex_dump, Packet};
use crate::state::character::UNKNOWN_ID;
use crate::state::scope::ScopeMap;
use crate::state::SharedCharacterState;

use connection::Connection;
use movement::{direct_path, MovementTicket};
use phase::{command_allowed, ConnectionPhase};

/// How long a graceful logout may take before the socket is dropped anyway.
const LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Channels wiring the client task to the console.
pub struct ClientChannels {
    pub events: EventSink,
    pub commands: mpsc::UnboundedReceiver<ClientCommand>,
    pub shutdown: watch::Receiver<bool>,
}

/// Why a session ended. `Disconnected` sessions are retried by the caller;
/// `Shutdown` ends the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Disconnected,
    Shutdown,
}

enum ConnectOutcome {
    Handover { host: String, port: u16 },
    Ended(SessionEnd),
}

pub struct MuClient {
    config: Config,
    channels: ClientChannels,
    state: SharedCharacterState,
    scope: Arc<ScopeMap>,
    phase: ConnectionPhase,
}

impl MuClient {
    pub fn new(
        config: Config,
        channels: ClientChannels,
        state: SharedCharacterState,
        scope: Arc<ScopeMap>,
    ) -> Self {
        Self {
            config,
            channels,
            state,
            scope,
            phase: ConnectionPhase::Initial,
        }
    }

    fn set_phase(&mut self, phase: ConnectionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.channels.events.emit(ClientEvent::PhaseChanged(phase));
        }
    }

    fn packet_builder(&self) -> PacketBuilder {
        PacketBuilder::new(
            self.config.client.protocol,
            self.config.client.version_bytes(),
            self.config.client.serial_bytes(),
            self.config.client.direction_map_array(),
        )
    }

    /// One full session: Connect Server discovery, handover, Game Server
    /// play, until disconnect or shutdown.
    pub async fn run_session(&mut self) -> Result<SessionEnd> {
        let result = self.drive_session().await;
        self.set_phase(ConnectionPhase::Disconnected);
        self.channels.events.emit(ClientEvent::Disconnected);
        result
    }

    async fn drive_session(&mut self) -> Result<SessionEnd> {
        let (host, port) = (
            self.config.server.host.clone(),
            self.config.server.port,
        );
        self.set_phase(ConnectionPhase::ConnectingToConnectServer);
        let mut conn = Connection::establish(&host, port, CryptoMode::Plain).await?;

        let outcome = self.run_connect_loop(&mut conn).await?;
        let (host, port) = match outcome {
            ConnectOutcome::Handover { host, port } => {
                conn.close().await;
                (host, port)
            }
            ConnectOutcome::Ended(end) => {
                conn.close().await;
                return Ok(end);
            }
        };

        // Handover: the Game Server speaks the encrypted dialect.
        self.set_phase(ConnectionPhase::ConnectingToGameServer);
        let mut conn =
            Connection::establish(&host, port, CryptoMode::Encrypted(Side::Client)).await?;
        self.set_phase(ConnectionPhase::ConnectedToGameServer);

        let end = self.run_game_loop(&mut conn).await?;
        conn.close().await;
        Ok(end)
    }

    // ========================================================================
    // Connect Server phase
    // ========================================================================

    async fn run_connect_loop<S>(&mut self, conn: &mut Connection<S>) -> Result<ConnectOutcome>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let mut handler = ConnectHandler::new(self.channels.events.clone());

        loop {
            tokio::select! {
                frame = conn.next_frame() => match frame {
                    Some(Ok(frame)) => {
                        if let Some(outcome) = self
                            .handle_connect_frame(conn, &mut handler, frame)
                            .await?
                        {
                            return Ok(outcome);
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Connect Server receive error: {e}");
                        return Ok(ConnectOutcome::Ended(SessionEnd::Disconnected));
                    }
                    None => {
                        info!("Connect Server closed the connection");
                        return Ok(ConnectOutcome::Ended(SessionEnd::Disconnected));
                    }
                },
                command = self.channels.commands.recv() => match command {
                    Some(command) => {
                        if let Some(end) = self
                            .handle_connect_command(conn, &handler, command)
                            .await?
                        {
                            return Ok(ConnectOutcome::Ended(end));
                        }
                    }
                    None => return Ok(ConnectOutcome::Ended(SessionEnd::Shutdown)),
                },
                changed = self.channels.shutdown.changed() => {
                    if changed.is_err() || *self.channels.shutdown.borrow() {
                        return Ok(ConnectOutcome::Ended(SessionEnd::Shutdown));
                    }
                }
            }
        }
    }

    async fn handle_connect_frame<S>(
        &mut self,
        conn: &mut Connection<S>,
        handler: &mut ConnectHandler,
        frame: Frame,
    ) -> Result<Option<ConnectOutcome>>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let packet =
            match Packet::classify(frame.code, frame.payload, codes::connect_has_sub_code) {
                Ok(packet) => packet,
                Err(e) => {
                    warn!("Undecodable Connect Server frame: {e}");
                    return Ok(None);
                }
            };

        let mut outbound = Vec::new();
        let action = match handler.handle(&packet, &mut outbound) {
            Ok(action) => action,
            Err(e) => {
                warn!("Failed to handle Connect Server packet: {e}");
                debug!("Payload: {}", hex_dump(&packet.body));
                return Ok(None);
            }
        };
        conn.send_all(outbound).await?;

        match action {
            ConnectAction::GreetingReceived => {
                self.set_phase(ConnectionPhase::ConnectedToConnectServer);
            }
            ConnectAction::ServerListReceived => {
                self.set_phase(ConnectionPhase::ReceivedServerList);
            }
            ConnectAction::Handover { host, port } => {
                return Ok(Some(ConnectOutcome::Handover { host, port }));
            }
            ConnectAction::None => {}
        }
        Ok(None)
    }

    async fn handle_connect_command<S>(
        &mut self,
        conn: &mut Connection<S>,
        handler: &ConnectHandler,
        command: ClientCommand,
    ) -> Result<Option<SessionEnd>>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        if let Err(e) = command_allowed(&command, self.phase) {
            self.channels.events.notice(e.to_string());
            return Ok(None);
        }

        match command {
            ClientCommand::RequestServers => {
                conn.send(build_server_list_request()).await?;
            }
            ClientCommand::ConnectGameServer(id) => {
                if handler.knows_server(id) {
                    conn.send(build_connection_info_request(id)).await?;
                } else {
                    self.channels
                        .events
                        .notice(format!("No server with id {id} in the list"));
                }
            }
            ClientCommand::Exit => return Ok(Some(SessionEnd::Shutdown)),
            _ => {}
        }
        Ok(None)
    }

    // ========================================================================
    // Game Server phase
    // ========================================================================

    async fn run_game_loop<S>(&mut self, conn: &mut Connection<S>) -> Result<SessionEnd>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let mut handler = GameHandler::new(
            self.config.client.protocol,
            self.packet_builder(),
            &self.config.account.username,
            &self.config.account.password,
        );
        let mut movement = MovementTicket::new();
        let mut logout_deadline: Option<Pin<Box<Sleep>>> = None;

        loop {
            let movement_deadline = movement.deadline();

            tokio::select! {
                frame = conn.next_frame() => match frame {
                    Some(Ok(frame)) => {
                        if let Some(end) = self
                            .handle_game_frame(conn, &mut handler, &mut movement, frame)
                            .await?
                        {
                            // A logout acknowledgement during shutdown ends
                            // the process, not just the session.
                            if logout_deadline.is_some() {
                                return Ok(SessionEnd::Shutdown);
                            }
                            return Ok(end);
                        }
                    }
                    Some(Err(e)) => {
                        warn!("Game Server receive error: {e}");
                        return Ok(SessionEnd::Disconnected);
                    }
                    None => {
                        info!("Game Server closed the connection");
                        return Ok(SessionEnd::Disconnected);
                    }
                },
                command = self.channels.commands.recv() => match command {
                    Some(command) => {
                        if let Some(end) = self
                            .handle_game_command(conn, &handler, &mut movement, &mut logout_deadline, command)
                            .await?
                        {
                            return Ok(end);
                        }
                    }
                    None => return Ok(SessionEnd::Shutdown),
                },
                _ = tokio::time::sleep_until(movement_deadline.unwrap_or_else(Instant::now)),
                    if movement_deadline.is_some() =>
                {
                    movement.release();
                    warn!("Movement request timed out without confirmation");
                    self.channels.events.emit(ClientEvent::MovementTimedOut);
                },
                _ = async { logout_deadline.as_mut().unwrap().as_mut().await },
                    if logout_deadline.is_some() =>
                {
                    warn!("Logout timed out, dropping the connection");
                    return Ok(SessionEnd::Shutdown);
                },
                changed = self.channels.shutdown.changed() => {
                    if changed.is_err() || *self.channels.shutdown.borrow() {
                        info!("Shutdown requested, logging out");
                        conn.send(handler.builder().logout()).await?;
                        logout_deadline = Some(Box::pin(tokio::time::sleep(LOGOUT_TIMEOUT)));
                    }
                }
            }
        }
    }

    async fn handle_game_frame<S>(
        &mut self,
        conn: &mut Connection<S>,
        handler: &mut GameHandler,
        movement: &mut MovementTicket,
        frame: Frame,
    ) -> Result<Option<SessionEnd>>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        let packet = match Packet::classify(frame.code, frame.payload, codes::game_has_sub_code) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Undecodable Game Server frame: {e}");
                return Ok(None);
            }
        };

        let mut outbound = Vec::new();
        let action = {
            let mut ctx = HandlerContext {
                state: &self.state,
                scope: &self.scope,
                events: &self.channels.events,
                movement,
                phase: &mut self.phase,
                outbound: &mut outbound,
            };
            handler.handle(&mut ctx, &packet)
        };

        match action {
            Ok(GameAction::None) => {}
            Ok(GameAction::LoggedOut) => return Ok(Some(SessionEnd::Disconnected)),
            Err(e) => {
                // Per-packet decode failures skip the frame but keep the
                // connection.
                let sub = match packet.sub {
                    crate::protocol::packets::SubCode::Code(sub) => Some(sub),
                    crate::protocol::packets::SubCode::NoSubCode => None,
                };
                warn!(
                    "Failed to handle {} packet: {e}",
                    codes::game_code_name(packet.main, sub)
                );
                debug!("Payload: {}", hex_dump(&packet.body));
            }
        }
        conn.send_all(outbound).await?;
        Ok(None)
    }

    async fn handle_game_command<S>(
        &mut self,
        conn: &mut Connection<S>,
        handler: &GameHandler,
        movement: &mut MovementTicket,
        logout_deadline: &mut Option<Pin<Box<Sleep>>>,
        command: ClientCommand,
    ) -> Result<Option<SessionEnd>>
    where
        S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
    {
        if let Err(e) = command_allowed(&command, self.phase) {
            self.channels.events.notice(e.to_string());
            return Ok(None);
        }

        match command {
            ClientCommand::SelectCharacter(name) => {
                let known = handler.character_names();
                if !known.is_empty() && !known.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
                    self.channels
                        .events
                        .notice(format!("No character named '{name}' on this account"));
                    return Ok(None);
                }
                {
                    let mut state = self.state.write().expect("state lock poisoned");
                    state.name = name.clone();
                    state.id = UNKNOWN_ID;
                }
                info!("Selecting character {name}");
                conn.send(handler.builder().select_character(&name)).await?;
            }
            ClientCommand::Move(x, y) => {
                if !movement.try_acquire() {
                    self.channels.events.notice("A movement request is still pending");
                    return Ok(None);
                }
                if let Err(e) = conn.send(handler.builder().instant_move(x, y)).await {
                    movement.release();
                    return Err(e.into());
                }
            }
            ClientCommand::WalkTo(x, y) => {
                let (source_x, source_y) = {
                    let state = self.state.read().expect("state lock poisoned");
                    (state.position_x, state.position_y)
                };
                let path = direct_path((source_x, source_y), (x, y), MAX_WALK_STEPS);
                if path.is_empty() {
                    self.channels.events.notice("Already there");
                    return Ok(None);
                }
                if !movement.try_acquire() {
                    self.channels.events.notice("A movement request is still pending");
                    return Ok(None);
                }
                if let Err(e) = conn
                    .send(handler.builder().walk(source_x, source_y, &path))
                    .await
                {
                    movement.release();
                    return Err(e.into());
                }
            }
            ClientCommand::Pickup(target) => {
                let object = match target {
                    PickupTarget::Id(id) => self.scope.get(id),
                    PickupTarget::Nearest => {
                        let (x, y) = {
                            let state = self.state.read().expect("state lock poisoned");
                            (state.position_x, state.position_y)
                        };
                        self.scope.nearest_pickup(x, y)
                    }
                };
                match object {
                    Some(object) => {
                        conn.send(handler.builder().pickup(object.raw_id)).await?;
                    }
                    None => self.channels.events.notice("Nothing to pick up"),
                }
            }
            ClientCommand::Refresh => {
                if self.phase == ConnectionPhase::ConnectedToGameServer {
                    conn.send(handler.builder().request_character_list()).await?;
                } else {
                    let state = self.state.read().expect("state lock poisoned");
                    self.channels.events.notice(format!(
                        "{} at ({}, {}), map {}",
                        state.name, state.position_x, state.position_y, state.map_id
                    ));
                }
            }
            ClientCommand::Exit => {
                if self.phase == ConnectionPhase::InGame {
                    info!("Exit requested, logging out");
                    conn.send(handler.builder().logout()).await?;
                    *logout_deadline = Some(Box::pin(tokio::time::sleep(LOGOUT_TIMEOUT)));
                } else {
                    return Ok(Some(SessionEnd::Shutdown));
                }
            }
            _ => {}
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::{SinkExt, StreamExt};
    use tokio_util::codec::Framed;

    use crate::config::{AccountConfig, ClientConfig, Config, ServerConfig};
    use crate::protocol::crypto::xor3;
    use crate::protocol::framing::{FrameCodec, OutboundFrame};
    use crate::protocol::ProtocolVersion;
    use crate::state::character;

    fn test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 44405,
            },
            account: AccountConfig {
                username: "admin".into(),
                password: "secret".into(),
            },
            client: ClientConfig {
                protocol: ProtocolVersion::Season6,
                version: "10404".into(),
                serial: "k1Pk2jcET48mxL3b".into(),
                direction_map: vec![0, 1, 2, 3, 4, 5, 6, 7],
            },
        }
    }

    struct Harness {
        client: MuClient,
        command_tx: mpsc::UnboundedSender<ClientCommand>,
        event_rx: mpsc::UnboundedReceiver<ClientEvent>,
        _shutdown_tx: watch::Sender<bool>,
    }

    fn harness() -> Harness {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let channels = ClientChannels {
            events: EventSink::new(event_tx),
            commands: command_rx,
            shutdown: shutdown_rx,
        };
        let client = MuClient::new(
            test_config(),
            channels,
            character::shared(),
            Arc::new(ScopeMap::new()),
        );
        Harness {
            client,
            command_tx,
            event_rx,
            _shutdown_tx: shutdown_tx,
        }
    }

    fn season6_character_info_body() -> Vec<u8> {
        let mut body = vec![0x03]; // sub-code
        body.extend_from_slice(&[125, 201]);
        body.extend_from_slice(&0u16.to_be_bytes());
        body.extend_from_slice(&3_000_000u64.to_be_bytes());
        body.extend_from_slice(&4_500_000u64.to_be_bytes());
        body.extend_from_slice(&12u16.to_be_bytes());
        for value in [85u16, 60, 40, 30, 0] {
            body.extend_from_slice(&value.to_be_bytes());
        }
        for value in [450u16, 500, 200, 220, 95, 100, 40, 50] {
            body.extend_from_slice(&value.to_be_bytes());
        }
        body.extend_from_slice(&75_000u32.to_be_bytes());
        body.extend_from_slice(&[0, 0, 16]);
        body.extend_from_slice(&92u16.to_be_bytes());
        body.push(0);
        body
    }

    fn scope_character_body(raw_id: u16, x: u8, y: u8, name: &str) -> Vec<u8> {
        let mut body = vec![1u8];
        body.extend_from_slice(&raw_id.to_be_bytes());
        body.extend_from_slice(&[x, y]);
        body.extend_from_slice(&[0u8; 18]);
        body.push(0);
        body.push(0);
        let mut padded = [0u8; 10];
        padded[..name.len()].copy_from_slice(name.as_bytes());
        body.extend_from_slice(&padded);
        body
    }

    async fn wait_for_event<F>(rx: &mut mpsc::UnboundedReceiver<ClientEvent>, matcher: F)
    where
        F: Fn(&ClientEvent) -> bool,
    {
        let deadline = Duration::from_secs(5);
        tokio::time::timeout(deadline, async {
            loop {
                let event = rx.recv().await.expect("event channel closed");
                if matcher(&event) {
                    return;
                }
            }
        })
        .await
        .expect("timed out waiting for event");
    }

    /// Full login → select → in-game → move exchange against a scripted
    /// server on the far end of a duplex pipe.
    #[tokio::test]
    async fn game_session_reaches_in_game_and_confirms_movement() {
        let mut harness = harness();
        harness.client.phase = ConnectionPhase::ConnectedToGameServer;

        let (client_io, server_io) = tokio::io::duplex(8192);
        let mut conn = Connection::from_stream(client_io, CryptoMode::Encrypted(Side::Client));
        let mut server = Framed::new(server_io, FrameCodec::encrypted(Side::Server));

        let command_tx = harness.command_tx.clone();
        let mut event_rx = harness.event_rx;

        let client_task = harness.client.run_game_loop(&mut conn);

        let server_task = async move {
            // Greeting: the client must log in.
            server
                .send(OutboundFrame::new(0xF1, vec![0x00, 0x01]))
                .await
                .unwrap();
            let login = server.next().await.unwrap().unwrap();
            assert_eq!(login.code, 0xF1);
            assert_eq!(login.payload[0], 0x01);
            let mut username: [u8; 10] = login.payload[1..11].try_into().unwrap();
            xor3(&mut username);
            assert_eq!(&username[..5], b"admin");

            // Accept the login; the client requests its characters.
            server
                .send(OutboundFrame::new(0xF1, vec![0x01, 0x01]))
                .await
                .unwrap();
            wait_for_event(&mut event_rx, |e| matches!(e, ClientEvent::LoginSucceeded)).await;
            let char_list_req = server.next().await.unwrap().unwrap();
            assert_eq!(char_list_req.code, 0xF3);
            assert_eq!(char_list_req.payload.as_ref(), &[0x00]);

            // One character: TestChar, level 92.
            let mut body = vec![0x00, 1, 0];
            body.extend_from_slice(b"TestChar\0\0");
            body.extend_from_slice(&92u16.to_be_bytes());
            body.extend_from_slice(&[16, 0]);
            server.send(OutboundFrame::new(0xF3, body)).await.unwrap();
            wait_for_event(&mut event_rx, |e| matches!(e, ClientEvent::CharacterList(_))).await;

            // The user picks it; expect the selection packet.
            command_tx
                .send(ClientCommand::SelectCharacter("TestChar".into()))
                .unwrap();
            let select = server.next().await.unwrap().unwrap();
            assert_eq!(select.code, 0xF3);
            assert_eq!(select.payload[0], 0x01);
            assert_eq!(&select.payload[1..9], b"TestChar");

            // Enter the world.
            server
                .send(OutboundFrame::new(0xF3, season6_character_info_body()))
                .await
                .unwrap();
            // The self object appears in scope under its spawn-marked id.
            server
                .send(OutboundFrame::new(
                    0x12,
                    scope_character_body(0x8001, 125, 201, "TestChar"),
                ))
                .await
                .unwrap();
            wait_for_event(&mut event_rx, |e| {
                matches!(e, ClientEvent::PhaseChanged(ConnectionPhase::InGame))
            })
            .await;

            // Only now is the move command legal; it goes out as an instant
            // move request.
            command_tx.send(ClientCommand::Move(120, 100)).unwrap();
            let move_req = server.next().await.unwrap().unwrap();
            assert_eq!(move_req.code, 0x15);
            assert_eq!(move_req.payload.as_ref(), &[120, 100]);

            // Confirm it; then hang up.
            server
                .send(OutboundFrame::new(0x15, vec![0x00, 0x01, 120, 100]))
                .await
                .unwrap();
            wait_for_event(&mut event_rx, |e| {
                matches!(e, ClientEvent::MovementConfirmed { x: 120, y: 100 })
            })
            .await;
            server.close().await.unwrap();
        };

        let (end, ()) = tokio::time::timeout(
            Duration::from_secs(10),
            futures::future::join(client_task, server_task),
        )
        .await
        .expect("test timed out");

        assert_eq!(end.unwrap(), SessionEnd::Disconnected);
    }

    #[tokio::test]
    async fn connect_loop_performs_discovery_and_handover() {
        let mut harness = harness();
        harness.client.phase = ConnectionPhase::ConnectingToConnectServer;

        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut conn = Connection::from_stream(client_io, CryptoMode::Plain);
        let mut server = Framed::new(server_io, FrameCodec::plain());

        let command_tx = harness.command_tx.clone();
        let mut event_rx = harness.event_rx;

        let client_task = harness.client.run_connect_loop(&mut conn);

        let server_task = async move {
            // Greeting; the client asks for the server list.
            server
                .send(OutboundFrame::new(0x00, vec![0x01]))
                .await
                .unwrap();
            let list_req = server.next().await.unwrap().unwrap();
            assert_eq!(list_req.code, 0xF4);
            assert_eq!(list_req.payload.as_ref(), &[0x06]);

            // Two servers.
            server
                .send(OutboundFrame::new(
                    0xF4,
                    vec![0x06, 0x00, 0x02, 0x00, 0x00, 0x14, 0x00, 0x00, 0x13, 0x50, 0x00],
                ))
                .await
                .unwrap();
            wait_for_event(&mut event_rx, |e| {
                matches!(e, ClientEvent::PhaseChanged(ConnectionPhase::ReceivedServerList))
            })
            .await;

            // The user picks server 19; answer with the game address.
            command_tx.send(ClientCommand::ConnectGameServer(19)).unwrap();
            let info_req = server.next().await.unwrap().unwrap();
            assert_eq!(info_req.code, 0xF4);
            assert_eq!(info_req.payload.as_ref(), &[0x03, 0x00, 0x13]);

            let mut body = vec![0x03];
            body.extend_from_slice(b"10.1.2.3\0\0\0\0\0\0\0\0");
            body.extend_from_slice(&55_901u16.to_be_bytes());
            server.send(OutboundFrame::new(0xF4, body)).await.unwrap();
        };

        let (outcome, ()) = tokio::time::timeout(
            Duration::from_secs(10),
            futures::future::join(client_task, server_task),
        )
        .await
        .expect("test timed out");

        match outcome.unwrap() {
            ConnectOutcome::Handover { host, port } => {
                assert_eq!(host, "10.1.2.3");
                assert_eq!(port, 55_901);
            }
            ConnectOutcome::Ended(end) => panic!("expected handover, got {end:?}"),
        }
    }

    #[tokio::test]
    async fn commands_in_wrong_phase_are_rejected_without_sending() {
        let mut harness = harness();
        harness.client.phase = ConnectionPhase::ConnectedToGameServer;

        let (client_io, server_io) = tokio::io::duplex(4096);
        let mut conn = Connection::from_stream(client_io, CryptoMode::Encrypted(Side::Client));
        let mut server = Framed::new(server_io, FrameCodec::encrypted(Side::Server));

        // Movement before entering the world must not touch the socket.
        let mut movement = MovementTicket::new();
        let mut logout_deadline = None;
        let handler = GameHandler::new(
            ProtocolVersion::Season6,
            harness.client.packet_builder(),
            "admin",
            "secret",
        );
        let end = harness
            .client
            .handle_game_command(
                &mut conn,
                &handler,
                &mut movement,
                &mut logout_deadline,
                ClientCommand::Move(10, 10),
            )
            .await
            .unwrap();
        assert!(end.is_none());
        assert!(!movement.is_held());

        // The rejection surfaced as a notice naming the phase.
        let mut saw_notice = false;
        while let Ok(event) = harness.event_rx.try_recv() {
            if let ClientEvent::Notice(text) = event {
                assert!(text.contains("selecting a character"), "got: {text}");
                saw_notice = true;
            }
        }
        assert!(saw_notice);

        // Nothing was written to the server side.
        drop(conn);
        match server.next().await {
            None => {}
            Some(frame) => panic!("unexpected traffic: {frame:?}"),
        }
    }
}
