//! Connect Server packet handling.

use tracing::{debug, info, warn};

use crate::common::error::ProtocolResult;
use crate::common::events::{ClientEvent, EventSink};
use crate::protocol::framing::OutboundFrame;
use crate::protocol::packets::{codes::connect, hex_dump, Packet, SubCode};

use super::packets::{build_server_list_request, ConnectionInfo, ServerList, ServerListEntry};

/// What the connection loop should do after a packet was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectAction {
    None,
    /// Server greeting arrived; the session is usable.
    GreetingReceived,
    /// A fresh server list was stored.
    ServerListReceived,
    /// The Connect Server returned a game-server address; switch over.
    Handover { host: String, port: u16 },
}

/// Handler state for the Connect Server phase.
pub struct ConnectHandler {
    events: EventSink,
    server_list: Vec<ServerListEntry>,
}

impl ConnectHandler {
    pub fn new(events: EventSink) -> Self {
        Self {
            events,
            server_list: Vec::new(),
        }
    }

    pub fn knows_server(&self, id: u16) -> bool {
        self.server_list.iter().any(|s| s.id == id)
    }

    /// Dispatch one packet. Decode failures bubble up so the caller can log
    /// the payload and keep the connection alive.
    pub fn handle(
        &mut self,
        packet: &Packet,
        outbound: &mut Vec<OutboundFrame>,
    ) -> ProtocolResult<ConnectAction> {
        match (packet.main, packet.sub) {
            (connect::HELLO, SubCode::Code(connect::HELLO_SUB)) => {
                info!("Connect Server greeting received, requesting server list");
                outbound.push(build_server_list_request());
                Ok(ConnectAction::GreetingReceived)
            }
            (connect::SERVER_INFO, SubCode::Code(connect::SERVER_LIST_SUB)) => {
                let mut body = packet.body.clone();
                let list = ServerList::decode(&mut body)?;
                info!("Received {} game server(s)", list.servers.len());
                self.server_list = list.servers.clone();
                self.events.emit(ClientEvent::ServerList(list.servers));
                Ok(ConnectAction::ServerListReceived)
            }
            (connect::SERVER_INFO, SubCode::Code(connect::CONNECTION_INFO_SUB)) => {
                let mut body = packet.body.clone();
                let info = ConnectionInfo::decode(&mut body)?;
                info!("Game server address: {}:{}", info.host, info.port);
                Ok(ConnectAction::Handover {
                    host: info.host,
                    port: info.port,
                })
            }
            _ => {
                warn!(
                    main = format_args!("{:#04X}", packet.main),
                    sub = %packet.sub,
                    "Unhandled Connect Server packet"
                );
                debug!("Payload: {}", hex_dump(&packet.body));
                Ok(ConnectAction::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use tokio::sync::mpsc;

    fn handler() -> (ConnectHandler, mpsc::UnboundedReceiver<ClientEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ConnectHandler::new(EventSink::new(tx)), rx)
    }

    fn packet(main: u8, sub: u8, body: &'static [u8]) -> Packet {
        Packet {
            main,
            sub: SubCode::Code(sub),
            body: Bytes::from_static(body),
        }
    }

    #[test]
    fn greeting_requests_server_list() {
        let (mut handler, _rx) = handler();
        let mut outbound = Vec::new();
        let action = handler
            .handle(&packet(0x00, 0x01, &[]), &mut outbound)
            .unwrap();
        assert_eq!(action, ConnectAction::GreetingReceived);
        assert_eq!(outbound.len(), 1);
        assert_eq!(outbound[0].code, 0xF4);
        assert_eq!(outbound[0].body.as_ref(), &[0x06]);
    }

    #[test]
    fn server_list_is_stored_and_surfaced() {
        let (mut handler, mut rx) = handler();
        let mut outbound = Vec::new();
        let action = handler
            .handle(
                &packet(0xF4, 0x06, &[0x00, 0x01, 0x00, 0x00, 0x14, 0x00]),
                &mut outbound,
            )
            .unwrap();
        assert_eq!(action, ConnectAction::ServerListReceived);
        assert!(handler.knows_server(0));
        assert!(!handler.knows_server(7));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ClientEvent::ServerList(list) if list.len() == 1 && list[0].load == 20
        ));
    }

    #[test]
    fn connection_info_triggers_handover() {
        let (mut handler, _rx) = handler();
        let mut outbound = Vec::new();
        let action = handler
            .handle(
                &packet(
                    0xF4,
                    0x03,
                    b"10.0.0.5\0\0\0\0\0\0\0\0\xDC\xA8",
                ),
                &mut outbound,
            )
            .unwrap();
        assert_eq!(
            action,
            ConnectAction::Handover {
                host: "10.0.0.5".into(),
                port: 56488,
            }
        );
    }

    #[test]
    fn unknown_packets_are_tolerated() {
        let (mut handler, _rx) = handler();
        let mut outbound = Vec::new();
        let action = handler
            .handle(&packet(0x05, 0x00, &[0xDE, 0xAD]), &mut outbound)
            .unwrap();
        assert_eq!(action, ConnectAction::None);
        assert!(outbound.is_empty());
    }
}
