//! Connect Server packet definitions.

use bytes::{Buf, Bytes};

use crate::common::error::ProtocolResult;
use crate::protocol::framing::OutboundFrame;
use crate::protocol::packets::{codes::connect, read_fixed_string, require};

/// One game server as advertised by the Connect Server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerListEntry {
    pub id: u16,
    /// Utilization percentage, 0..=100.
    pub load: u8,
}

/// ServerListResponse payload: record count followed by four-byte records
/// (id, load, padding).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerList {
    pub servers: Vec<ServerListEntry>,
}

impl ServerList {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        require(buf, 2)?;
        let count = buf.get_u16() as usize;
        let mut servers = Vec::with_capacity(count);
        for _ in 0..count {
            require(buf, 4)?;
            let id = buf.get_u16();
            let load = buf.get_u8();
            buf.advance(1);
            servers.push(ServerListEntry { id, load });
        }
        Ok(Self { servers })
    }
}

/// ConnectionInfoResponse payload: null-padded IP string and the port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
}

impl ConnectionInfo {
    pub fn decode(buf: &mut Bytes) -> ProtocolResult<Self> {
        let host = read_fixed_string(buf, 16)?;
        require(buf, 2)?;
        let port = buf.get_u16();
        Ok(Self { host, port })
    }
}

/// Request the advertised server list.
pub fn build_server_list_request() -> OutboundFrame {
    OutboundFrame::new(connect::SERVER_INFO, vec![connect::SERVER_LIST_SUB])
}

/// Request the address of one game server.
pub fn build_connection_info_request(server_id: u16) -> OutboundFrame {
    let mut body = vec![connect::CONNECTION_INFO_SUB];
    body.extend_from_slice(&server_id.to_be_bytes());
    OutboundFrame::new(connect::SERVER_INFO, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_server_list() {
        let mut buf = Bytes::from_static(&[
            0x00, 0x02, // count
            0x00, 0x01, 0x2C, 0x00, // id 1, load 44%
            0x00, 0x13, 0x5F, 0x00, // id 19, load 95%
        ]);
        let list = ServerList::decode(&mut buf).unwrap();
        assert_eq!(
            list.servers,
            vec![
                ServerListEntry { id: 1, load: 44 },
                ServerListEntry { id: 19, load: 95 },
            ]
        );
    }

    #[test]
    fn truncated_server_list_fails() {
        let mut buf = Bytes::from_static(&[0x00, 0x02, 0x00, 0x01, 0x2C, 0x00, 0x00]);
        assert!(ServerList::decode(&mut buf).is_err());
    }

    #[test]
    fn decodes_connection_info() {
        let mut buf = Bytes::from_static(b"192.168.0.20\0\0\0\0\xDC\xC6");
        let info = ConnectionInfo::decode(&mut buf).unwrap();
        assert_eq!(info.host, "192.168.0.20");
        assert_eq!(info.port, 56518);
    }

    #[test]
    fn connection_info_request_carries_big_endian_id() {
        let frame = build_connection_info_request(0x0113);
        assert_eq!(frame.code, 0xF4);
        assert_eq!(frame.body.as_ref(), &[0x03, 0x01, 0x13]);
    }
}
