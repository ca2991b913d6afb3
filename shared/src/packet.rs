//! Wire packets for the discovery and status protocol.
//!
//! All discovery traffic is connectionless UDP. A request carries a
//! challenge number that the host echoes back, so a late reply for an
//! abandoned request can be ignored by the receiver.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    /// Broadcast or unicast probe asking a host for its info string.
    InfoRequest {
        challenge: u32,
    },
    /// Info reply: a backslash-delimited key/value string
    /// (hostname, map, clients, sv_maxclients, gametype, ...).
    InfoResponse {
        challenge: u32,
        info: String,
    },
    /// Asks a host for its full status text, including connected players.
    StatusRequest {
        challenge: u32,
    },
    /// Status reply: metadata pairs followed by `score ping name` player
    /// rows, see `browser::status` for the grammar.
    StatusResponse {
        challenge: u32,
        text: String,
    },
    /// Asks a master directory for every host it knows about.
    MasterRequest {
        protocol: i32,
    },
    MasterResponse {
        addresses: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_serialization_info() {
        let packet = Packet::InfoResponse {
            challenge: 77,
            info: "\\hostname\\Test Server\\mapname\\atcs\\clients\\3".to_string(),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::InfoResponse { challenge, info } => {
                assert_eq!(challenge, 77);
                assert!(info.contains("\\hostname\\Test Server"));
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_master_response() {
        let packet = Packet::MasterResponse {
            addresses: vec!["10.0.0.1:30720".to_string(), "10.0.0.2:30721-1.1".to_string()],
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::MasterResponse { addresses } => {
                assert_eq!(addresses.len(), 2);
                assert_eq!(addresses[1], "10.0.0.2:30721-1.1");
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_status_request() {
        let packet = Packet::StatusRequest { challenge: 9001 };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::StatusRequest { challenge } => assert_eq!(challenge, 9001),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
