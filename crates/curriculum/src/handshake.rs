use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    ClientToServer,
    ServerToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientToServer => f.write_str("client -> server"),
            Self::ServerToClient => f.write_str("server -> client"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandshakeStep {
    pub direction: Direction,
    pub label: &'static str,
    pub note: &'static str,
    pub description: &'static str,
}

/// SYN, SYN-ACK, ACK, then the first request on the new connection.
pub fn handshake_steps() -> Vec<HandshakeStep> {
    vec![
        HandshakeStep {
            direction: Direction::ClientToServer,
            label: "SYN",
            note: "Client wants to connect",
            description: "Client sends a SYN (synchronize) segment. It picks a random \
                          sequence number, e.g. seq=100. This says \"I want to establish a \
                          connection.\"",
        },
        HandshakeStep {
            direction: Direction::ServerToClient,
            label: "SYN-ACK",
            note: "Server acknowledges + syncs",
            description: "Server responds with SYN-ACK. It acknowledges client's seq \
                          (ack=101) and sends its own sequence number (seq=300). Says \
                          \"Acknowledged, I'm ready too.\"",
        },
        HandshakeStep {
            direction: Direction::ClientToServer,
            label: "ACK",
            note: "Connection established!",
            description: "Client sends final ACK (ack=301) confirming it received server's \
                          sequence. Both sides are now synchronized; data transfer can begin.",
        },
        HandshakeStep {
            direction: Direction::ClientToServer,
            label: "DATA",
            note: "HTTP request sent",
            description: "Connection established. Client sends the actual HTTP GET request. \
                          Server processes it and sends back the response.",
        },
    ]
}
