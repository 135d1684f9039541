use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

use rhyme_types::ServerMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One room member at the transport level. The id doubles as the player id;
/// the sender feeds the connection's outbound frame pump.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { id, sender }, receiver)
    }

    pub fn send(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }
}
