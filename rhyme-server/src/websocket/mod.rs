use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::room_manager::RoomManager;
use crate::session::RoomEvent;

pub mod connection;

use connection::{Connection, ConnectionId};

pub async fn handle_connection(websocket: WebSocket, room_id: String, rooms: Arc<RoomManager>) {
    let connection_id = ConnectionId::new();
    info!(room = %room_id, %connection_id, "new WebSocket connection");

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let (connection, mut outgoing) = Connection::new(connection_id);
    let room = rooms.join(&room_id, connection);

    // Handle incoming frames
    let incoming_handler = {
        let room = room.clone();
        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        // Only text frames carry game messages
                        let Ok(text) = msg.to_str() else { continue };
                        let event = RoomEvent::Message {
                            connection_id,
                            raw: text.to_string(),
                        };
                        if room.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(%connection_id, error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    };

    // Handle outgoing frames
    let outgoing_handler = async move {
        while let Some(message) = outgoing.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!(%connection_id, error = %e, "failed to serialize message");
                    continue;
                }
            };

            if ws_sender.send(Message::text(json)).await.is_err() {
                break;
            }
        }
    };

    // Run both handlers concurrently
    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    info!(room = %room_id, %connection_id, "connection closed");
    let _ = room.send(RoomEvent::Close { connection_id });
}
