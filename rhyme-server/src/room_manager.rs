use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::info;

use rhyme_core::WordSelector;

use crate::config::Config;
use crate::providers::{RhymeProvider, RoomDirectory};
use crate::session::{RoomEvent, RoomSession};
use crate::storage::RoomStorage;
use crate::websocket::connection::Connection;

/// Registry of live room sessions.
///
/// A session is created (and `on_start` runs) when the first connection
/// joins a room, and its entry is reaped when the session task exits after
/// the last connection closes. Persisted room state outlives the session.
pub struct RoomManager {
    rooms: Arc<DashMap<String, mpsc::UnboundedSender<RoomEvent>>>,
    config: Arc<Config>,
    storage: Arc<dyn RoomStorage>,
    rhymes: Arc<dyn RhymeProvider>,
    directory: Arc<dyn RoomDirectory>,
    selector: WordSelector,
}

impl RoomManager {
    pub fn new(
        config: Arc<Config>,
        storage: Arc<dyn RoomStorage>,
        rhymes: Arc<dyn RhymeProvider>,
        directory: Arc<dyn RoomDirectory>,
        selector: WordSelector,
    ) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            config,
            storage,
            rhymes,
            directory,
            selector,
        }
    }

    /// Route a new connection into its room, creating the session if
    /// needed. Returns the room's event sender for the connection's
    /// subsequent frames.
    pub fn join(&self, room_id: &str, connection: Connection) -> mpsc::UnboundedSender<RoomEvent> {
        let mut event = RoomEvent::Connect { connection };
        loop {
            let handle = self
                .rooms
                .entry(room_id.to_string())
                .or_insert_with(|| self.spawn_room(room_id))
                .clone();
            match handle.send(event) {
                Ok(()) => return handle,
                // The session exited between lookup and send; retry with a
                // fresh one.
                Err(mpsc::error::SendError(unsent)) => {
                    self.rooms.remove(room_id);
                    event = unsent;
                }
            }
        }
    }

    pub fn active_rooms(&self) -> usize {
        self.rooms.len()
    }

    fn spawn_room(&self, room_id: &str) -> mpsc::UnboundedSender<RoomEvent> {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = RoomSession::new(
            room_id.to_string(),
            self.config.clone(),
            self.storage.clone(),
            self.rhymes.clone(),
            self.directory.clone(),
            self.selector.clone(),
            events.clone(),
        );

        let rooms = self.rooms.clone();
        let room_id = room_id.to_string();
        let handle = events.clone();
        tokio::spawn(async move {
            session.run(receiver).await;
            // Only reap our own entry; a newer session may own the key.
            rooms.remove_if(&room_id, |_, sender| sender.same_channel(&handle));
            info!(room = %room_id, "room removed from registry");
        });

        events
    }
}
