use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rhyme_core::PlayerRoster;
use rhyme_types::{GameState, SessionError};

/// Durable per-room store for the session's two keys.
///
/// The roster and game state are read and written as one record: a reader
/// can never observe one updated without the other.
#[async_trait]
pub trait RoomStorage: Send + Sync {
    async fn load(&self, room_id: &str)
    -> Result<Option<(PlayerRoster, GameState)>, SessionError>;

    async fn store(
        &self,
        room_id: &str,
        players: &PlayerRoster,
        state: &GameState,
    ) -> Result<(), SessionError>;
}

/// In-process backend standing in for the host's durable room store.
#[derive(Default)]
pub struct MemoryStorage {
    rooms: Mutex<HashMap<String, (PlayerRoster, GameState)>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomStorage for MemoryStorage {
    async fn load(
        &self,
        room_id: &str,
    ) -> Result<Option<(PlayerRoster, GameState)>, SessionError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms.get(room_id).cloned())
    }

    async fn store(
        &self,
        room_id: &str,
        players: &PlayerRoster,
        state: &GameState,
    ) -> Result<(), SessionError> {
        let mut rooms = self.rooms.lock().await;
        rooms.insert(room_id.to_string(), (players.clone(), state.clone()));
        Ok(())
    }
}
