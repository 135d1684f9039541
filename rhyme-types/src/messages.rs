use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameState, Guess, PlayerId, Ranking};

/// Inbound frames. Anything that does not parse as one of these shapes is
/// dropped by the session without a reply.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Rhyme { room: String, rhyme: RhymeSubmission },
}

/// Clients may attach extra presentation fields to a submission; only the
/// word matters to the session.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RhymeSubmission {
    pub word: String,
}

/// Outbound frames, broadcast to every connection in the room.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    Sync {
        game_state: GameState,
        current_player_id: Option<PlayerId>,
        next_player_id: Option<PlayerId>,
    },
    RoomFull {
        room_full: bool,
        connection_id: String,
    },
    PlayedWord {
        word: String,
        user: PlayerId,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        max_moves: u32,
        progress: Vec<Guess>,
    },
    RevealGuesses,
    GameFinished {
        rankings: Vec<Ranking>,
    },
    #[serde(rename_all = "camelCase")]
    PlayerLeft {
        player_id: PlayerId,
    },
}
