use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use rhyme_core::{
    GuessOutcome, PlayerRoster, RoundData, SeedMode, WordSelector, calculate_rankings,
    create_round, is_game_finished, is_round_finished, submit_guess,
};
use rhyme_types::{ClientMessage, GameState, ServerMessage, SessionError, SessionInfo};

use crate::config::Config;
use crate::providers::{RhymeProvider, RoomDirectory};
use crate::storage::RoomStorage;
use crate::websocket::connection::{Connection, ConnectionId};

/// Transport events delivered to a room, one at a time.
#[derive(Debug)]
pub enum RoomEvent {
    Connect {
        connection: Connection,
    },
    Message {
        connection_id: ConnectionId,
        raw: String,
    },
    Close {
        connection_id: ConnectionId,
    },
    /// The reveal delay elapsed for the completed round.
    RevealElapsed,
}

/// The per-room session state machine.
///
/// Each session runs as its own task consuming an event queue, so handlers
/// never interleave: every handler reads both persisted keys, mutates in
/// memory, and writes both keys back before the next event is processed.
/// The reveal delay is the one deferred step; it re-enters the queue as a
/// `RevealElapsed` event and re-reads fresh state when it fires.
pub struct RoomSession {
    room_id: String,
    config: Arc<Config>,
    storage: Arc<dyn RoomStorage>,
    rhymes: Arc<dyn RhymeProvider>,
    directory: Arc<dyn RoomDirectory>,
    selector: WordSelector,
    connections: HashMap<ConnectionId, Connection>,
    events: mpsc::UnboundedSender<RoomEvent>,
    reveal_task: Option<JoinHandle<()>>,
}

impl RoomSession {
    pub fn new(
        room_id: String,
        config: Arc<Config>,
        storage: Arc<dyn RoomStorage>,
        rhymes: Arc<dyn RhymeProvider>,
        directory: Arc<dyn RoomDirectory>,
        selector: WordSelector,
        events: mpsc::UnboundedSender<RoomEvent>,
    ) -> Self {
        Self {
            room_id,
            config,
            storage,
            rhymes,
            directory,
            selector,
            connections: HashMap::new(),
            events,
            reveal_task: None,
        }
    }

    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<RoomEvent>) {
        if let Err(err) = self.on_start().await {
            error!(room = %self.room_id, %err, "failed to initialize room session");
            return;
        }
        info!(room = %self.room_id, "room session started");

        while let Some(event) = events.recv().await {
            let was_close = matches!(event, RoomEvent::Close { .. });
            let result = match event {
                RoomEvent::Connect { connection } => self.on_connect(connection).await,
                RoomEvent::Message { connection_id, raw } => {
                    self.on_message(connection_id, &raw).await
                }
                RoomEvent::Close { connection_id } => self.on_close(connection_id).await,
                RoomEvent::RevealElapsed => self.on_reveal_elapsed().await,
            };
            if let Err(err) = result {
                error!(room = %self.room_id, %err, "event handler failed");
            }
            if was_close && self.connections.is_empty() {
                break;
            }
        }

        self.cancel_reveal();
        info!(room = %self.room_id, "room session closed");
    }

    /// Persist the initial session record: one freshly fetched round and an
    /// empty roster.
    pub async fn on_start(&mut self) -> Result<(), SessionError> {
        let state = self.fresh_game_state().await;
        self.storage
            .store(&self.room_id, &PlayerRoster::new(), &state)
            .await
    }

    pub async fn on_connect(&mut self, connection: Connection) -> Result<(), SessionError> {
        let connection_id = connection.id;
        self.connections.insert(connection_id, connection);

        let (mut players, mut state) = self.load_session().await?;
        let max_players = self.directory.max_players(&self.room_id).await?;

        if players.len() >= max_players {
            info!(room = %self.room_id, %connection_id, "room full, rejecting connection");
            self.broadcast(&ServerMessage::RoomFull {
                room_full: true,
                connection_id: connection_id.to_string(),
            });
            return Ok(());
        }

        let player_id = connection_id.to_string();
        players.add(&player_id);
        state.session.player_count = players.len();

        // A join only establishes the turn when no valid holder exists.
        let holder_present = state
            .session
            .current_player_id
            .as_deref()
            .is_some_and(|cur| players.contains(cur));
        if !holder_present {
            state.session.current_player_id = players.next_after(None);
        }

        self.storage.store(&self.room_id, &players, &state).await?;
        self.broadcast_sync(&state, Some(player_id));
        Ok(())
    }

    pub async fn on_message(
        &mut self,
        connection_id: ConnectionId,
        raw: &str,
    ) -> Result<(), SessionError> {
        let Ok(ClientMessage::Rhyme { room, rhyme }) = serde_json::from_str::<ClientMessage>(raw)
        else {
            debug!(room = %self.room_id, %connection_id, "ignoring unrecognized frame");
            return Ok(());
        };
        if room != self.room_id {
            return Ok(());
        }

        let (players, mut state) = self.load_session().await?;

        // The completed round is frozen until the reveal fires.
        if state.session.reveal_in_progress {
            return Ok(());
        }
        if is_game_finished(state.rounds.len(), self.config.max_rounds)
            && state
                .current_round()
                .is_some_and(|r| is_round_finished(r, self.config.max_moves_per_player))
        {
            return Ok(());
        }

        let player_id = connection_id.to_string();
        let submitted_at = Utc::now().timestamp_millis();
        let (outcome, finished, progress) = {
            let round = state
                .current_round_mut()
                .ok_or_else(|| SessionError::StateNotInitialized(self.room_id.clone()))?;
            let outcome = submit_guess(round, &rhyme.word, &player_id, submitted_at);
            let finished = matches!(outcome, GuessOutcome::Accepted(_))
                && is_round_finished(round, self.config.max_moves_per_player);
            let progress = if finished {
                round.guesses.clone()
            } else {
                Vec::new()
            };
            (outcome, finished, progress)
        };

        if let GuessOutcome::Duplicate(word) = outcome {
            self.broadcast(&ServerMessage::PlayedWord {
                word,
                user: player_id,
            });
            return Ok(());
        }

        if !finished {
            state.session.current_player_id = players
                .next_after(state.session.current_player_id.as_deref());
            self.storage.store(&self.room_id, &players, &state).await?;
            self.broadcast_sync(&state, Some(player_id));
            return Ok(());
        }

        state.session.reveal_in_progress = true;
        self.storage.store(&self.room_id, &players, &state).await?;
        self.broadcast(&ServerMessage::Progress {
            max_moves: self.config.max_moves_per_player,
            progress,
        });
        self.broadcast(&ServerMessage::RevealGuesses);
        self.schedule_reveal();
        Ok(())
    }

    pub async fn on_close(&mut self, connection_id: ConnectionId) -> Result<(), SessionError> {
        self.connections.remove(&connection_id);

        let (mut players, mut state) = self.load_session().await?;
        let player_id = connection_id.to_string();
        if !players.remove(&player_id) {
            // Never admitted (room_full rejection); nothing to update.
            return Ok(());
        }
        state.session.player_count = players.len();

        if players.is_empty() {
            self.cancel_reveal();
            let fresh = self.fresh_game_state().await;
            self.storage
                .store(&self.room_id, &PlayerRoster::new(), &fresh)
                .await?;
            self.broadcast(&ServerMessage::PlayerLeft { player_id });
            info!(room = %self.room_id, "last player left, session reset");
            return Ok(());
        }

        if state.session.current_player_id.as_deref() == Some(player_id.as_str()) {
            state.session.current_player_id = players.next_after(Some(player_id.as_str()));
        }

        self.storage.store(&self.room_id, &players, &state).await?;
        self.broadcast(&ServerMessage::PlayerLeft { player_id });
        self.broadcast_sync(&state, None);
        Ok(())
    }

    /// The reveal delay for a completed round has elapsed: either finish the
    /// game or append the next round. State is re-read because the roster
    /// may have changed during the delay.
    pub async fn on_reveal_elapsed(&mut self) -> Result<(), SessionError> {
        self.reveal_task = None;

        let (players, mut state) = self.load_session().await?;
        if !state.session.reveal_in_progress {
            // Stale timer; the session was reset during the delay.
            return Ok(());
        }
        state.session.reveal_in_progress = false;
        state.session.rounds_played += 1;

        if is_game_finished(state.rounds.len(), self.config.max_rounds) {
            let rankings = calculate_rankings(&state.rounds);
            self.broadcast(&ServerMessage::GameFinished { rankings });
            state.strip_valid_rhymes();
            self.storage.store(&self.room_id, &players, &state).await?;
            info!(room = %self.room_id, rounds = state.rounds.len(), "game finished");
            return Ok(());
        }

        let round = self.new_round().await;
        state.rounds.push(round);
        state.session.current_player_id = players
            .next_after(state.session.current_player_id.as_deref());
        self.storage.store(&self.room_id, &players, &state).await?;
        self.broadcast_sync(&state, None);
        Ok(())
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    async fn load_session(&self) -> Result<(PlayerRoster, GameState), SessionError> {
        self.storage
            .load(&self.room_id)
            .await?
            .ok_or_else(|| SessionError::StateNotInitialized(self.room_id.clone()))
    }

    async fn fresh_game_state(&self) -> GameState {
        let round = self.new_round().await;
        GameState {
            rounds: vec![round],
            session: SessionInfo {
                player_count: 0,
                room_id: self.room_id.clone(),
                started_at: Utc::now().timestamp_millis(),
                current_player_id: None,
                rounds_played: 0,
                reveal_in_progress: false,
            },
        }
    }

    /// Pick a target word and fetch its rhyme set. A word with too few
    /// candidates is re-rolled; a fetch error retries the same word. After
    /// the attempt budget the round is built from whatever is available,
    /// down to an empty candidate set.
    async fn new_round(&self) -> rhyme_types::WordRound {
        let mut word = self.selector.select(SeedMode::Random);
        for attempt in 1..=self.config.fetch_retry_count {
            match self.rhymes.fetch_rhymes(&word).await {
                Ok(data) => {
                    if !data.is_low_information(self.config.min_rhyme_candidates)
                        || attempt == self.config.fetch_retry_count
                    {
                        return create_round(&word, data);
                    }
                    debug!(
                        room = %self.room_id,
                        %word,
                        candidates = data.candidates.len(),
                        "rhyme set too small, re-rolling word"
                    );
                    word = self.selector.select(SeedMode::Random);
                }
                Err(err) => {
                    warn!(room = %self.room_id, %word, %err, "rhyme fetch failed");
                }
            }
        }
        create_round(&word, RoundData::default())
    }

    fn broadcast(&self, message: &ServerMessage) {
        for connection in self.connections.values() {
            let _ = connection.send(message.clone());
        }
    }

    /// `current_player_id` on the wire is the player this event was about;
    /// `next_player_id` is the session's turn holder.
    fn broadcast_sync(&self, state: &GameState, about: Option<String>) {
        self.broadcast(&ServerMessage::Sync {
            game_state: state.clone(),
            current_player_id: about,
            next_player_id: state.session.current_player_id.clone(),
        });
    }

    fn schedule_reveal(&mut self) {
        self.cancel_reveal();
        let events = self.events.clone();
        let delay = Duration::from_secs(self.config.reveal_delay_seconds);
        self.reveal_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(RoomEvent::RevealElapsed);
        }));
    }

    fn cancel_reveal(&mut self) {
        if let Some(task) = self.reveal_task.take() {
            task.abort();
        }
    }
}
