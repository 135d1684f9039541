use thiserror::Error;

/// Failures a room session can hit while handling an event.
///
/// Rhyme-data failures are recovered locally (the round degrades to an empty
/// candidate set); directory and storage failures abort the handler without
/// partial writes.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("rhyme data fetch failed for '{word}': {reason}")]
    RhymeFetch { word: String, reason: String },

    #[error("room directory lookup failed for room '{room}': {reason}")]
    RoomDirectory { room: String, reason: String },

    #[error("no session state for room '{0}': start has not completed")]
    StateNotInitialized(String),

    #[error("storage failure for room '{room}': {reason}")]
    Storage { room: String, reason: String },
}
