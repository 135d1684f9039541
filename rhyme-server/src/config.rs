use std::env;

use rhyme_core::{DEFAULT_MAX_MOVES_PER_PLAYER, DEFAULT_MAX_ROUNDS};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub max_rounds: usize,
    pub max_moves_per_player: u32,
    pub reveal_delay_seconds: u64,
    /// Candidate count at or below which the target word is re-rolled.
    pub min_rhyme_candidates: usize,
    pub fetch_retry_count: u32,
    pub fetch_timeout_seconds: u64,
    pub rhyme_api_base_url: String,
    pub room_api_base_url: String,
    pub room_api_key: String,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            max_rounds: env::var("MAX_ROUNDS")
                .unwrap_or_else(|_| DEFAULT_MAX_ROUNDS.to_string())
                .parse()
                .expect("Invalid MAX_ROUNDS"),
            max_moves_per_player: env::var("MAX_MOVES_PER_PLAYER")
                .unwrap_or_else(|_| DEFAULT_MAX_MOVES_PER_PLAYER.to_string())
                .parse()
                .expect("Invalid MAX_MOVES_PER_PLAYER"),
            reveal_delay_seconds: env::var("REVEAL_DELAY_SECONDS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .expect("Invalid REVEAL_DELAY_SECONDS"),
            min_rhyme_candidates: env::var("MIN_RHYME_CANDIDATES")
                .unwrap_or_else(|_| "18".to_string())
                .parse()
                .expect("Invalid MIN_RHYME_CANDIDATES"),
            fetch_retry_count: env::var("FETCH_RETRY_COUNT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .expect("Invalid FETCH_RETRY_COUNT"),
            fetch_timeout_seconds: env::var("FETCH_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid FETCH_TIMEOUT_SECONDS"),
            rhyme_api_base_url: env::var("RHYME_API_BASE_URL")
                .unwrap_or_else(|_| "https://rhymetimewords.netlify.app/words/debug".to_string()),
            room_api_base_url: env::var("ROOM_API_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:54321/rest/v1".to_string()),
            room_api_key: env::var("ROOM_API_KEY").unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
