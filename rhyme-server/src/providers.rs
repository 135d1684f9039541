use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use rhyme_core::{RhymeCandidate, RoundData};
use rhyme_types::{RhymeStats, SessionError};

/// External rhyme data service. A transport-level failure is an error (the
/// caller decides whether to retry); a reachable-but-unhelpful response
/// (non-2xx, malformed payload) degrades to the empty result.
#[async_trait]
pub trait RhymeProvider: Send + Sync {
    async fn fetch_rhymes(&self, word: &str) -> Result<RoundData, SessionError>;
}

/// Room registration service; the source of truth for room capacity.
/// Lookups fail closed: no record, no admission.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    async fn max_players(&self, room_id: &str) -> Result<usize, SessionError>;
}

#[derive(Debug, Deserialize)]
struct RhymeApiResponse {
    words: Option<Vec<RhymeApiWord>>,
    #[serde(default)]
    stats: RhymeStats,
}

#[derive(Debug, Deserialize)]
struct RhymeApiWord {
    word: String,
    score: f64,
}

fn parse_round_data(payload: serde_json::Value) -> RoundData {
    let Ok(parsed) = serde_json::from_value::<RhymeApiResponse>(payload) else {
        return RoundData::default();
    };
    let Some(words) = parsed.words else {
        return RoundData::default();
    };
    RoundData {
        candidates: words
            .into_iter()
            .map(|w| RhymeCandidate {
                word: w.word,
                score: w.score,
            })
            .collect(),
        stats: parsed.stats,
    }
}

pub struct HttpRhymeProvider {
    client: Client,
    base_url: String,
}

impl HttpRhymeProvider {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RhymeProvider for HttpRhymeProvider {
    async fn fetch_rhymes(&self, word: &str) -> Result<RoundData, SessionError> {
        let url = format!("{}/{}.json", self.base_url, word);
        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| SessionError::RhymeFetch {
                    word: word.to_string(),
                    reason: e.to_string(),
                })?;

        if !response.status().is_success() {
            warn!(word, status = %response.status(), "rhyme service returned non-success");
            return Ok(RoundData::default());
        }

        match response.json::<serde_json::Value>().await {
            Ok(payload) => Ok(parse_round_data(payload)),
            Err(e) => {
                warn!(word, error = %e, "rhyme service returned malformed payload");
                Ok(RoundData::default())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RoomRecord {
    max_players: usize,
}

pub struct HttpRoomDirectory {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpRoomDirectory {
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl RoomDirectory for HttpRoomDirectory {
    async fn max_players(&self, room_id: &str) -> Result<usize, SessionError> {
        let url = format!(
            "{}/rhymer_rooms?select=max_players&room_id=eq.{}",
            self.base_url, room_id
        );
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| SessionError::RoomDirectory {
                room: room_id.to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SessionError::RoomDirectory {
                room: room_id.to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let records: Vec<RoomRecord> =
            response
                .json()
                .await
                .map_err(|e| SessionError::RoomDirectory {
                    room: room_id.to_string(),
                    reason: e.to_string(),
                })?;

        records
            .first()
            .map(|r| r.max_players)
            .ok_or_else(|| SessionError::RoomDirectory {
                room: room_id.to_string(),
                reason: "room not found".to_string(),
            })
    }
}
