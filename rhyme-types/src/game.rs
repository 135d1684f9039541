use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Players are identified by their transport connection id.
pub type PlayerId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum RhymeCategory {
    Great,
    Good,
    Okay,
    Nope,
}

impl RhymeCategory {
    /// Points awarded for a valid guess in this category.
    pub fn points(self) -> i32 {
        match self {
            RhymeCategory::Okay => 1,
            RhymeCategory::Good => 2,
            RhymeCategory::Great => 3,
            RhymeCategory::Nope => 0,
        }
    }
}

/// Percentile cuts of the rhyme score distribution, as reported by the
/// rhyme data service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RhymeCuts {
    #[serde(rename = "50th")]
    pub median: f64,
    #[serde(rename = "75th")]
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RhymeStats {
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub cuts: RhymeCuts,
    #[serde(default)]
    pub total: u32,
}

/// One entry of a round's valid-rhyme set, categorized at round creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ValidRhyme {
    pub word: String,
    pub score: f64,
    pub category: RhymeCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Guess {
    pub word: String,
    pub player_id: PlayerId,
    pub is_valid: bool,
    pub category: RhymeCategory,
    pub submitted_at: i64, // epoch milliseconds
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct WordRound {
    pub target_word: String,
    pub valid_rhymes: Vec<ValidRhyme>,
    pub stats: RhymeStats,
    pub guesses: Vec<Guess>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub player_count: usize,
    pub room_id: String,
    pub started_at: i64, // epoch milliseconds
    pub current_player_id: Option<PlayerId>,
    pub rounds_played: u32,
    pub reveal_in_progress: bool,
}

/// Authoritative per-room game state. `rounds` is non-empty once the session
/// has started; the last entry is the active round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameState {
    pub rounds: Vec<WordRound>,
    pub session: SessionInfo,
}

impl GameState {
    pub fn current_round(&self) -> Option<&WordRound> {
        self.rounds.last()
    }

    pub fn current_round_mut(&mut self) -> Option<&mut WordRound> {
        self.rounds.last_mut()
    }

    /// Drop the valid-rhyme sets from every round before long-term storage.
    /// The guess history (with per-guess categories) is all that rankings
    /// and replays need.
    pub fn strip_valid_rhymes(&mut self) {
        for round in &mut self.rounds {
            round.valid_rhymes.clear();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    pub rank: u32,
    pub player_id: PlayerId,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_points() {
        assert_eq!(RhymeCategory::Okay.points(), 1);
        assert_eq!(RhymeCategory::Good.points(), 2);
        assert_eq!(RhymeCategory::Great.points(), 3);
        assert_eq!(RhymeCategory::Nope.points(), 0);
    }

    #[test]
    fn stats_cuts_use_percentile_keys() {
        let json = r#"{"mean":10.0,"cuts":{"50th":12.0,"75th":18.0},"total":42}"#;
        let stats: RhymeStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.cuts.median, 12.0);
        assert_eq!(stats.cuts.upper, 18.0);
        assert_eq!(stats.total, 42);
    }

    #[test]
    fn strip_valid_rhymes_clears_every_round() {
        let rhyme = ValidRhyme {
            word: "spoon".to_string(),
            score: 20.0,
            category: RhymeCategory::Great,
        };
        let round = WordRound {
            target_word: "moon".to_string(),
            valid_rhymes: vec![rhyme.clone(), rhyme],
            stats: RhymeStats::default(),
            guesses: Vec::new(),
        };
        let mut state = GameState {
            rounds: vec![round.clone(), round],
            session: SessionInfo {
                player_count: 0,
                room_id: "lobby".to_string(),
                started_at: 0,
                current_player_id: None,
                rounds_played: 0,
                reveal_in_progress: false,
            },
        };

        state.strip_valid_rhymes();
        assert!(state.rounds.iter().all(|r| r.valid_rhymes.is_empty()));
        // Guess history survives the strip
        assert_eq!(state.rounds.len(), 2);
    }
}
