use rhyme_types::{Guess, Ranking, RhymeCategory, RhymeStats, ValidRhyme, WordRound};

pub const DEFAULT_MAX_MOVES_PER_PLAYER: u32 = 5;
pub const DEFAULT_MAX_ROUNDS: usize = 5;

/// Candidate rhymes and score statistics as returned by the rhyme data
/// service, before categorization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundData {
    pub candidates: Vec<RhymeCandidate>,
    pub stats: RhymeStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RhymeCandidate {
    pub word: String,
    pub score: f64,
}

impl RoundData {
    /// A round with too few candidates is unplayable; callers may re-roll
    /// the target word when this holds.
    pub fn is_low_information(&self, threshold: usize) -> bool {
        self.candidates.len() <= threshold
    }
}

/// Categorize a rhyme score against the round's score distribution.
///
/// Applied identically when annotating the valid-rhyme set and when scoring
/// a live guess against a matched candidate.
pub fn categorize_rhyme(score: f64, stats: &RhymeStats) -> RhymeCategory {
    if score > stats.cuts.upper {
        RhymeCategory::Great
    } else if score > stats.cuts.median {
        RhymeCategory::Good
    } else if score < stats.mean {
        RhymeCategory::Okay
    } else {
        RhymeCategory::Nope
    }
}

/// Build a fresh round for `target_word`, categorizing every candidate.
pub fn create_round(target_word: &str, data: RoundData) -> WordRound {
    let valid_rhymes = data
        .candidates
        .into_iter()
        .map(|c| ValidRhyme {
            category: categorize_rhyme(c.score, &data.stats),
            word: c.word,
            score: c.score,
        })
        .collect();

    WordRound {
        target_word: target_word.to_string(),
        valid_rhymes,
        stats: data.stats,
        guesses: Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessOutcome {
    Accepted(Guess),
    /// The word was already played this round; state is untouched.
    Duplicate(String),
}

/// Validate and record a guess against the active round.
///
/// The raw word is normalized (lowercase, trimmed) before the duplicate
/// check and the valid-rhyme match. Duplicates leave the round unchanged.
pub fn submit_guess(
    round: &mut WordRound,
    raw_word: &str,
    player_id: &str,
    submitted_at: i64,
) -> GuessOutcome {
    let normalized = raw_word.trim().to_lowercase();

    if round
        .guesses
        .iter()
        .any(|g| g.word.trim().to_lowercase() == normalized)
    {
        return GuessOutcome::Duplicate(normalized);
    }

    let matched = round
        .valid_rhymes
        .iter()
        .find(|r| r.word.trim().to_lowercase() == normalized);

    let guess = match matched {
        Some(rhyme) => Guess {
            word: normalized,
            player_id: player_id.to_string(),
            is_valid: true,
            category: rhyme.category,
            submitted_at,
        },
        None => Guess {
            word: normalized,
            player_id: player_id.to_string(),
            is_valid: false,
            category: RhymeCategory::Nope,
            submitted_at,
        },
    };

    round.guesses.push(guess.clone());
    GuessOutcome::Accepted(guess)
}

/// A round is finished once every player who has guessed at all has used up
/// their per-player move budget. A round with no guesses is never finished.
pub fn is_round_finished(round: &WordRound, max_moves_per_player: u32) -> bool {
    if round.guesses.is_empty() {
        return false;
    }

    let mut moves: Vec<(&str, u32)> = Vec::new();
    for guess in &round.guesses {
        match moves.iter_mut().find(|(id, _)| *id == guess.player_id) {
            Some((_, n)) => *n += 1,
            None => moves.push((guess.player_id.as_str(), 1)),
        }
    }

    moves.iter().all(|(_, n)| *n >= max_moves_per_player)
}

pub fn is_game_finished(round_count: usize, max_rounds: usize) -> bool {
    round_count >= max_rounds
}

/// Sum points over all valid guesses, rank descending. Ties keep the order
/// of first scoring appearance; ranks are distinct and 1-based.
pub fn calculate_rankings(rounds: &[WordRound]) -> Vec<Ranking> {
    let mut scores: Vec<(String, i32)> = Vec::new();

    for round in rounds {
        for guess in &round.guesses {
            if !guess.is_valid {
                continue;
            }
            let points = guess.category.points();
            match scores.iter_mut().find(|(id, _)| *id == guess.player_id) {
                Some((_, total)) => *total += points,
                None => scores.push((guess.player_id.clone(), points)),
            }
        }
    }

    scores.sort_by(|a, b| b.1.cmp(&a.1));

    scores
        .into_iter()
        .enumerate()
        .map(|(i, (player_id, score))| Ranking {
            rank: i as u32 + 1,
            player_id,
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_stats() -> RhymeStats {
        RhymeStats {
            mean: 10.0,
            cuts: rhyme_types::RhymeCuts {
                median: 12.0,
                upper: 18.0,
            },
            total: 40,
        }
    }

    fn test_round() -> WordRound {
        let data = RoundData {
            candidates: vec![
                RhymeCandidate {
                    word: "spoon".to_string(),
                    score: 20.0,
                },
                RhymeCandidate {
                    word: "june".to_string(),
                    score: 15.0,
                },
                RhymeCandidate {
                    word: "tune".to_string(),
                    score: 8.0,
                },
                RhymeCandidate {
                    word: "dune".to_string(),
                    score: 11.0,
                },
            ],
            stats: test_stats(),
        };
        create_round("moon", data)
    }

    #[test]
    fn categorization_follows_score_distribution() {
        let stats = test_stats();
        assert_eq!(categorize_rhyme(20.0, &stats), RhymeCategory::Great);
        assert_eq!(categorize_rhyme(15.0, &stats), RhymeCategory::Good);
        assert_eq!(categorize_rhyme(8.0, &stats), RhymeCategory::Okay);
        assert_eq!(categorize_rhyme(11.0, &stats), RhymeCategory::Nope);
    }

    #[test]
    fn categorization_boundaries() {
        let stats = test_stats();
        // Exactly the 75th cut is good, not great
        assert_eq!(categorize_rhyme(18.0, &stats), RhymeCategory::Good);
        // Exactly the median falls through to the mean comparison
        assert_eq!(categorize_rhyme(12.0, &stats), RhymeCategory::Nope);
        // Exactly the mean is neither okay nor good
        assert_eq!(categorize_rhyme(10.0, &stats), RhymeCategory::Nope);
    }

    #[test]
    fn create_round_categorizes_all_candidates() {
        let round = test_round();
        assert_eq!(round.target_word, "moon");
        assert_eq!(round.valid_rhymes.len(), 4);
        assert_eq!(round.valid_rhymes[0].category, RhymeCategory::Great);
        assert_eq!(round.valid_rhymes[1].category, RhymeCategory::Good);
        assert_eq!(round.valid_rhymes[2].category, RhymeCategory::Okay);
        assert_eq!(round.valid_rhymes[3].category, RhymeCategory::Nope);
        assert!(round.guesses.is_empty());
    }

    #[test]
    fn valid_guess_takes_matched_category() {
        let mut round = test_round();
        let outcome = submit_guess(&mut round, "Spoon", "p1", 1);
        let GuessOutcome::Accepted(guess) = outcome else {
            panic!("expected accepted guess");
        };
        assert!(guess.is_valid);
        assert_eq!(guess.category, RhymeCategory::Great);
        assert_eq!(guess.word, "spoon");
        assert_eq!(round.guesses.len(), 1);
    }

    #[test]
    fn unmatched_guess_is_invalid_nope() {
        let mut round = test_round();
        let GuessOutcome::Accepted(guess) = submit_guess(&mut round, "cheese", "p1", 1) else {
            panic!("expected accepted guess");
        };
        assert!(!guess.is_valid);
        assert_eq!(guess.category, RhymeCategory::Nope);
    }

    #[test]
    fn duplicate_detection_ignores_case_and_whitespace() {
        let mut round = test_round();
        submit_guess(&mut round, "Cat", "p1", 1);
        let outcome = submit_guess(&mut round, " cat ", "p2", 2);
        assert_eq!(outcome, GuessOutcome::Duplicate("cat".to_string()));
        assert_eq!(round.guesses.len(), 1);
    }

    #[test]
    fn empty_round_is_never_finished() {
        let round = test_round();
        assert!(!is_round_finished(&round, 1));
        assert!(!is_round_finished(&round, 0));
    }

    #[test]
    fn round_finishes_when_every_guesser_exhausts_budget() {
        let mut round = test_round();
        submit_guess(&mut round, "a1", "p1", 1);
        submit_guess(&mut round, "a2", "p1", 2);
        assert!(!is_round_finished(&round, 2)); // p1 done, but p2 below budget
        submit_guess(&mut round, "b1", "p2", 3);
        assert!(!is_round_finished(&round, 2));
        submit_guess(&mut round, "b2", "p2", 4);
        assert!(is_round_finished(&round, 2));
    }

    #[test]
    fn round_does_not_finish_on_total_count_alone() {
        let mut round = test_round();
        // Five guesses total, but split across two players
        for (i, w) in ["w1", "w2", "w3", "w4"].iter().enumerate() {
            submit_guess(&mut round, w, "p1", i as i64);
        }
        submit_guess(&mut round, "w5", "p2", 5);
        assert!(!is_round_finished(&round, 5));
    }

    #[test]
    fn game_finishes_at_max_rounds() {
        assert!(!is_game_finished(4, 5));
        assert!(is_game_finished(5, 5));
        assert!(is_game_finished(6, 5));
    }

    #[test]
    fn rankings_award_category_points_for_valid_guesses_only() {
        let mut round = test_round();
        submit_guess(&mut round, "spoon", "p1", 1); // great: 3
        submit_guess(&mut round, "tune", "p1", 2); // okay: 1
        submit_guess(&mut round, "june", "p2", 3); // good: 2
        submit_guess(&mut round, "dune", "p2", 4); // nope match: valid but 0
        submit_guess(&mut round, "cheese", "p3", 5); // invalid: no entry

        let rankings = calculate_rankings(&[round]);
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0].player_id, "p1");
        assert_eq!(rankings[0].score, 4);
        assert_eq!(rankings[0].rank, 1);
        assert_eq!(rankings[1].player_id, "p2");
        assert_eq!(rankings[1].score, 2);
        assert_eq!(rankings[1].rank, 2);
    }

    #[test]
    fn rankings_sum_across_rounds() {
        let mut r1 = test_round();
        let mut r2 = test_round();
        submit_guess(&mut r1, "june", "p1", 1); // 2
        submit_guess(&mut r2, "spoon", "p1", 2); // 3
        submit_guess(&mut r2, "tune", "p2", 3); // 1

        let rankings = calculate_rankings(&[r1, r2]);
        assert_eq!(rankings[0].player_id, "p1");
        assert_eq!(rankings[0].score, 5);
        assert_eq!(rankings[1].player_id, "p2");
        assert_eq!(rankings[1].score, 1);
    }

    #[test]
    fn ranks_are_distinct_and_increasing_even_on_ties() {
        let mut r1 = test_round();
        submit_guess(&mut r1, "tune", "p1", 1); // okay: 1
        let mut r2 = test_round();
        submit_guess(&mut r2, "tune", "p2", 2); // okay: 1

        let rankings = calculate_rankings(&[r1, r2]);
        let ranks: Vec<u32> = rankings.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        // Stable: p1 scored first, p1 ranks first
        assert_eq!(rankings[0].player_id, "p1");
    }

    #[test]
    fn low_information_threshold() {
        let data = RoundData {
            candidates: (0..18)
                .map(|i| RhymeCandidate {
                    word: format!("w{i}"),
                    score: 1.0,
                })
                .collect(),
            stats: RhymeStats::default(),
        };
        assert!(data.is_low_information(18));
        assert!(!data.is_low_information(17));
        assert!(RoundData::default().is_low_information(18));
    }
}
