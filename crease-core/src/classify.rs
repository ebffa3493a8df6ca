//! Per-team classification of a completed match.
//!
//! The decision procedure runs in strict priority order: participation,
//! tie, explicit winner, no-result/abandoned, then the conservative
//! fallback. A match without a definitive structured result is never
//! counted as a loss or a draw; it is skipped, and a skipped match
//! contributes nothing downstream.

use serde::{Deserialize, Serialize};

use crate::overs::OversFormatError;
use crate::scorecard::{MatchRecord, ResultType};

/// Outcome of a match from one team's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
    /// Excluded entirely from tallies and from NRR inputs: no-result,
    /// abandoned, or a record with no structured result at all.
    Skip,
}

impl Outcome {
    /// Whether this outcome enters the win/loss/draw tallies.
    #[must_use]
    pub const fn counts(self) -> bool {
        !matches!(self, Self::Skip)
    }
}

/// Runs, wickets and balls summed over all qualifying innings of one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsTotals {
    pub runs: u32,
    pub wickets: u32,
    pub balls: u32,
}

impl InningsTotals {
    const fn fold(&mut self, runs: u32, wickets: u32, balls: u32) {
        self.runs = self.runs.saturating_add(runs);
        self.wickets = self.wickets.saturating_add(wickets);
        self.balls = self.balls.saturating_add(balls);
    }
}

/// One team's classified view of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub match_id: String,
    pub outcome: Outcome,
    /// Runs scored, wickets lost, balls faced.
    pub batting: InningsTotals,
    /// Runs conceded, wickets taken, balls bowled.
    pub bowling: InningsTotals,
}

/// Classify `record` from the perspective of `team_id`.
///
/// Returns `None` when the team did not take part in the match. Innings
/// contributions are only extracted for countable outcomes; a skipped match
/// carries zeroed totals.
///
/// # Errors
///
/// Returns [`OversFormatError`] if an innings carries a malformed overs
/// value. Records validated at ingestion will not hit this.
pub fn classify(
    record: &MatchRecord,
    team_id: &str,
) -> Result<Option<Classification>, OversFormatError> {
    if !record.involves(team_id) {
        return Ok(None);
    }

    let summary = &record.result_summary;
    let outcome = if summary.result_type == ResultType::Tied {
        Outcome::Draw
    } else if let Some(winner) = summary.winner_id.as_deref() {
        // An explicit winner outranks the no-result/abandoned tags: an
        // awarded result (forfeit, walkover) still counts.
        if winner == team_id {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    } else {
        // No definitive result: no-result, abandoned, or a completed
        // record with no winner at all.
        Outcome::Skip
    };

    let mut batting = InningsTotals::default();
    let mut bowling = InningsTotals::default();
    if outcome.counts() {
        for innings in record.scorecard.all_innings() {
            let balls = innings.overs()?.total_balls();
            if innings.batting_team_id == team_id {
                batting.fold(innings.total_runs, innings.total_wickets, balls);
            } else {
                bowling.fold(innings.total_runs, innings.total_wickets, balls);
            }
        }
    }

    Ok(Some(Classification {
        match_id: record.id.clone(),
        outcome,
        batting,
        bowling,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorecard::{Innings, ResultSummary, Scorecard};

    fn two_innings_match(result: ResultSummary) -> MatchRecord {
        MatchRecord {
            id: "m1".to_string(),
            team1_id: "t-red".to_string(),
            team2_id: "t-blue".to_string(),
            scorecard: Scorecard {
                team1_innings: vec![Innings {
                    batting_team_id: "t-red".to_string(),
                    total_runs: 150,
                    total_wickets: 6,
                    total_overs: 20.0,
                }],
                team2_innings: vec![Innings {
                    batting_team_id: "t-blue".to_string(),
                    total_runs: 140,
                    total_wickets: 8,
                    total_overs: 20.0,
                }],
            },
            result_summary: result,
        }
    }

    #[test]
    fn non_participant_is_none() {
        let record = two_innings_match(ResultSummary::default());
        assert_eq!(classify(&record, "t-green").unwrap(), None);
    }

    #[test]
    fn winner_id_decides_win_and_loss() {
        let record = two_innings_match(ResultSummary {
            result_type: ResultType::Completed,
            winner_id: Some("t-red".to_string()),
        });
        let red = classify(&record, "t-red").unwrap().unwrap();
        assert_eq!(red.outcome, Outcome::Win);
        assert_eq!(
            red.batting,
            InningsTotals {
                runs: 150,
                wickets: 6,
                balls: 120
            }
        );
        assert_eq!(
            red.bowling,
            InningsTotals {
                runs: 140,
                wickets: 8,
                balls: 120
            }
        );

        let blue = classify(&record, "t-blue").unwrap().unwrap();
        assert_eq!(blue.outcome, Outcome::Loss);
        assert_eq!(blue.batting.runs, 140);
        assert_eq!(blue.bowling.runs, 150);
    }

    #[test]
    fn tied_takes_priority_over_winner_field() {
        // A tied result with a stray winner_id still classifies as a draw.
        let record = two_innings_match(ResultSummary {
            result_type: ResultType::Tied,
            winner_id: Some("t-red".to_string()),
        });
        let red = classify(&record, "t-red").unwrap().unwrap();
        assert_eq!(red.outcome, Outcome::Draw);
    }

    #[test]
    fn no_result_and_abandoned_skip_with_zero_contribution() {
        for result_type in [ResultType::NoResult, ResultType::Abandoned] {
            let record = two_innings_match(ResultSummary {
                result_type,
                winner_id: None,
            });
            let c = classify(&record, "t-red").unwrap().unwrap();
            assert_eq!(c.outcome, Outcome::Skip);
            assert_eq!(c.batting, InningsTotals::default());
            assert_eq!(c.bowling, InningsTotals::default());
        }
    }

    #[test]
    fn awarded_winner_outranks_no_result_tag() {
        // A forfeit or awarded result carries a winner alongside a
        // no-result/abandoned tag; the winner decides.
        for result_type in [ResultType::NoResult, ResultType::Abandoned] {
            let record = two_innings_match(ResultSummary {
                result_type,
                winner_id: Some("t-red".to_string()),
            });
            let red = classify(&record, "t-red").unwrap().unwrap();
            assert_eq!(red.outcome, Outcome::Win);
            assert_eq!(red.batting.runs, 150);

            let blue = classify(&record, "t-blue").unwrap().unwrap();
            assert_eq!(blue.outcome, Outcome::Loss);
        }
    }

    #[test]
    fn missing_structured_result_skips_not_loses() {
        let record = two_innings_match(ResultSummary::default());
        let c = classify(&record, "t-blue").unwrap().unwrap();
        assert_eq!(c.outcome, Outcome::Skip);
    }

    #[test]
    fn multi_innings_contributions_accumulate() {
        let mut record = two_innings_match(ResultSummary {
            result_type: ResultType::Completed,
            winner_id: Some("t-red".to_string()),
        });
        record.scorecard.team1_innings.push(Innings {
            batting_team_id: "t-red".to_string(),
            total_runs: 80,
            total_wickets: 3,
            total_overs: 10.3,
        });
        let red = classify(&record, "t-red").unwrap().unwrap();
        assert_eq!(red.batting.runs, 230);
        assert_eq!(red.batting.wickets, 9);
        assert_eq!(red.batting.balls, 120 + 63);
    }
}
