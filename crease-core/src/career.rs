//! Career-level rollup of per-match performances.
//!
//! [`accumulate`] is a pure fold: it never deduplicates. The engine enforces
//! the one-record-per-(match, player) contract at the storage boundary before
//! anything reaches this module; handed the same delta twice, the fold will
//! faithfully double-count (see the caller-contract test at the bottom).
//!
//! Averages and rates are derived on read and never stored, so they cannot
//! go stale against the counters they are computed from.

use serde::{Deserialize, Serialize};

use crate::overs::Overs;
use crate::performance::{Award, PlayerPerformance, TeamResult};

/// Best single-match bowling figures, ordered by wickets then fewer runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestBowling {
    pub wickets: u32,
    pub runs: u32,
}

impl BestBowling {
    /// Whether `candidate` beats the current best.
    #[must_use]
    pub const fn beaten_by(&self, candidate: Self) -> bool {
        candidate.wickets > self.wickets
            || (candidate.wickets == self.wickets && candidate.runs < self.runs)
    }
}

/// A player's all-time cumulative aggregate.
///
/// Every counter is monotonically non-decreasing under [`accumulate`]; only
/// a merge-time [`recompute`] may replace the record wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerStats {
    // Batting
    #[serde(default)]
    pub runs: u64,
    #[serde(default)]
    pub balls_faced: u64,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub sixes: u32,
    #[serde(default)]
    pub highest_score: u32,
    #[serde(default)]
    pub centuries: u32,
    #[serde(default)]
    pub half_centuries: u32,
    #[serde(default)]
    pub innings: u32,
    #[serde(default)]
    pub dismissals: u32,

    // Bowling
    #[serde(default)]
    pub overs_bowled: Overs,
    #[serde(default)]
    pub runs_conceded: u64,
    #[serde(default)]
    pub wickets: u32,
    #[serde(default)]
    pub maidens: u32,
    #[serde(default)]
    pub best_bowling: BestBowling,
    #[serde(default)]
    pub five_wicket_hauls: u32,

    // Fielding
    #[serde(default)]
    pub catches: u32,
    #[serde(default)]
    pub run_outs: u32,
    #[serde(default)]
    pub stumpings: u32,

    // Participation
    #[serde(default)]
    pub total_matches: u32,
    #[serde(default)]
    pub matches_won: u32,

    // Awards
    #[serde(default)]
    pub man_of_the_match: u32,
    #[serde(default)]
    pub best_batsman: u32,
    #[serde(default)]
    pub best_bowler: u32,
    #[serde(default)]
    pub best_fielder: u32,
}

impl CareerStats {
    /// Runs per dismissal; `None` while the player is yet to be dismissed.
    #[must_use]
    pub fn batting_average(&self) -> Option<f64> {
        if self.dismissals == 0 {
            return None;
        }
        Some(self.runs as f64 / f64::from(self.dismissals))
    }

    /// Runs per hundred balls faced; `None` before the first ball.
    #[must_use]
    pub fn strike_rate(&self) -> Option<f64> {
        if self.balls_faced == 0 {
            return None;
        }
        Some(self.runs as f64 / self.balls_faced as f64 * 100.0)
    }

    /// Runs conceded per wicket; `None` while wicketless.
    #[must_use]
    pub fn bowling_average(&self) -> Option<f64> {
        if self.wickets == 0 {
            return None;
        }
        Some(self.runs_conceded as f64 / f64::from(self.wickets))
    }

    /// Runs conceded per over; `None` before the first ball bowled.
    #[must_use]
    pub fn economy(&self) -> Option<f64> {
        let overs = self.overs_bowled.as_fraction();
        if overs <= 0.0 {
            return None;
        }
        Some(self.runs_conceded as f64 / overs)
    }
}

/// Fold one match's performance into the cumulative record.
///
/// Pure; the result replaces `existing` only after the caller's conditional
/// write succeeds. Deduplication of retried finalizations is the storage
/// layer's job, not this function's.
#[must_use]
pub fn accumulate(existing: &CareerStats, delta: &PlayerPerformance) -> CareerStats {
    let mut next = existing.clone();

    if let Some(batting) = &delta.batting {
        next.runs = next.runs.saturating_add(u64::from(batting.runs));
        next.balls_faced = next.balls_faced.saturating_add(u64::from(batting.balls));
        next.fours = next.fours.saturating_add(batting.fours);
        next.sixes = next.sixes.saturating_add(batting.sixes);
        next.innings = next.innings.saturating_add(1);
        if batting.runs > next.highest_score {
            next.highest_score = batting.runs;
        }
        if batting.runs >= 100 {
            next.centuries = next.centuries.saturating_add(1);
        } else if batting.runs >= 50 {
            next.half_centuries = next.half_centuries.saturating_add(1);
        }
        if batting.dismissal.is_out() {
            next.dismissals = next.dismissals.saturating_add(1);
        }
    }

    if let Some(bowling) = &delta.bowling {
        next.overs_bowled = next.overs_bowled.add(bowling.overs);
        next.runs_conceded = next
            .runs_conceded
            .saturating_add(u64::from(bowling.runs_conceded));
        next.wickets = next.wickets.saturating_add(bowling.wickets);
        next.maidens = next.maidens.saturating_add(bowling.maidens);
        let figures = BestBowling {
            wickets: bowling.wickets,
            runs: bowling.runs_conceded,
        };
        if next.best_bowling.beaten_by(figures) {
            next.best_bowling = figures;
        }
        if bowling.wickets >= 5 {
            next.five_wicket_hauls = next.five_wicket_hauls.saturating_add(1);
        }
    }

    next.catches = next.catches.saturating_add(delta.fielding.catches);
    next.run_outs = next.run_outs.saturating_add(delta.fielding.run_outs);
    next.stumpings = next.stumpings.saturating_add(delta.fielding.stumpings);

    next.total_matches = next.total_matches.saturating_add(1);
    if delta.team_result == TeamResult::Won {
        next.matches_won = next.matches_won.saturating_add(1);
    }

    for award in &delta.awards {
        match award {
            Award::ManOfTheMatch => {
                next.man_of_the_match = next.man_of_the_match.saturating_add(1);
            }
            Award::BestBatsman => next.best_batsman = next.best_batsman.saturating_add(1),
            Award::BestBowler => next.best_bowler = next.best_bowler.saturating_add(1),
            Award::BestFielder => next.best_fielder = next.best_fielder.saturating_add(1),
        }
    }

    next
}

/// Rebuild a career record wholesale from a performance history.
///
/// Used by the career-combining merge path and by administrative repair; the
/// only operation allowed to move counters downward.
#[must_use]
pub fn recompute(performances: &[PlayerPerformance]) -> CareerStats {
    performances
        .iter()
        .fold(CareerStats::default(), |acc, perf| accumulate(&acc, perf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::performance::{AwardSet, BattingStats, BowlingStats, Dismissal, FieldingStats};
    use smallvec::smallvec;

    fn sample_performance() -> PlayerPerformance {
        PlayerPerformance {
            match_id: "m1".to_string(),
            player_id: "p1".to_string(),
            team_id: "t1".to_string(),
            opposition: "Rovers".to_string(),
            venue: "Oval Park".to_string(),
            date: "2026-04-12".to_string(),
            team_result: TeamResult::Won,
            batting: Some(BattingStats {
                runs: 57,
                balls: 40,
                fours: 6,
                sixes: 2,
                dismissal: Dismissal::Caught,
            }),
            bowling: Some(BowlingStats {
                overs: Overs::from_decimal(4.0).unwrap(),
                runs_conceded: 22,
                wickets: 2,
                maidens: 1,
            }),
            fielding: FieldingStats {
                catches: 1,
                run_outs: 0,
                stumpings: 0,
            },
            awards: smallvec![Award::ManOfTheMatch],
        }
    }

    #[test]
    fn accumulate_folds_all_sections() {
        let career = accumulate(&CareerStats::default(), &sample_performance());
        assert_eq!(career.runs, 57);
        assert_eq!(career.balls_faced, 40);
        assert_eq!(career.fours, 6);
        assert_eq!(career.sixes, 2);
        assert_eq!(career.innings, 1);
        assert_eq!(career.dismissals, 1);
        assert_eq!(career.half_centuries, 1);
        assert_eq!(career.centuries, 0);
        assert_eq!(career.highest_score, 57);
        assert_eq!(career.overs_bowled.total_balls(), 24);
        assert_eq!(career.runs_conceded, 22);
        assert_eq!(career.wickets, 2);
        assert_eq!(career.maidens, 1);
        assert_eq!(career.catches, 1);
        assert_eq!(career.total_matches, 1);
        assert_eq!(career.matches_won, 1);
        assert_eq!(career.man_of_the_match, 1);
    }

    #[test]
    fn accumulate_is_not_idempotent_by_contract() {
        // Dedup lives at the storage boundary. Fed the same delta twice the
        // fold double-counts, which is exactly what the contract documents.
        let once = accumulate(&CareerStats::default(), &sample_performance());
        let twice = accumulate(&once, &sample_performance());
        assert_eq!(twice.runs, once.runs * 2);
        assert_eq!(twice.total_matches, 2);
        assert_eq!(twice.man_of_the_match, 2);
    }

    #[test]
    fn derived_rates_guard_zero_denominators() {
        let empty = CareerStats::default();
        assert_eq!(empty.batting_average(), None);
        assert_eq!(empty.strike_rate(), None);
        assert_eq!(empty.bowling_average(), None);
        assert_eq!(empty.economy(), None);

        let career = accumulate(&empty, &sample_performance());
        assert!((career.batting_average().unwrap() - 57.0).abs() < 1e-9);
        assert!((career.strike_rate().unwrap() - 142.5).abs() < 1e-9);
        assert!((career.bowling_average().unwrap() - 11.0).abs() < 1e-9);
        assert!((career.economy().unwrap() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn century_counts_once_not_as_half_century_too() {
        let mut perf = sample_performance();
        perf.batting = Some(BattingStats {
            runs: 104,
            balls: 70,
            fours: 12,
            sixes: 3,
            dismissal: Dismissal::NotOut,
        });
        let career = accumulate(&CareerStats::default(), &perf);
        assert_eq!(career.centuries, 1);
        assert_eq!(career.half_centuries, 0);
        assert_eq!(career.dismissals, 0);
        assert_eq!(career.highest_score, 104);
    }

    #[test]
    fn best_bowling_prefers_wickets_then_fewer_runs() {
        let base = BestBowling {
            wickets: 3,
            runs: 20,
        };
        assert!(base.beaten_by(BestBowling {
            wickets: 4,
            runs: 50
        }));
        assert!(base.beaten_by(BestBowling {
            wickets: 3,
            runs: 15
        }));
        assert!(!base.beaten_by(BestBowling {
            wickets: 3,
            runs: 20
        }));
        assert!(!base.beaten_by(BestBowling {
            wickets: 2,
            runs: 1
        }));
    }

    #[test]
    fn five_wicket_haul_counter() {
        let mut perf = sample_performance();
        perf.bowling = Some(BowlingStats {
            overs: Overs::from_decimal(4.0).unwrap(),
            runs_conceded: 18,
            wickets: 5,
            maidens: 0,
        });
        let career = accumulate(&CareerStats::default(), &perf);
        assert_eq!(career.five_wicket_hauls, 1);
        assert_eq!(
            career.best_bowling,
            BestBowling {
                wickets: 5,
                runs: 18
            }
        );
    }

    #[test]
    fn recompute_matches_sequential_accumulation() {
        let mut second = sample_performance();
        second.match_id = "m2".to_string();
        second.team_result = TeamResult::Lost;
        second.awards = AwardSet::new();

        let history = vec![sample_performance(), second];
        let rebuilt = recompute(&history);
        let sequential = history
            .iter()
            .fold(CareerStats::default(), |acc, p| accumulate(&acc, p));
        assert_eq!(rebuilt, sequential);
        assert_eq!(rebuilt.total_matches, 2);
        assert_eq!(rebuilt.matches_won, 1);
    }
}
