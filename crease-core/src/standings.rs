//! Team-level tournament standings.
//!
//! Two entry points share the same arithmetic: [`aggregate`] folds a list of
//! classifications into a fresh [`TeamSummary`] (history re-derivation), and
//! [`apply_to_team`] applies a single classification to a stored [`Team`]
//! record after each completed match.
//!
//! Win/loss record is authoritative the moment a result exists; rate-based
//! quantities need ball-level precision on both sides of the ledger, so net
//! run rate is withheld (`None`) rather than fabricated as `0.000` when a
//! team has only ever batted or only ever bowled.

use serde::{Deserialize, Serialize};

use crate::classify::{Classification, Outcome};
use crate::overs::BALLS_PER_OVER;

/// Standings points: 2 per win, 1 per draw, 0 otherwise.
pub const POINTS_PER_WIN: u32 = 2;
pub const POINTS_PER_DRAW: u32 = 1;

/// A team's stored cumulative record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub draws: u32,
    #[serde(default)]
    pub runs_scored: u64,
    #[serde(default)]
    pub runs_conceded: u64,
    #[serde(default)]
    pub wickets_taken: u32,
    #[serde(default)]
    pub wickets_lost: u32,
    #[serde(default)]
    pub balls_faced: u64,
    #[serde(default)]
    pub balls_bowled: u64,
    /// Optimistic-concurrency version, bumped on every stats write.
    #[serde(default)]
    pub version: u64,
}

impl Team {
    /// Derive the summary view of the stored counters.
    #[must_use]
    pub fn summary(&self) -> TeamSummary {
        TeamSummary::from_counters(
            self.wins,
            self.losses,
            self.draws,
            self.runs_scored,
            self.runs_conceded,
            self.wickets_taken,
            self.wickets_lost,
            self.balls_faced,
            self.balls_bowled,
        )
    }
}

/// Summary figures derived from a team's match history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    /// Countable matches only; skipped matches never dilute this.
    pub total_matches: u32,
    /// Percentage, 0.0 when no countable matches exist (never NaN).
    pub win_rate: f64,
    pub tournament_points: u32,
    pub runs_scored: u64,
    pub runs_conceded: u64,
    pub wickets_taken: u32,
    pub wickets_lost: u32,
    pub balls_faced: u64,
    pub balls_bowled: u64,
    /// `None` until the team has both faced and bowled at least one ball.
    pub net_run_rate: Option<f64>,
}

impl TeamSummary {
    #[allow(clippy::too_many_arguments)]
    fn from_counters(
        wins: u32,
        losses: u32,
        draws: u32,
        runs_scored: u64,
        runs_conceded: u64,
        wickets_taken: u32,
        wickets_lost: u32,
        balls_faced: u64,
        balls_bowled: u64,
    ) -> Self {
        let total_matches = wins.saturating_add(losses).saturating_add(draws);
        let win_rate = if total_matches == 0 {
            0.0
        } else {
            f64::from(wins) / f64::from(total_matches) * 100.0
        };
        let tournament_points = wins
            .saturating_mul(POINTS_PER_WIN)
            .saturating_add(draws.saturating_mul(POINTS_PER_DRAW));
        let net_run_rate =
            compute_net_run_rate(runs_scored, balls_faced, runs_conceded, balls_bowled);
        Self {
            wins,
            losses,
            draws,
            total_matches,
            win_rate,
            tournament_points,
            runs_scored,
            runs_conceded,
            wickets_taken,
            wickets_lost,
            balls_faced,
            balls_bowled,
            net_run_rate,
        }
    }

    /// Whether ball data was sufficient to produce a net run rate.
    #[must_use]
    pub const fn nrr_available(&self) -> bool {
        self.net_run_rate.is_some()
    }
}

/// `(runs scored per over) - (runs conceded per over)`, or `None` when
/// either ball total is zero.
#[must_use]
pub fn compute_net_run_rate(
    runs_scored: u64,
    balls_faced: u64,
    runs_conceded: u64,
    balls_bowled: u64,
) -> Option<f64> {
    if balls_faced == 0 || balls_bowled == 0 {
        return None;
    }
    let overs_faced = balls_faced as f64 / f64::from(BALLS_PER_OVER);
    let overs_bowled = balls_bowled as f64 / f64::from(BALLS_PER_OVER);
    Some(runs_scored as f64 / overs_faced - runs_conceded as f64 / overs_bowled)
}

/// Fold classified results into a fresh summary.
///
/// Skipped matches contribute to nothing: not the tallies, not the win
/// rate denominator, not the NRR inputs.
#[must_use]
pub fn aggregate(classifications: &[Classification]) -> TeamSummary {
    let mut team = Team::default();
    for c in classifications {
        apply_to_team(&mut team, c);
    }
    team.summary()
}

/// Apply one classified match to a stored team record.
///
/// No-op for [`Outcome::Skip`]; the version bump is the storage layer's
/// concern, not this function's.
pub fn apply_to_team(team: &mut Team, c: &Classification) {
    match c.outcome {
        Outcome::Win => team.wins = team.wins.saturating_add(1),
        Outcome::Loss => team.losses = team.losses.saturating_add(1),
        Outcome::Draw => team.draws = team.draws.saturating_add(1),
        Outcome::Skip => return,
    }
    team.runs_scored = team.runs_scored.saturating_add(u64::from(c.batting.runs));
    team.wickets_lost = team.wickets_lost.saturating_add(c.batting.wickets);
    team.balls_faced = team.balls_faced.saturating_add(u64::from(c.batting.balls));
    team.runs_conceded = team.runs_conceded.saturating_add(u64::from(c.bowling.runs));
    team.wickets_taken = team.wickets_taken.saturating_add(c.bowling.wickets);
    team.balls_bowled = team.balls_bowled.saturating_add(u64::from(c.bowling.balls));
}
