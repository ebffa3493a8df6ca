//! Per-match player performance records.
//!
//! One [`PlayerPerformance`] exists per player per match, keyed by
//! `(match_id, player_id)`. Records are append-only; the only mutation the
//! system ever performs on them is rewriting `player_id` during an identity
//! merge.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::overs::Overs;

/// Awards a player can pick up in a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Award {
    ManOfTheMatch,
    BestBatsman,
    BestBowler,
    BestFielder,
}

/// Award tags held inline; a player rarely collects more than a couple.
pub type AwardSet = SmallVec<[Award; 4]>;

/// How the player's team fared in the match this record belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TeamResult {
    Won,
    Lost,
    Tied,
    #[default]
    NoResult,
}

/// How a batter's innings ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dismissal {
    Bowled,
    Caught,
    Lbw,
    RunOut,
    Stumped,
    HitWicket,
    /// Innings ended without the batter being dismissed. Does not count
    /// toward the batting-average denominator.
    NotOut,
}

impl Dismissal {
    /// Whether this counts as a dismissal for averaging purposes.
    #[must_use]
    pub const fn is_out(self) -> bool {
        !matches!(self, Self::NotOut)
    }
}

/// Batting figures for one innings. Absent entirely if the player did not bat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattingStats {
    pub runs: u32,
    pub balls: u32,
    #[serde(default)]
    pub fours: u32,
    #[serde(default)]
    pub sixes: u32,
    pub dismissal: Dismissal,
}

impl BattingStats {
    /// Runs per hundred balls; `None` before the first ball is faced.
    #[must_use]
    pub fn strike_rate(&self) -> Option<f64> {
        if self.balls == 0 {
            return None;
        }
        Some(f64::from(self.runs) / f64::from(self.balls) * 100.0)
    }
}

/// Bowling figures for one match. Absent entirely if the player did not bowl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BowlingStats {
    pub overs: Overs,
    pub runs_conceded: u32,
    pub wickets: u32,
    #[serde(default)]
    pub maidens: u32,
}

impl BowlingStats {
    /// Runs conceded per over; `None` before the first ball is bowled.
    #[must_use]
    pub fn economy(&self) -> Option<f64> {
        let overs = self.overs.as_fraction();
        if overs <= 0.0 {
            return None;
        }
        Some(f64::from(self.runs_conceded) / overs)
    }
}

/// Fielding contributions; always present, zeroed when the player did nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldingStats {
    #[serde(default)]
    pub catches: u32,
    #[serde(default)]
    pub run_outs: u32,
    #[serde(default)]
    pub stumpings: u32,
}

/// One player's complete record for one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPerformance {
    pub match_id: String,
    pub player_id: String,
    pub team_id: String,
    pub opposition: String,
    #[serde(default)]
    pub venue: String,
    /// ISO-8601 date of the match.
    #[serde(default)]
    pub date: String,
    pub team_result: TeamResult,
    #[serde(default)]
    pub batting: Option<BattingStats>,
    #[serde(default)]
    pub bowling: Option<BowlingStats>,
    #[serde(default)]
    pub fielding: FieldingStats,
    #[serde(default)]
    pub awards: AwardSet,
}

impl PlayerPerformance {
    /// Idempotency key: at most one record may exist per match per player.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String) {
        (self.match_id.clone(), self.player_id.clone())
    }

    #[must_use]
    pub fn has_award(&self, award: Award) -> bool {
        self.awards.contains(&award)
    }
}
