//! Match boundary schema.
//!
//! Matches are owned by an external collaborator and consumed read-only.
//! Upstream payloads are loosely typed (optional result blocks, decimal
//! overs as floats), so this module gives them a strict shape and validates
//! once at ingestion; the classifier and aggregator downstream assume
//! well-formed records.

use serde::{Deserialize, Serialize};

use crate::overs::{Overs, OversFormatError};

/// How a match's result is recorded upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultType {
    #[default]
    Completed,
    Tied,
    NoResult,
    Abandoned,
}

/// Structured result block; `winner_id` is only meaningful for completed
/// matches and may be absent even then.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    #[serde(default)]
    pub result_type: ResultType,
    #[serde(default)]
    pub winner_id: Option<String>,
}

/// One team's batting turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Innings {
    pub batting_team_id: String,
    #[serde(default)]
    pub total_runs: u32,
    #[serde(default)]
    pub total_wickets: u32,
    /// Decimal `overs.balls` wire form (e.g. `19.4`).
    #[serde(default)]
    pub total_overs: f64,
}

impl Innings {
    /// Parse the decimal overs field.
    ///
    /// # Errors
    ///
    /// Returns [`OversFormatError`] if the wire value is malformed.
    pub fn overs(&self) -> Result<Overs, OversFormatError> {
        Overs::from_decimal(self.total_overs)
    }
}

/// Innings grouped by the side that batted first and second. A multi-innings
/// format may carry more than one entry per array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    #[serde(default)]
    pub team1_innings: Vec<Innings>,
    #[serde(default)]
    pub team2_innings: Vec<Innings>,
}

impl Scorecard {
    /// Iterate every innings in the match, both arrays.
    pub fn all_innings(&self) -> impl Iterator<Item = &Innings> {
        self.team1_innings.iter().chain(self.team2_innings.iter())
    }
}

/// A match record as the external store hands it to us.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: String,
    pub team1_id: String,
    pub team2_id: String,
    #[serde(default)]
    pub scorecard: Scorecard,
    #[serde(default)]
    pub result_summary: ResultSummary,
}

impl MatchRecord {
    /// Parse a match record from upstream JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into the match schema.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate the record once at ingestion.
    ///
    /// Rejects the whole match rather than silently truncating a malformed
    /// innings; a bad overs value here would poison every run-rate derived
    /// from it.
    ///
    /// # Errors
    ///
    /// Returns the first [`OversFormatError`] found in any innings.
    pub fn validate(&self) -> Result<(), OversFormatError> {
        for innings in self.scorecard.all_innings() {
            innings.overs()?;
        }
        Ok(())
    }

    /// Whether `team_id` is one of the two sides.
    #[must_use]
    pub fn involves(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }
}
