//! Player identity and career aggregate.

use serde::{Deserialize, Serialize};

use crate::career::CareerStats;

/// A player record: identity fields plus the embedded career aggregate.
///
/// A player may exist unlinked (`user_id` absent) and without an email
/// (guest created on first match appearance). At most one player per user
/// account, enforced at merge/link time rather than by a store constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    /// Identity key for collision detection; compared case-insensitively.
    #[serde(default)]
    pub email: Option<String>,
    /// Linked user account, if the player has registered.
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub career: CareerStats,
    /// Optimistic-concurrency version, bumped on every write.
    #[serde(default)]
    pub version: u64,
}

impl Player {
    /// Email lowered for comparison, `None` when unset or blank.
    #[must_use]
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(str::to_ascii_lowercase)
    }

    /// Whether this player is linked to a registered user account.
    #[must_use]
    pub fn is_linked(&self) -> bool {
        self.user_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Candidate data for a new player submission, before an id exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCandidate {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub team_name: String,
}
