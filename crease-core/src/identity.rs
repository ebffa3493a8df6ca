//! Email-collision detection for new player submissions.
//!
//! Matching is exact and case-insensitive, never fuzzy: a false merge is far
//! worse than a duplicate the operator resolves by hand. The matcher is
//! read-only and returns everything the caller needs to choose between
//! "block creation, offer merge" and "allow creation".

use serde::{Deserialize, Serialize};

use crate::player::{Player, PlayerCandidate};

/// Read-only view of the registered-account directory, owned by the
/// out-of-scope authentication collaborator.
pub trait UserDirectory {
    /// Whether `email` (already normalized) belongs to a registered account.
    fn is_registered_email(&self, email: &str) -> bool;
}

/// Result of checking a candidate email against existing players.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityMatch {
    pub collision: bool,
    /// Snapshot of the colliding player, present when `collision` is true.
    pub existing: Option<Player>,
    /// Whether the email belongs to a registered user account.
    pub is_registered_user: bool,
    /// Whether the colliding player is already linked to an account.
    pub is_linked: bool,
}

/// Conflict payload surfaced to the caller instead of a hard rejection, so
/// a resolution UI or automated policy can decide what happens next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConflict {
    pub existing: Player,
    pub candidate: PlayerCandidate,
    pub is_registered_user: bool,
    pub is_linked: bool,
}

/// Check whether `candidate_email` collides with an existing player.
///
/// A candidate without an email can never collide. Comparison happens on
/// the normalized (trimmed, lowercased) form of both sides.
pub fn match_email<'a, D, I>(
    candidate_email: Option<&str>,
    players: I,
    directory: &D,
) -> IdentityMatch
where
    D: UserDirectory + ?Sized,
    I: IntoIterator<Item = &'a Player>,
{
    let Some(needle) = normalize(candidate_email) else {
        return IdentityMatch::default();
    };

    let existing = players
        .into_iter()
        .find(|p| p.normalized_email().as_deref() == Some(needle.as_str()));

    match existing {
        Some(player) => IdentityMatch {
            collision: true,
            is_registered_user: directory.is_registered_email(&needle),
            is_linked: player.is_linked(),
            existing: Some(player.clone()),
        },
        None => IdentityMatch {
            collision: false,
            existing: None,
            is_registered_user: directory.is_registered_email(&needle),
            is_linked: false,
        },
    }
}

fn normalize(email: Option<&str>) -> Option<String> {
    email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_ascii_lowercase)
}
