//! Player identity merge.
//!
//! A merge folds a conflicting (source) identity into an existing (target)
//! player: contested fields are written per the caller's resolutions, every
//! foreign reference is repointed at the target, and the source record is
//! removed. The target's email is never overwritten - the pre-existing email
//! is definitionally the one that caused the collision - and the target's id
//! survives unchanged.
//!
//! The reference rewrite is a bounded sequence of independent per-collection
//! updates, not a transaction. Partial completion is tolerated: the
//! committed field merge is never rolled back, the failure is logged at warn
//! level, and a durable [`RewriteRepair`] entry is queued so a later pass
//! can finish the job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::career;
use crate::player::{Player, PlayerCandidate};
use crate::store::{PerformanceStore, PlayerStore, RepairQueue, RosterStore, StoreError};

/// Which side of a contested field wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldChoice {
    Existing,
    New,
}

/// Fields that can be contested between an existing player and a candidate.
/// Email is deliberately absent: it is the collision key and stays with the
/// target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContestedField {
    Name,
    TeamId,
    TeamName,
}

/// Per-field choices supplied by whoever resolved the conflict.
///
/// A contested field without a recorded choice keeps the existing value;
/// fields that are identical or both-empty are never written at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResolutions(HashMap<ContestedField, FieldChoice>);

impl FieldResolutions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: ContestedField, choice: FieldChoice) -> Self {
        self.0.insert(field, choice);
        self
    }

    #[must_use]
    pub fn choice_for(&self, field: ContestedField) -> FieldChoice {
        self.0.get(&field).copied().unwrap_or(FieldChoice::Existing)
    }
}

/// What happens to the target's career aggregate during a merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CareerMergePolicy {
    /// Keep the target's aggregate untouched. Correct for the common case
    /// where the source is a freshly-created, stats-free duplicate.
    #[default]
    KeepTarget,
    /// Recompute the target's aggregate from the merged performance history
    /// after the reference rewrite. Use when the source had real history.
    Combine,
}

/// Durable record of a rewrite that did not finish; drained by the repair
/// pass to guarantee eventual consistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRepair {
    pub source_id: String,
    pub target_id: String,
    /// Collections still holding references to `source_id`.
    pub pending: Vec<String>,
}

/// Fatal merge failures. A partial reference rewrite is not one of them;
/// it is reported through [`MergeReport::incomplete`].
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("merge target player {id} not found")]
    TargetNotFound { id: String },
    #[error("merge source player {id} not found")]
    SourceNotFound { id: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a full player-to-player merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub player: Player,
    pub rewritten_performances: usize,
    pub rewritten_roster_entries: usize,
    /// Collections whose rewrite failed; non-empty means a repair entry was
    /// queued.
    pub incomplete: Vec<String>,
}

impl MergeReport {
    /// Whether every dependent collection was rewritten.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

/// Contested fields between an existing player and a candidate: values that
/// differ and are non-empty on both sides. Feeds the conflict-resolution UI.
#[must_use]
pub fn contested_fields(existing: &Player, candidate: &PlayerCandidate) -> Vec<ContestedField> {
    let mut contested = Vec::new();
    if differs(&existing.name, &candidate.name) {
        contested.push(ContestedField::Name);
    }
    if differs(&existing.team_id, &candidate.team_id) {
        contested.push(ContestedField::TeamId);
    }
    if differs(&existing.team_name, &candidate.team_name) {
        contested.push(ContestedField::TeamName);
    }
    contested
}

fn differs(existing: &str, candidate: &str) -> bool {
    !existing.trim().is_empty() && !candidate.trim().is_empty() && existing != candidate
}

fn resolve_fields(target: &mut Player, source: &PlayerCandidate, resolutions: &FieldResolutions) {
    for field in contested_fields(target, source) {
        if resolutions.choice_for(field) == FieldChoice::New {
            match field {
                ContestedField::Name => target.name = source.name.clone(),
                ContestedField::TeamId => target.team_id = source.team_id.clone(),
                ContestedField::TeamName => target.team_name = source.team_name.clone(),
            }
        }
    }
}

/// Merge an unsaved candidate into an existing player.
///
/// This is the submission-collision path: the candidate was never created,
/// so there are no references to rewrite and nothing to delete. The target's
/// email, id and career aggregate are preserved.
///
/// # Errors
///
/// Returns [`MergeError::TargetNotFound`] if the target id does not resolve,
/// or a store error from the write.
pub fn merge_candidate<S>(
    store: &mut S,
    target_id: &str,
    candidate: &PlayerCandidate,
    resolutions: &FieldResolutions,
) -> Result<Player, MergeError>
where
    S: PlayerStore,
{
    let mut target = store
        .get_player(target_id)
        .map_err(|_| MergeError::TargetNotFound {
            id: target_id.to_string(),
        })?;
    resolve_fields(&mut target, candidate, resolutions);
    store.update_player(target.clone())?;
    store.get_player(target_id).map_err(MergeError::from)
}

/// Merge a stored source player into a stored target player.
///
/// Field resolution commits first; the reference rewrite then runs per
/// collection, tolerating partial failure (see module docs). The source
/// record is deleted even when the rewrite is incomplete - stale references
/// are recoverable via the repair queue, a lost conflict resolution is not.
///
/// # Errors
///
/// Returns [`MergeError::TargetNotFound`] / [`MergeError::SourceNotFound`]
/// when the ids do not resolve, or a store error from the field-merge write.
pub fn merge_players<S>(
    store: &mut S,
    target_id: &str,
    source_id: &str,
    resolutions: &FieldResolutions,
    policy: CareerMergePolicy,
) -> Result<MergeReport, MergeError>
where
    S: PlayerStore + PerformanceStore + RosterStore + RepairQueue,
{
    let mut target = store
        .get_player(target_id)
        .map_err(|_| MergeError::TargetNotFound {
            id: target_id.to_string(),
        })?;
    let source = store
        .get_player(source_id)
        .map_err(|_| MergeError::SourceNotFound {
            id: source_id.to_string(),
        })?;

    let source_as_candidate = PlayerCandidate {
        name: source.name.clone(),
        email: source.email.clone(),
        team_id: source.team_id.clone(),
        team_name: source.team_name.clone(),
    };
    resolve_fields(&mut target, &source_as_candidate, resolutions);
    store.update_player(target)?;

    let mut incomplete = Vec::new();
    let rewritten_performances = match store.rewrite_performance_refs(source_id, target_id) {
        Ok(count) => count,
        Err(err) => {
            log::warn!("performance rewrite {source_id} -> {target_id} incomplete: {err}");
            incomplete.push("performances".to_string());
            0
        }
    };
    let rewritten_roster_entries = match store.rewrite_roster_refs(source_id, target_id) {
        Ok(count) => count,
        Err(err) => {
            log::warn!("roster rewrite {source_id} -> {target_id} incomplete: {err}");
            incomplete.push("rosters".to_string());
            0
        }
    };

    if let Err(err) = store.delete_player(source_id) {
        log::warn!("merge source {source_id} could not be deleted: {err}");
        incomplete.push("players".to_string());
    }

    if !incomplete.is_empty() {
        store.enqueue_repair(RewriteRepair {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            pending: incomplete.clone(),
        });
    }

    if policy == CareerMergePolicy::Combine {
        let history = store.performances_for(target_id);
        let mut combined = store.get_player(target_id)?;
        combined.career = career::recompute(&history);
        store.update_player(combined)?;
    }

    let player = store.get_player(target_id)?;
    Ok(MergeReport {
        player,
        rewritten_performances,
        rewritten_roster_entries,
        incomplete,
    })
}

/// Re-run the rewrites recorded in a repair entry. Returns the entry again
/// if any collection still cannot be updated.
pub fn run_repair<S>(store: &mut S, repair: &RewriteRepair) -> Option<RewriteRepair>
where
    S: PlayerStore + PerformanceStore + RosterStore,
{
    let mut still_pending = Vec::new();
    for collection in &repair.pending {
        let outcome = match collection.as_str() {
            "performances" => store
                .rewrite_performance_refs(&repair.source_id, &repair.target_id)
                .map(|_| ()),
            "rosters" => store
                .rewrite_roster_refs(&repair.source_id, &repair.target_id)
                .map(|_| ()),
            "players" => store.delete_player(&repair.source_id).or_else(|err| {
                // Already gone is the goal state.
                if matches!(err, StoreError::NotFound { .. }) {
                    Ok(())
                } else {
                    Err(err)
                }
            }),
            _ => Ok(()),
        };
        if let Err(err) = outcome {
            log::warn!(
                "repair of {collection} for {} -> {} still failing: {err}",
                repair.source_id,
                repair.target_id
            );
            still_pending.push(collection.clone());
        }
    }
    if still_pending.is_empty() {
        None
    } else {
        Some(RewriteRepair {
            source_id: repair.source_id.clone(),
            target_id: repair.target_id.clone(),
            pending: still_pending,
        })
    }
}
