//! Crease League Engine
//!
//! Platform-agnostic core logic for the Crease league manager: player
//! identity resolution (email-collision detection and merging) and
//! statistics aggregation (career rollups, team standings, net run rate).
//! This crate owns no wire format or UI; HTTP handlers and persistence
//! adapters consume it through the storage traits in [`store`].

pub mod career;
pub mod classify;
pub mod identity;
pub mod merge;
pub mod overs;
pub mod performance;
pub mod player;
pub mod scorecard;
pub mod standings;
pub mod store;

// Re-export commonly used types
pub use career::{BestBowling, CareerStats, accumulate, recompute};
pub use classify::{Classification, InningsTotals, Outcome, classify};
pub use identity::{EmailConflict, IdentityMatch, UserDirectory, match_email};
pub use merge::{
    CareerMergePolicy, ContestedField, FieldChoice, FieldResolutions, MergeError, MergeReport,
    RewriteRepair, contested_fields, merge_candidate, merge_players, run_repair,
};
pub use overs::{BALLS_PER_OVER, Overs, OversFormatError, balls_to_overs, overs_to_balls};
pub use performance::{
    Award, AwardSet, BattingStats, BowlingStats, Dismissal, FieldingStats, PlayerPerformance,
    TeamResult,
};
pub use player::{Player, PlayerCandidate};
pub use scorecard::{Innings, MatchRecord, ResultSummary, ResultType, Scorecard};
pub use standings::{Team, TeamSummary, aggregate, apply_to_team, compute_net_run_rate};
pub use store::{
    MatchGateway, MemoryStore, PerformanceStore, PlayerStore, RepairQueue, RosterStore,
    StoreError, TeamStore,
};

use thiserror::Error;

/// Bounded attempts for the optimistic fetch-compute-write loop. The store
/// is the only synchronization point; a conflict means another request won
/// the race and we recompute from its result.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Errors raised by the match-finalization workflows.
#[derive(Debug, Error)]
pub enum FinalizeError {
    /// The `(match_id, player_id)` key already exists: a retried
    /// finalization that must not double-count.
    #[error("performance already recorded for match {match_id}, player {player_id}")]
    AlreadyRecorded {
        match_id: String,
        player_id: String,
    },
    #[error(transparent)]
    InvalidOvers(#[from] OversFormatError),
    #[error("gave up after {attempts} contended write attempts for {kind} {id}")]
    Contention {
        kind: &'static str,
        id: String,
        attempts: u32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a new-player submission.
///
/// The client-observable state machine: `Submitted -> Created` when no
/// collision exists, otherwise `Submitted -> Collision`, resolved by the
/// caller into either `Merged` or a fresh submission with a changed email.
/// There is no path on which a record silently overwrites another.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Player),
    Collision(EmailConflict),
    Merged(Player),
}

/// How the caller resolved a surfaced collision.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    MergeIntoExisting(FieldResolutions),
    ChangeEmail { new_email: String },
}

/// Engine facade over the storage boundary and the user directory.
///
/// All operations are request-scoped synchronous computations; concurrent
/// requests are serialized through the store's conditional writes.
pub struct LeagueEngine<S, D>
where
    D: UserDirectory,
{
    store: S,
    directory: D,
}

impl<S, D> LeagueEngine<S, D>
where
    D: UserDirectory,
{
    /// Create an engine over the provided store and user directory.
    pub const fn new(store: S, directory: D) -> Self {
        Self { store, directory }
    }

    /// Borrow the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrow the underlying store (seeding, inspection).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

impl<S, D> LeagueEngine<S, D>
where
    S: PlayerStore,
    D: UserDirectory,
{
    /// Submit a new player, surfacing an email collision instead of
    /// creating a duplicate identity.
    ///
    /// # Errors
    ///
    /// Returns a store error if the created record cannot be written.
    pub fn submit_player(
        &mut self,
        id: &str,
        candidate: PlayerCandidate,
    ) -> Result<SubmitOutcome, StoreError> {
        let players = self.store.players();
        let matched = match_email(candidate.email.as_deref(), &players, &self.directory);
        if matched.collision {
            let existing = matched.existing.unwrap_or_default();
            log::debug!(
                "submission for {} collides with player {}",
                candidate.name,
                existing.id
            );
            return Ok(SubmitOutcome::Collision(EmailConflict {
                existing,
                candidate,
                is_registered_user: matched.is_registered_user,
                is_linked: matched.is_linked,
            }));
        }

        let player = Player {
            id: id.to_string(),
            name: candidate.name,
            email: candidate.email,
            user_id: None,
            team_id: candidate.team_id,
            team_name: candidate.team_name,
            career: CareerStats::default(),
            version: 0,
        };
        self.store.insert_player(player.clone())?;
        Ok(SubmitOutcome::Created(player))
    }

    /// Resolve a surfaced collision per the caller's decision.
    ///
    /// `ChangeEmail` loops back to a fresh submission (which may collide
    /// again); `MergeIntoExisting` folds the candidate into the target.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError`] from the merge path, or a wrapped store error
    /// from resubmission.
    pub fn resolve_collision(
        &mut self,
        id: &str,
        conflict: EmailConflict,
        decision: MergeDecision,
    ) -> Result<SubmitOutcome, MergeError> {
        match decision {
            MergeDecision::MergeIntoExisting(resolutions) => {
                let merged = merge_candidate(
                    &mut self.store,
                    &conflict.existing.id,
                    &conflict.candidate,
                    &resolutions,
                )?;
                Ok(SubmitOutcome::Merged(merged))
            }
            MergeDecision::ChangeEmail { new_email } => {
                let mut candidate = conflict.candidate;
                candidate.email = Some(new_email);
                self.submit_player(id, candidate).map_err(MergeError::from)
            }
        }
    }
}

impl<S, D> LeagueEngine<S, D>
where
    S: PlayerStore + PerformanceStore,
    D: UserDirectory,
{
    /// Record one player's match performance and fold it into their career.
    ///
    /// The `(match_id, player_id)` key is reserved at the storage boundary
    /// first, so a retried finalization fails fast with `AlreadyRecorded`
    /// before any counter moves. The career write runs an optimistic
    /// fetch-compute-write loop against the player's version field.
    ///
    /// A performance for an unknown player id creates a guest player record
    /// on first appearance.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::AlreadyRecorded`] on a duplicate key,
    /// [`FinalizeError::Contention`] when the conditional write loses the
    /// race too many times, or a wrapped store error.
    pub fn finalize_player_match(
        &mut self,
        performance: PlayerPerformance,
    ) -> Result<CareerStats, FinalizeError> {
        let player_id = performance.player_id.clone();
        self.store
            .record_performance(performance.clone())
            .map_err(|err| match err {
                StoreError::DuplicatePerformance {
                    match_id,
                    player_id,
                } => {
                    log::debug!(
                        "duplicate finalization for match {match_id}, player {player_id} rejected"
                    );
                    FinalizeError::AlreadyRecorded {
                        match_id,
                        player_id,
                    }
                }
                other => FinalizeError::Store(other),
            })?;

        if let Err(StoreError::NotFound { .. }) = self.store.get_player(&player_id) {
            log::debug!("creating guest player {player_id} on first match appearance");
            self.store.insert_player(Player {
                id: player_id.clone(),
                name: player_id.clone(),
                email: None,
                user_id: None,
                team_id: performance.team_id.clone(),
                team_name: String::new(),
                career: CareerStats::default(),
                version: 0,
            })?;
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.store.get_player(&player_id)?;
            let mut next = current.clone();
            next.career = accumulate(&current.career, &performance);
            match self.store.update_player_if_version(next, current.version) {
                Ok(()) => return Ok(self.store.get_player(&player_id)?.career),
                Err(StoreError::VersionConflict { .. }) => {}
                Err(other) => return Err(FinalizeError::Store(other)),
            }
        }
        Err(FinalizeError::Contention {
            kind: "player",
            id: player_id,
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }
}

impl<S, D> LeagueEngine<S, D>
where
    S: TeamStore + MatchGateway,
    D: UserDirectory,
{
    /// Classify a finalized match for one team and apply it to the stored
    /// team record. Skipped outcomes leave the record untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::InvalidOvers`] for a malformed scorecard
    /// (the whole match is rejected rather than truncated), contention or
    /// store errors from the write.
    pub fn finalize_team_match(
        &mut self,
        record: &MatchRecord,
        team_id: &str,
    ) -> Result<Option<Classification>, FinalizeError> {
        record.validate()?;
        let Some(classification) = classify(record, team_id)? else {
            return Ok(None);
        };
        if classification.outcome == Outcome::Skip {
            log::debug!(
                "match {} skipped for team {team_id}: no definitive result",
                record.id
            );
            return Ok(Some(classification));
        }

        for _ in 0..MAX_WRITE_ATTEMPTS {
            let current = self.store.get_team(team_id)?;
            let mut next = current.clone();
            apply_to_team(&mut next, &classification);
            match self.store.update_team_if_version(next, current.version) {
                Ok(()) => return Ok(Some(classification)),
                Err(StoreError::VersionConflict { .. }) => {}
                Err(other) => return Err(FinalizeError::Store(other)),
            }
        }
        Err(FinalizeError::Contention {
            kind: "team",
            id: team_id.to_string(),
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }

    /// Summary view of a team's stored counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the team id does not resolve.
    pub fn team_summary(&self, team_id: &str) -> Result<TeamSummary, StoreError> {
        Ok(self.store.get_team(team_id)?.summary())
    }

    /// Re-derive a team's counters from its full completed-match history,
    /// replaying the classifier over every record the match store returns.
    ///
    /// # Errors
    ///
    /// Returns [`FinalizeError::InvalidOvers`] for a malformed historical
    /// record, or wrapped store errors.
    pub fn rebuild_team(&mut self, team_id: &str) -> Result<TeamSummary, FinalizeError> {
        let mut classifications = Vec::new();
        for record in self.store.matches_for_team(team_id) {
            record.validate()?;
            if let Some(c) = classify(&record, team_id)? {
                classifications.push(c);
            }
        }

        let stored = self.store.get_team(team_id)?;
        let mut rebuilt = Team {
            id: stored.id.clone(),
            name: stored.name.clone(),
            sport: stored.sport.clone(),
            ..Team::default()
        };
        for c in &classifications {
            apply_to_team(&mut rebuilt, c);
        }
        let summary = rebuilt.summary();
        self.store.update_team(rebuilt)?;
        Ok(summary)
    }
}

impl<S, D> LeagueEngine<S, D>
where
    S: PlayerStore + PerformanceStore + RosterStore + RepairQueue,
    D: UserDirectory,
{
    /// Merge a stored duplicate player into the target identity.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError`] when either id does not resolve or the field
    /// merge cannot be written. A partial reference rewrite is not an
    /// error; see [`MergeReport::incomplete`].
    pub fn merge_into_existing(
        &mut self,
        target_id: &str,
        source_id: &str,
        resolutions: &FieldResolutions,
        policy: CareerMergePolicy,
    ) -> Result<MergeReport, MergeError> {
        merge_players(&mut self.store, target_id, source_id, resolutions, policy)
    }

    /// Drain the repair queue, re-running pending reference rewrites.
    /// Entries that still fail are re-queued. Returns the number of entries
    /// fully repaired.
    pub fn repair_pending_rewrites(&mut self) -> usize {
        let pending = self.store.take_repairs();
        let mut repaired = 0;
        for entry in pending {
            match run_repair(&mut self.store, &entry) {
                None => repaired += 1,
                Some(still_pending) => self.store.enqueue_repair(still_pending),
            }
        }
        repaired
    }
}
