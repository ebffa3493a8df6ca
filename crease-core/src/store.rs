//! Storage boundary traits and an in-process reference implementation.
//!
//! The engine never talks to a database directly; persistence is owned by
//! out-of-scope collaborators reached through these plain CRUD contracts.
//! Two invariants the store is responsible for, not the caller:
//!
//! - the `(match_id, player_id)` performance key is unique, so a retried
//!   match finalization cannot double-count career stats;
//! - stats writes are conditional on a version field, so two concurrent
//!   accumulations cannot clobber each other's counters.
//!
//! [`MemoryStore`] implements every trait in-process and doubles as the
//! reference semantics for both invariants in the test suites.

use std::collections::{BTreeMap, HashMap, HashSet};

use thiserror::Error;

use crate::identity::UserDirectory;
use crate::merge::RewriteRepair;
use crate::performance::PlayerPerformance;
use crate::player::Player;
use crate::scorecard::MatchRecord;
use crate::standings::Team;

/// Errors raised at the storage boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },
    #[error("version conflict writing {kind} {id}: expected {expected}, found {found}")]
    VersionConflict {
        kind: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },
    #[error("performance already recorded for match {match_id}, player {player_id}")]
    DuplicatePerformance {
        match_id: String,
        player_id: String,
    },
    #[error("{collection} rewrite failed: {reason}")]
    RewriteFailed {
        collection: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Player persistence.
pub trait PlayerStore {
    /// Fetch a player by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    fn get_player(&self, id: &str) -> Result<Player, StoreError>;

    /// Snapshot of all players, used by the identity matcher.
    fn players(&self) -> Vec<Player>;

    /// Insert a new player record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn insert_player(&mut self, player: Player) -> Result<(), StoreError>;

    /// Write a player unconditionally, bumping its version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    fn update_player(&mut self, player: Player) -> Result<(), StoreError>;

    /// Conditional write: succeeds only when the stored version still equals
    /// `expected`, then bumps it. This is the §5 synchronization point for
    /// fetch-compute-write sequences.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] when another writer got there
    /// first, [`StoreError::NotFound`] if the id does not resolve.
    fn update_player_if_version(&mut self, player: Player, expected: u64)
    -> Result<(), StoreError>;

    /// Delete a player record (merge-source cleanup only; players with
    /// history are otherwise never hard-deleted).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    fn delete_player(&mut self, id: &str) -> Result<(), StoreError>;
}

/// Team persistence.
pub trait TeamStore {
    /// Fetch a team by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    fn get_team(&self, id: &str) -> Result<Team, StoreError>;

    /// Conditional stats write, mirroring [`PlayerStore::update_player_if_version`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] or [`StoreError::NotFound`].
    fn update_team_if_version(&mut self, team: Team, expected: u64) -> Result<(), StoreError>;

    /// Write a team unconditionally, bumping its version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not resolve.
    fn update_team(&mut self, team: Team) -> Result<(), StoreError>;

    /// Insert a new team record.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    fn insert_team(&mut self, team: Team) -> Result<(), StoreError>;
}

/// Performance persistence: append-only except for the merge rewrite path.
pub trait PerformanceStore {
    /// Record a performance, enforcing the `(match_id, player_id)` key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicatePerformance`] if a record already
    /// exists for the key.
    fn record_performance(&mut self, record: PlayerPerformance) -> Result<(), StoreError>;

    /// All performances referencing `player_id`.
    fn performances_for(&self, player_id: &str) -> Vec<PlayerPerformance>;

    /// Whether a record exists for the key.
    fn has_performance(&self, match_id: &str, player_id: &str) -> bool;

    /// Merge rewrite: repoint every record from `from` to `to`. Returns the
    /// number of records rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RewriteFailed`] if the collection could not be
    /// updated.
    fn rewrite_performance_refs(&mut self, from: &str, to: &str) -> Result<usize, StoreError>;
}

/// Match roster references (which players appeared for which team).
pub trait RosterStore {
    /// Merge rewrite counterpart of [`PerformanceStore::rewrite_performance_refs`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RewriteFailed`] if the collection could not be
    /// updated.
    fn rewrite_roster_refs(&mut self, from: &str, to: &str) -> Result<usize, StoreError>;
}

/// Read access to the external match store.
pub trait MatchGateway {
    /// Completed-match records involving `team_id`.
    fn matches_for_team(&self, team_id: &str) -> Vec<MatchRecord>;
}

/// Durable queue of pending reference rewrites from partially-failed merges.
pub trait RepairQueue {
    /// Persist a repair entry.
    fn enqueue_repair(&mut self, repair: RewriteRepair);

    /// Snapshot of pending entries.
    fn pending_repairs(&self) -> Vec<RewriteRepair>;

    /// Remove and return all pending entries for processing.
    fn take_repairs(&mut self) -> Vec<RewriteRepair>;
}

/// In-process store backing the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: HashMap<String, Player>,
    teams: HashMap<String, Team>,
    /// Keyed by `(match_id, player_id)`; the map key is the unique constraint.
    performances: BTreeMap<(String, String), PlayerPerformance>,
    /// `team_id -> player ids`.
    rosters: HashMap<String, Vec<String>>,
    matches: Vec<MatchRecord>,
    repairs: Vec<RewriteRepair>,
    registered_emails: HashSet<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a match record for [`MatchGateway`] reads.
    pub fn add_match(&mut self, record: MatchRecord) {
        self.matches.push(record);
    }

    /// Seed a roster entry.
    pub fn add_roster_entry(&mut self, team_id: &str, player_id: &str) {
        self.rosters
            .entry(team_id.to_string())
            .or_default()
            .push(player_id.to_string());
    }

    /// Roster snapshot for a team.
    #[must_use]
    pub fn roster(&self, team_id: &str) -> Vec<String> {
        self.rosters.get(team_id).cloned().unwrap_or_default()
    }

    /// Mark an email as belonging to a registered account.
    pub fn register_email(&mut self, email: &str) {
        self.registered_emails
            .insert(email.trim().to_ascii_lowercase());
    }
}

impl UserDirectory for MemoryStore {
    fn is_registered_email(&self, email: &str) -> bool {
        self.registered_emails.contains(email)
    }
}

impl PlayerStore for MemoryStore {
    fn get_player(&self, id: &str) -> Result<Player, StoreError> {
        self.players
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("player", id))
    }

    fn players(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    fn insert_player(&mut self, player: Player) -> Result<(), StoreError> {
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    fn update_player(&mut self, mut player: Player) -> Result<(), StoreError> {
        let current = self
            .players
            .get(&player.id)
            .ok_or_else(|| StoreError::not_found("player", &player.id))?;
        player.version = current.version.saturating_add(1);
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    fn update_player_if_version(
        &mut self,
        mut player: Player,
        expected: u64,
    ) -> Result<(), StoreError> {
        let current = self
            .players
            .get(&player.id)
            .ok_or_else(|| StoreError::not_found("player", &player.id))?;
        if current.version != expected {
            return Err(StoreError::VersionConflict {
                kind: "player",
                id: player.id,
                expected,
                found: current.version,
            });
        }
        player.version = expected.saturating_add(1);
        self.players.insert(player.id.clone(), player);
        Ok(())
    }

    fn delete_player(&mut self, id: &str) -> Result<(), StoreError> {
        self.players
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("player", id))
    }
}

impl TeamStore for MemoryStore {
    fn get_team(&self, id: &str) -> Result<Team, StoreError> {
        self.teams
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("team", id))
    }

    fn update_team_if_version(&mut self, mut team: Team, expected: u64) -> Result<(), StoreError> {
        let current = self
            .teams
            .get(&team.id)
            .ok_or_else(|| StoreError::not_found("team", &team.id))?;
        if current.version != expected {
            return Err(StoreError::VersionConflict {
                kind: "team",
                id: team.id,
                expected,
                found: current.version,
            });
        }
        team.version = expected.saturating_add(1);
        self.teams.insert(team.id.clone(), team);
        Ok(())
    }

    fn update_team(&mut self, mut team: Team) -> Result<(), StoreError> {
        let current = self
            .teams
            .get(&team.id)
            .ok_or_else(|| StoreError::not_found("team", &team.id))?;
        team.version = current.version.saturating_add(1);
        self.teams.insert(team.id.clone(), team);
        Ok(())
    }

    fn insert_team(&mut self, team: Team) -> Result<(), StoreError> {
        self.teams.insert(team.id.clone(), team);
        Ok(())
    }
}

impl PerformanceStore for MemoryStore {
    fn record_performance(&mut self, record: PlayerPerformance) -> Result<(), StoreError> {
        let key = record.dedup_key();
        if self.performances.contains_key(&key) {
            return Err(StoreError::DuplicatePerformance {
                match_id: key.0,
                player_id: key.1,
            });
        }
        self.performances.insert(key, record);
        Ok(())
    }

    fn performances_for(&self, player_id: &str) -> Vec<PlayerPerformance> {
        self.performances
            .values()
            .filter(|p| p.player_id == player_id)
            .cloned()
            .collect()
    }

    fn has_performance(&self, match_id: &str, player_id: &str) -> bool {
        self.performances
            .contains_key(&(match_id.to_string(), player_id.to_string()))
    }

    fn rewrite_performance_refs(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
        let keys: Vec<_> = self
            .performances
            .keys()
            .filter(|(_, player_id)| player_id == from)
            .cloned()
            .collect();
        let mut rewritten = 0;
        for key in keys {
            if let Some(mut record) = self.performances.remove(&key) {
                record.player_id = to.to_string();
                self.performances.insert(record.dedup_key(), record);
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }
}

impl RosterStore for MemoryStore {
    fn rewrite_roster_refs(&mut self, from: &str, to: &str) -> Result<usize, StoreError> {
        let mut rewritten = 0;
        for roster in self.rosters.values_mut() {
            for entry in roster.iter_mut() {
                if entry == from {
                    *entry = to.to_string();
                    rewritten += 1;
                }
            }
        }
        Ok(rewritten)
    }
}

impl MatchGateway for MemoryStore {
    fn matches_for_team(&self, team_id: &str) -> Vec<MatchRecord> {
        self.matches
            .iter()
            .filter(|m| m.involves(team_id))
            .cloned()
            .collect()
    }
}

impl RepairQueue for MemoryStore {
    fn enqueue_repair(&mut self, repair: RewriteRepair) {
        self.repairs.push(repair);
    }

    fn pending_repairs(&self) -> Vec<RewriteRepair> {
        self.repairs.clone()
    }

    fn take_repairs(&mut self) -> Vec<RewriteRepair> {
        std::mem::take(&mut self.repairs)
    }
}
