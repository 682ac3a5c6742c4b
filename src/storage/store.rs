//! In-memory betting tables backed by JSONL files.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationErrors};

use super::{EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::calculate::compute_competition_metrics;
use crate::models::{
    Bet, BetId, Better, BetterId, BetterRef, Competition, CompetitionBet, CompetitionDetails,
    CompetitionId, CompetitionMetrics, CompetitionResult, Competitor, CompetitorId, EntityId,
    ValidationError,
};

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("bad request: {0}")]
    Invalid(#[from] ValidationError),

    #[error("{0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ValidationErrors> for StoreError {
    fn from(errors: ValidationErrors) -> Self {
        StoreError::Invalid(errors.into())
    }
}

/// Everything a better has created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatedObjects {
    pub competitions: Vec<Competition>,
    pub competitors: Vec<Competitor>,
    pub bets: Vec<Bet>,
}

/// All betting data, loaded once and persisted table by table.
///
/// Tables are keyed by ID so iteration follows creation order. Writes are
/// staged on a copy and only become visible once their files are written.
#[derive(Clone)]
pub struct BettingStore {
    storage: StorageConfig,
    default_max_score: i64,
    competitions: BTreeMap<CompetitionId, Competition>,
    competitors: BTreeMap<CompetitorId, Competitor>,
    betters: BTreeMap<BetterId, Better>,
    bets: BTreeMap<BetId, Bet>,
    results: Vec<CompetitionResult>,
}

fn by_id<T>(items: Vec<T>, id: impl Fn(&T) -> EntityId) -> BTreeMap<EntityId, T> {
    items.into_iter().map(|item| (id(&item), item)).collect()
}

fn next_id<T>(table: &BTreeMap<EntityId, T>) -> EntityId {
    table
        .keys()
        .next_back()
        .map(EntityId::next)
        .unwrap_or_else(|| EntityId::new(1))
}

impl BettingStore {
    /// Load all tables from the data directory. Missing files are empty tables.
    pub fn open(storage: StorageConfig, default_max_score: i64) -> Result<Self, StoreError> {
        let competitions = JsonlReader::<Competition>::for_entity(&storage, EntityType::Competition)
            .read_all()?;
        let competitors = JsonlReader::<Competitor>::for_entity(&storage, EntityType::Competitor)
            .read_all()?;
        let betters =
            JsonlReader::<Better>::for_entity(&storage, EntityType::Better).read_all()?;
        let bets = JsonlReader::<Bet>::for_entity(&storage, EntityType::Bet).read_all()?;
        let results = JsonlReader::<CompetitionResult>::for_entity(&storage, EntityType::Result)
            .read_all()?;

        info!(
            "Loaded {} competitions, {} competitors, {} betters, {} bets from {:?}",
            competitions.len(),
            competitors.len(),
            betters.len(),
            bets.len(),
            storage.data_dir
        );

        Ok(Self {
            storage,
            default_max_score,
            competitions: by_id(competitions, |c| c.id),
            competitors: by_id(competitors, |c| c.id),
            betters: by_id(betters, |b| b.id),
            bets: by_id(bets, |b| b.id),
            results,
        })
    }

    fn persist(&self, entity: EntityType) -> Result<(), StoreError> {
        let storage = &self.storage;
        let count = match entity {
            EntityType::Competition => JsonlWriter::<Competition>::for_entity(storage, entity)
                .write_all(self.competitions.values())?,
            EntityType::Competitor => JsonlWriter::<Competitor>::for_entity(storage, entity)
                .write_all(self.competitors.values())?,
            EntityType::Better => JsonlWriter::<Better>::for_entity(storage, entity)
                .write_all(self.betters.values())?,
            EntityType::Bet => {
                JsonlWriter::<Bet>::for_entity(storage, entity).write_all(self.bets.values())?
            }
            EntityType::Result => JsonlWriter::<CompetitionResult>::for_entity(storage, entity)
                .write_all(&self.results)?,
        };

        debug!("Persisted {} rows to {}", count, entity.filename());
        Ok(())
    }

    /// Apply `change` to a copy of the store, write the `touched` tables from
    /// the copy, then swap it in.
    ///
    /// If a write fails the store is left as it was, and tables already
    /// rewritten are restored from the current state.
    fn commit<R>(
        &mut self,
        touched: &[EntityType],
        change: impl FnOnce(&mut Self) -> Result<R, StoreError>,
    ) -> Result<R, StoreError> {
        let mut staged = self.clone();
        let out = change(&mut staged)?;

        for (written, entity) in touched.iter().enumerate() {
            if let Err(e) = staged.persist(*entity) {
                for done in &touched[..written] {
                    if let Err(restore) = self.persist(*done) {
                        warn!("Failed to restore {}: {}", done.filename(), restore);
                    }
                }
                return Err(e);
            }
        }

        *self = staged;
        Ok(out)
    }

    fn competition(&self, id: CompetitionId) -> Result<&Competition, StoreError> {
        self.competitions
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("competition {}", id)))
    }

    fn better_ref(&self, id: BetterId) -> BetterRef {
        match self.betters.get(&id) {
            Some(better) => better.to_ref(),
            None => {
                warn!("Bet references unknown better {}", id);
                BetterRef::new(id, String::new())
            }
        }
    }

    // ── Competitions ────────────────────────────────────────────

    /// Add a new competition. A max score of zero becomes the default max.
    pub fn add_competition(&mut self, competition: Competition) -> Result<Competition, StoreError> {
        let max_score = if competition.max_score == 0 {
            self.default_max_score
        } else {
            competition.max_score
        };

        let cleaned = Competition {
            id: next_id(&self.competitions),
            max_score,
            locked: false,
            competitor_ids: Vec::new(),
            created_at: Utc::now(),
            ..competition
        };
        cleaned.validate()?;

        let saved = cleaned.clone();
        self.commit(&[EntityType::Competition], |s| {
            s.competitions.insert(cleaned.id, cleaned);
            Ok(())
        })?;

        info!("Created competition {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    /// A competition with its competitors, bets and results resolved.
    pub fn get_competition(&self, id: CompetitionId) -> Result<CompetitionDetails, StoreError> {
        let competition = self.competition(id)?.clone();

        let competitors = competition
            .competitor_ids
            .iter()
            .filter_map(|cid| self.competitors.get(cid).cloned())
            .collect();

        let bets = self
            .bets
            .values()
            .filter(|b| b.competition_id == id)
            .map(|b| CompetitionBet::from_bet(b, self.better_ref(b.better_id)))
            .collect();

        let results = self
            .results
            .iter()
            .filter(|r| r.competition_id == id)
            .cloned()
            .collect();

        Ok(CompetitionDetails {
            competition,
            competitors,
            bets,
            results,
        })
    }

    pub fn list_competitions(&self) -> Vec<Competition> {
        self.competitions.values().cloned().collect()
    }

    /// Delete a competition without bets, along with its results.
    pub fn delete_competition(&mut self, id: CompetitionId) -> Result<(), StoreError> {
        self.competition(id)?;

        if self.bets.values().any(|b| b.competition_id == id) {
            return Err(StoreError::Conflict(format!(
                "competition {} still has bets",
                id
            )));
        }

        self.commit(&[EntityType::Competition, EntityType::Result], |s| {
            s.competitions.remove(&id);
            s.results.retain(|r| r.competition_id != id);
            Ok(())
        })?;

        info!("Deleted competition {}", id);
        Ok(())
    }

    // ── Competitors ─────────────────────────────────────────────

    /// Add a competitor, optionally taking part in a competition right away.
    pub fn add_competitor(
        &mut self,
        competitor: Competitor,
        bind_to: Option<CompetitionId>,
    ) -> Result<Competitor, StoreError> {
        competitor.validate()?;

        if let Some(competition_id) = bind_to {
            self.competition(competition_id).map_err(|_| {
                StoreError::NotFound(format!(
                    "competition {} to bind competitor to",
                    competition_id
                ))
            })?;
        }

        let cleaned = Competitor {
            id: next_id(&self.competitors),
            created_at: Utc::now(),
            ..competitor
        };

        let saved = cleaned.clone();
        self.commit(&[EntityType::Competitor, EntityType::Competition], |s| {
            let id = cleaned.id;
            s.competitors.insert(id, cleaned);
            if let Some(competition_id) = bind_to {
                s.bind_competitor(id, competition_id)?;
            }
            Ok(())
        })?;

        info!("Created competitor {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    /// Let an existing competitor take part in an existing competition.
    pub fn add_competitor_to_competition(
        &mut self,
        competitor_id: CompetitorId,
        competition_id: CompetitionId,
    ) -> Result<(), StoreError> {
        if competitor_id.is_unset() || competition_id.is_unset() {
            return Err(StoreError::BadRequest("invalid competitor".to_string()));
        }

        if self
            .competition(competition_id)
            .is_ok_and(|c| c.has_competitor(competitor_id))
        {
            return Ok(());
        }

        self.commit(&[EntityType::Competition], |s| {
            s.bind_competitor(competitor_id, competition_id)
        })?;

        debug!(
            "Competitor {} added to competition {}",
            competitor_id, competition_id
        );
        Ok(())
    }

    fn bind_competitor(
        &mut self,
        competitor_id: CompetitorId,
        competition_id: CompetitionId,
    ) -> Result<(), StoreError> {
        if !self.competitors.contains_key(&competitor_id) {
            return Err(StoreError::BadRequest(
                "invalid competitor/competition combination".to_string(),
            ));
        }

        let competition = self.competitions.get_mut(&competition_id).ok_or_else(|| {
            StoreError::BadRequest("invalid competitor/competition combination".to_string())
        })?;

        if !competition.has_competitor(competitor_id) {
            competition.competitor_ids.push(competitor_id);
        }
        Ok(())
    }

    pub fn get_competitor(&self, id: CompetitorId) -> Result<Competitor, StoreError> {
        self.competitors
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("competitor {}", id)))
    }

    pub fn list_competitors(&self) -> Vec<Competitor> {
        self.competitors.values().cloned().collect()
    }

    /// Delete a competitor nobody has bet on, removing it from competitions.
    pub fn delete_competitor(&mut self, id: CompetitorId) -> Result<(), StoreError> {
        self.get_competitor(id)?;

        if self.bets.values().any(|b| b.competitor_id == id) {
            return Err(StoreError::Conflict(format!(
                "competitor {} still has bets",
                id
            )));
        }

        self.commit(&[EntityType::Competitor, EntityType::Competition], |s| {
            s.competitors.remove(&id);
            for competition in s.competitions.values_mut() {
                competition.competitor_ids.retain(|cid| *cid != id);
            }
            Ok(())
        })?;

        info!("Deleted competitor {}", id);
        Ok(())
    }

    // ── Betters ─────────────────────────────────────────────────

    /// Register a better. Emails are unique, compared case-insensitively.
    pub fn add_better(&mut self, better: Better) -> Result<Better, StoreError> {
        better.validate()?;

        if self
            .betters
            .values()
            .any(|b| b.email.eq_ignore_ascii_case(&better.email))
        {
            return Err(StoreError::Conflict(
                "a user with that email already exist".to_string(),
            ));
        }

        let cleaned = Better {
            id: next_id(&self.betters),
            created_at: Utc::now(),
            ..better
        };

        let saved = cleaned.clone();
        self.commit(&[EntityType::Better], |s| {
            s.betters.insert(cleaned.id, cleaned);
            Ok(())
        })?;

        info!("Registered better {} ({})", saved.id, saved.name);
        Ok(saved)
    }

    pub fn get_better(&self, id: BetterId) -> Result<Better, StoreError> {
        self.betters
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("better {}", id)))
    }

    pub fn list_betters(&self) -> Vec<Better> {
        self.betters.values().cloned().collect()
    }

    /// Delete a better without bets.
    pub fn delete_better(&mut self, id: BetterId) -> Result<(), StoreError> {
        self.get_better(id)?;

        if self.bets.values().any(|b| b.better_id == id) {
            return Err(StoreError::Conflict(format!("better {} still has bets", id)));
        }

        self.commit(&[EntityType::Better], |s| {
            s.betters.remove(&id);
            Ok(())
        })?;

        info!("Deleted better {}", id);
        Ok(())
    }

    /// Competitions, competitors and bets created by a better.
    pub fn created_by_better(&self, id: BetterId) -> Result<CreatedObjects, StoreError> {
        self.get_better(id)?;

        Ok(CreatedObjects {
            competitions: self
                .competitions
                .values()
                .filter(|c| c.created_by == Some(id))
                .cloned()
                .collect(),
            competitors: self
                .competitors
                .values()
                .filter(|c| c.created_by == Some(id))
                .cloned()
                .collect(),
            bets: self
                .bets
                .values()
                .filter(|b| b.better_id == id)
                .cloned()
                .collect(),
        })
    }

    // ── Bets ────────────────────────────────────────────────────

    /// Place a bet, or update the better's existing bet on the same
    /// competitor in the same competition.
    pub fn add_bet(&mut self, bet: Bet) -> Result<Bet, StoreError> {
        bet.validate_init()?;

        let competition = self.competition(bet.competition_id).map_err(|_| {
            StoreError::NotFound(format!(
                "competition {} to add bet to",
                bet.competition_id
            ))
        })?;

        if competition.locked {
            return Err(StoreError::BadRequest(format!(
                "competition {} is locked",
                competition.id
            )));
        }

        bet.validate_for(competition.min_score, competition.max_score)?;

        if !competition.has_competitor(bet.competitor_id) {
            return Err(StoreError::BadRequest(
                "invalid competition/competitor combination".to_string(),
            ));
        }

        self.get_better(bet.better_id)?;

        let existing = self
            .bets
            .values()
            .find(|b| {
                b.better_id == bet.better_id
                    && b.competition_id == bet.competition_id
                    && b.competitor_id == bet.competitor_id
            });

        let now = Utc::now();
        let saved = match existing {
            Some(current) => Bet {
                score: bet.score,
                placing: bet.placing,
                note: bet.note,
                updated_at: now,
                ..current.clone()
            },
            None => Bet {
                id: next_id(&self.bets),
                created_at: now,
                updated_at: now,
                ..bet
            },
        };

        let row = saved.clone();
        self.commit(&[EntityType::Bet], |s| {
            s.bets.insert(row.id, row);
            Ok(())
        })?;

        info!(
            "Better {} bet on competitor {} in competition {}",
            saved.better_id, saved.competitor_id, saved.competition_id
        );
        Ok(saved)
    }

    pub fn get_bet(&self, id: BetId) -> Result<Bet, StoreError> {
        self.bets
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("bet {}", id)))
    }

    pub fn list_bets(&self) -> Vec<Bet> {
        self.bets.values().cloned().collect()
    }

    pub fn bets_for_competition(&self, id: CompetitionId) -> Result<Vec<Bet>, StoreError> {
        self.competition(id)?;

        Ok(self
            .bets
            .values()
            .filter(|b| b.competition_id == id)
            .cloned()
            .collect())
    }

    /// Delete a bet, returning it.
    pub fn delete_bet(&mut self, id: BetId) -> Result<Bet, StoreError> {
        let bet = self.get_bet(id)?;

        self.commit(&[EntityType::Bet], |s| {
            s.bets.remove(&id);
            Ok(())
        })?;

        info!("Deleted bet {}", id);
        Ok(bet)
    }

    // ── Results & metrics ───────────────────────────────────────

    /// Store the final result, lock the competition and return its metrics.
    ///
    /// Nothing is written unless every result row is valid.
    pub fn lock_competition(
        &mut self,
        id: CompetitionId,
        results: Vec<CompetitionResult>,
    ) -> Result<CompetitionMetrics, StoreError> {
        let competition = self.competition(id)?;

        if competition.locked {
            return Err(StoreError::BadRequest("competition already locked".to_string()));
        }

        let mut placings = HashSet::new();
        let mut placed = HashSet::new();

        for result in &results {
            if !competition.has_competitor(result.competitor_id) {
                return Err(StoreError::BadRequest(
                    "competitor does not compete in competition".to_string(),
                ));
            }

            if result.placing == 0 {
                return Err(StoreError::BadRequest(
                    "placing must be no less than 1".to_string(),
                ));
            }

            if !placings.insert(result.placing) {
                return Err(StoreError::BadRequest(
                    "only one competitor can be placed at each position".to_string(),
                ));
            }

            if !placed.insert(result.competitor_id) {
                return Err(StoreError::BadRequest(
                    "competitor can only be placed once".to_string(),
                ));
            }
        }

        self.commit(&[EntityType::Result, EntityType::Competition], |s| {
            s.results.extend(results.into_iter().map(|r| CompetitionResult {
                competition_id: id,
                ..r
            }));
            if let Some(competition) = s.competitions.get_mut(&id) {
                competition.locked = true;
            }
            Ok(())
        })?;

        info!("Locked competition {}", id);
        self.competition_metrics(id)
    }

    /// Compute metrics over every bet currently placed in a competition.
    pub fn competition_metrics(&self, id: CompetitionId) -> Result<CompetitionMetrics, StoreError> {
        let details = self.get_competition(id)?;
        let competition = &details.competition;

        debug!(
            "Computing metrics for competition {} over {} bets",
            id,
            details.bets.len()
        );

        Ok(compute_competition_metrics(
            competition.min_score,
            competition.max_score,
            &details.bets,
        ))
    }
}
