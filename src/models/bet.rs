//! Bet model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use super::validation::{field_error, into_result};
use super::{BetId, BetterId, BetterRef, CompetitionId, CompetitorId};

/// One better's prediction for one competitor in one competition.
///
/// A better holds at most one bet per competitor and competition; placing
/// a second one updates the first.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Bet {
    #[serde(default)]
    pub id: BetId,

    #[serde(default)]
    pub better_id: BetterId,

    #[serde(default)]
    pub competition_id: CompetitionId,

    #[serde(default)]
    pub competitor_id: CompetitorId,

    /// Score within the competition's min/max range
    #[serde(default)]
    pub score: Option<i64>,

    /// Predicted final placing (1 = winner)
    #[serde(default)]
    #[validate(range(min = 1, message = "must be no less than 1"))]
    pub placing: Option<u32>,

    /// Free text comment
    #[serde(default)]
    pub note: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Bet {
    /// Create a new unsaved Bet without score, placing or note.
    pub fn new(
        better_id: BetterId,
        competition_id: CompetitionId,
        competitor_id: CompetitorId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: BetId::default(),
            better_id,
            competition_id,
            competitor_id,
            score: None,
            placing: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Builder method to set the score.
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = Some(score);
        self
    }

    /// Builder method to set the placing.
    pub fn with_placing(mut self, placing: u32) -> Self {
        self.placing = Some(placing);
        self
    }

    /// Builder method to set the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Check the references every bet needs before anything is looked up.
    pub fn validate_init(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for (field, unset) in [
            ("better_id", self.better_id.is_unset()),
            ("competition_id", self.competition_id.is_unset()),
            ("competitor_id", self.competitor_id.is_unset()),
        ] {
            if unset {
                errors.add(field, field_error("required", "cannot be blank"));
            }
        }

        into_result(errors)
    }

    /// Check score and placing against the competition's bounds.
    pub fn validate_for(&self, min_score: i64, max_score: i64) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if let Some(score) = self.score {
            if !(min_score..=max_score).contains(&score) {
                errors.add(
                    "score",
                    field_error(
                        "range",
                        format!("must be between {} and {}", min_score, max_score),
                    ),
                );
            }
        }

        into_result(errors)
    }
}

/// A bet with its better resolved, as consumed by the metrics engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionBet {
    pub id: BetId,
    pub better: BetterRef,
    pub competitor_id: CompetitorId,
    pub score: Option<i64>,
    pub placing: Option<u32>,
    pub note: Option<String>,
}

impl CompetitionBet {
    pub fn from_bet(bet: &Bet, better: BetterRef) -> Self {
        Self {
            id: bet.id,
            better,
            competitor_id: bet.competitor_id,
            score: bet.score,
            placing: bet.placing,
            note: bet.note.clone(),
        }
    }

    /// Score with absence treated as zero.
    pub fn score_or_zero(&self) -> i64 {
        self.score.unwrap_or(0)
    }

    /// Note with absence treated as the empty string.
    pub fn note_or_empty(&self) -> &str {
        self.note.as_deref().unwrap_or("")
    }
}

/// Messages pushed to websocket clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BetEvent {
    BetPlaced { bet: Bet },
    BetDeleted { bet_id: BetId, competition_id: CompetitionId },
    CompetitionLocked { competition_id: CompetitionId },
}
