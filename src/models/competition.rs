//! Competition and competitor models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::field_error;
use super::{BetterId, CompetitionBet, CompetitionId, CompetitorId};

/// Max score used when a competition is created without one.
pub const DEFAULT_MAX_SCORE: i64 = 10;

/// An event that competitors compete in and betters bet on,
/// e.g. Eurovision Song Contest 2020.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_score_range"))]
pub struct Competition {
    /// Assigned by the store
    #[serde(default)]
    pub id: CompetitionId,

    /// Better that created the competition
    #[serde(default)]
    pub created_by: Option<BetterId>,

    #[validate(length(min = 1, message = "cannot be blank"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// Lowest score a bet may give (a "bottom score")
    #[serde(default)]
    pub min_score: i64,

    /// Highest score a bet may give (a "top score")
    #[serde(default)]
    pub max_score: i64,

    /// Set once the final result is in; no bets are accepted after that
    #[serde(default)]
    pub locked: bool,

    /// Competitors taking part, in the order they were added
    #[serde(default)]
    pub competitor_ids: Vec<CompetitorId>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Competition {
    /// Create a new unsaved Competition with the default score range.
    pub fn new(name: String) -> Self {
        Self {
            id: CompetitionId::default(),
            created_by: None,
            name,
            description: None,
            image: None,
            min_score: 0,
            max_score: DEFAULT_MAX_SCORE,
            locked: false,
            competitor_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    /// Builder method to set the score range.
    pub fn with_score_range(mut self, min_score: i64, max_score: i64) -> Self {
        self.min_score = min_score;
        self.max_score = max_score;
        self
    }

    /// Whether the competitor takes part in this competition.
    pub fn has_competitor(&self, competitor_id: CompetitorId) -> bool {
        self.competitor_ids.contains(&competitor_id)
    }
}

fn validate_score_range(competition: &Competition) -> Result<(), validator::ValidationError> {
    if competition.min_score > competition.max_score {
        return Err(field_error(
            "min_score",
            "must not be greater than max_score",
        ));
    }
    Ok(())
}

/// A team or player competing in zero or more competitions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Competitor {
    #[serde(default)]
    pub id: CompetitorId,

    #[serde(default)]
    pub created_by: Option<BetterId>,

    #[validate(length(min = 1, message = "cannot be blank"))]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Competitor {
    /// Create a new unsaved Competitor.
    pub fn new(name: String) -> Self {
        Self {
            id: CompetitorId::default(),
            created_by: None,
            name,
            description: None,
            image: None,
            created_at: Utc::now(),
        }
    }
}

/// Final placing of one competitor, submitted when a competition is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitionResult {
    #[serde(default)]
    pub competition_id: CompetitionId,
    pub competitor_id: CompetitorId,
    pub placing: u32,
}

/// A competition with its competitors and bets resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionDetails {
    #[serde(flatten)]
    pub competition: Competition,
    pub competitors: Vec<Competitor>,
    pub bets: Vec<CompetitionBet>,
    pub results: Vec<CompetitionResult>,
}
