//! Competition metrics models.

use serde::{Deserialize, Serialize};

use super::BetterRef;

/// A record holder and the value that earned the record.
///
/// `who` is `None` until some better qualifies; `value` is then the type's
/// zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValue<T> {
    pub who: Option<BetterRef>,
    pub value: T,
}

impl<T> MetricValue<T> {
    pub fn new(who: BetterRef, value: T) -> Self {
        Self {
            who: Some(who),
            value,
        }
    }

    /// Whether no better holds this record yet.
    pub fn is_unset(&self) -> bool {
        self.who.is_none()
    }
}

/// Aggregated statistics over all bets in one competition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitionMetrics {
    /// Better with the highest average score
    pub highest_average_better: MetricValue<f64>,

    /// Better with the lowest average score
    pub lowest_average_better: MetricValue<f64>,

    /// Better who gave the max score most often
    pub most_top_scores: MetricValue<u32>,

    /// Better who gave the min score most often
    pub most_bottom_scores: MetricValue<u32>,

    /// Better with the longest note
    pub longest_note: MetricValue<String>,

    /// Better with the shortest non-empty note
    pub shortest_note: MetricValue<String>,

    /// Bets with the max score, across all betters
    pub number_of_top_scores: u32,

    /// Bets with the min score, across all betters
    pub number_of_bottom_scores: u32,

    /// Average score over every bet in the competition
    pub group_average_score: f64,
}
