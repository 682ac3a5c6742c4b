//! Per-better grouping of a competition's bets.

use std::collections::HashMap;

use crate::models::{BetterId, BetterRef, CompetitionBet};

/// Running statistics for one better's bets in a competition.
#[derive(Debug, Clone, PartialEq)]
pub struct BetterAggregate {
    pub better: BetterRef,

    /// Scores in bet order, absent scores counted as zero
    pub scores: Vec<i64>,

    /// Longest note seen so far
    pub longest_note: String,

    /// Shortest note seen so far, seeded with the first bet's note
    pub shortest_note: String,
}

impl BetterAggregate {
    fn seed(bet: &CompetitionBet) -> Self {
        Self {
            better: bet.better.clone(),
            scores: Vec::new(),
            longest_note: String::new(),
            shortest_note: bet.note_or_empty().to_string(),
        }
    }

    fn push(&mut self, bet: &CompetitionBet) {
        self.scores.push(bet.score_or_zero());

        let note = bet.note_or_empty();
        let len = note_len(note);

        if len > note_len(&self.longest_note) {
            self.longest_note = note.to_string();
        }

        // An empty first note holds the shortest slot for good: nothing is
        // strictly shorter than an empty note.
        if len < note_len(&self.shortest_note) {
            self.shortest_note = note.to_string();
        }
    }

    /// Sum of all scores.
    pub fn total_score(&self) -> i64 {
        self.scores.iter().sum()
    }

    /// Number of scores equal to `max_score`.
    pub fn top_scores(&self, max_score: i64) -> u32 {
        count_equal(&self.scores, max_score)
    }

    /// Number of scores equal to `min_score`.
    pub fn bottom_scores(&self, min_score: i64) -> u32 {
        count_equal(&self.scores, min_score)
    }

    /// Average score, or 0.0 without any scores.
    pub fn average_score(&self) -> f64 {
        if self.scores.is_empty() {
            0.0
        } else {
            self.total_score() as f64 / self.scores.len() as f64
        }
    }
}

/// Note length in bytes of UTF-8.
pub(crate) fn note_len(note: &str) -> usize {
    note.len()
}

fn count_equal(scores: &[i64], target: i64) -> u32 {
    scores.iter().filter(|&&s| s == target).count() as u32
}

/// Group bets by better in a single pass.
///
/// Aggregates are returned in the order each better first appears in `bets`,
/// so record tie-breaks are reproducible.
pub fn aggregate_bets(bets: &[CompetitionBet]) -> Vec<BetterAggregate> {
    let mut index: HashMap<BetterId, usize> = HashMap::new();
    let mut aggregates: Vec<BetterAggregate> = Vec::new();

    for bet in bets {
        let slot = *index.entry(bet.better.id).or_insert_with(|| {
            aggregates.push(BetterAggregate::seed(bet));
            aggregates.len() - 1
        });

        aggregates[slot].push(bet);
    }

    aggregates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetId, CompetitorId};

    fn better(id: u64, name: &str) -> BetterRef {
        BetterRef::new(BetterId::new(id), name)
    }

    fn bet(who: &BetterRef, score: Option<i64>, note: Option<&str>) -> CompetitionBet {
        CompetitionBet {
            id: BetId::default(),
            better: who.clone(),
            competitor_id: CompetitorId::new(1),
            score,
            placing: None,
            note: note.map(str::to_string),
        }
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate_bets(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_groups_in_first_appearance_order() {
        let b = better(9, "Bravo");
        let a = better(2, "Alpha");

        let aggregates = aggregate_bets(&[
            bet(&b, Some(1), None),
            bet(&a, Some(2), None),
            bet(&b, Some(3), None),
        ]);

        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].better, b);
        assert_eq!(aggregates[0].scores, vec![1, 3]);
        assert_eq!(aggregates[1].better, a);
        assert_eq!(aggregates[1].scores, vec![2]);
    }

    #[test]
    fn test_absent_score_counts_as_zero() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[bet(&a, None, None), bet(&a, Some(6), None)]);

        assert_eq!(aggregates[0].scores, vec![0, 6]);
        assert_eq!(aggregates[0].average_score(), 3.0);
        assert_eq!(aggregates[0].bottom_scores(0), 1);
    }

    #[test]
    fn test_top_and_bottom_counts() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[
            bet(&a, Some(0), None),
            bet(&a, Some(10), None),
            bet(&a, Some(10), None),
        ]);

        assert_eq!(aggregates[0].total_score(), 20);
        assert_eq!(aggregates[0].top_scores(10), 2);
        assert_eq!(aggregates[0].bottom_scores(0), 1);
    }

    #[test]
    fn test_longest_note_strictly_longer_replaces() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[
            bet(&a, None, Some("abc")),
            bet(&a, None, Some("xyz")),
            bet(&a, None, Some("abcd")),
            bet(&a, None, None),
        ]);

        assert_eq!(aggregates[0].longest_note, "abcd");
    }

    #[test]
    fn test_shortest_note_strictly_shorter_replaces() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[
            bet(&a, None, Some("hello")),
            bet(&a, None, Some("hi")),
            bet(&a, None, Some("yo")),
        ]);

        assert_eq!(aggregates[0].shortest_note, "hi");
    }

    #[test]
    fn test_empty_first_note_keeps_shortest_slot() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[
            bet(&a, None, Some("")),
            bet(&a, None, Some("hello world")),
            bet(&a, None, Some("hi")),
        ]);

        assert_eq!(aggregates[0].shortest_note, "");
        assert_eq!(aggregates[0].longest_note, "hello world");
    }

    #[test]
    fn test_later_empty_note_replaces_shortest() {
        let a = better(1, "Alpha");
        let aggregates = aggregate_bets(&[bet(&a, None, Some("hi")), bet(&a, None, None)]);

        assert_eq!(aggregates[0].shortest_note, "");
    }

    #[test]
    fn test_note_length_counts_bytes() {
        assert_eq!(note_len("é"), 2);
        assert_eq!(note_len("😸😻"), 8);
        assert_eq!(note_len(""), 0);
    }

    #[test]
    fn test_average_without_scores_is_zero() {
        let aggregate = BetterAggregate {
            better: better(1, "Alpha"),
            scores: Vec::new(),
            longest_note: String::new(),
            shortest_note: String::new(),
        };

        assert_eq!(aggregate.average_score(), 0.0);
    }
}
