//! Competition metrics engine.
//!
//! Computes record holders and group totals from a competition's bets:
//! - Highest and lowest average score per better
//! - Most top scores and most bottom scores
//! - Longest and shortest note
//! - Group-wide top/bottom score counts and average score
//!
//! Pure functions over an in-memory bet list; callers load the bets.

mod aggregate;
mod selector;

pub use aggregate::{aggregate_bets, BetterAggregate};
pub use selector::{should_update_metric, Comparison, MetricCandidate};

use crate::models::{BetterRef, CompetitionBet, CompetitionMetrics, MetricValue};

/// Replace `record` when `candidate` takes it.
fn update_record<T: MetricCandidate>(
    record: &mut MetricValue<T>,
    candidate: T,
    comparison: Comparison,
    who: &BetterRef,
) {
    if let Some(mv) = should_update_metric(candidate, comparison, record, who) {
        *record = mv;
    }
}

/// Calculate the group average, or 0.0 for a competition without bets.
pub fn calculate_group_average(total_score: i64, total_bets: usize) -> f64 {
    if total_bets == 0 {
        0.0
    } else {
        total_score as f64 / total_bets as f64
    }
}

/// Compute all metrics for one competition.
///
/// `min_score` and `max_score` classify bottom and top scores. Betters are
/// visited in order of first appearance in `bets`; on ties the earlier
/// better keeps the record.
pub fn compute_competition_metrics(
    min_score: i64,
    max_score: i64,
    bets: &[CompetitionBet],
) -> CompetitionMetrics {
    let mut cm = CompetitionMetrics::default();
    let mut total_score = 0_i64;
    let mut total_bets = 0_usize;

    for agg in aggregate_bets(bets) {
        let top_scores = agg.top_scores(max_score);
        let bottom_scores = agg.bottom_scores(min_score);
        let average_score = agg.average_score();

        total_bets += agg.scores.len();
        total_score += agg.total_score();
        cm.number_of_top_scores += top_scores;
        cm.number_of_bottom_scores += bottom_scores;

        let who = &agg.better;
        update_record(&mut cm.highest_average_better, average_score, Comparison::GreaterWins, who);
        update_record(&mut cm.lowest_average_better, average_score, Comparison::LesserWins, who);
        update_record(&mut cm.most_top_scores, top_scores, Comparison::GreaterWins, who);
        update_record(&mut cm.most_bottom_scores, bottom_scores, Comparison::GreaterWins, who);
        update_record(&mut cm.longest_note, agg.longest_note.clone(), Comparison::GreaterWins, who);
        update_record(&mut cm.shortest_note, agg.shortest_note.clone(), Comparison::LesserWins, who);
    }

    cm.group_average_score = calculate_group_average(total_score, total_bets);
    cm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BetId, BetterId, CompetitorId};
    use pretty_assertions::assert_eq;

    fn better(id: u64, name: &str) -> BetterRef {
        BetterRef::new(BetterId::new(id), name)
    }

    fn scored(who: &BetterRef, score: i64) -> CompetitionBet {
        CompetitionBet {
            id: BetId::default(),
            better: who.clone(),
            competitor_id: CompetitorId::new(1),
            score: Some(score),
            placing: None,
            note: None,
        }
    }

    fn noted(who: &BetterRef, note: &str) -> CompetitionBet {
        CompetitionBet {
            note: Some(note.to_string()),
            ..scored(who, 5)
        }
    }

    #[test]
    fn test_calculate_group_average() {
        assert_eq!(calculate_group_average(35, 6), 35.0 / 6.0);
        assert_eq!(calculate_group_average(0, 0), 0.0);
    }

    #[test]
    fn test_empty_competition() {
        let cm = compute_competition_metrics(0, 10, &[]);

        assert!(cm.highest_average_better.is_unset());
        assert!(cm.lowest_average_better.is_unset());
        assert!(cm.most_top_scores.is_unset());
        assert!(cm.most_bottom_scores.is_unset());
        assert!(cm.longest_note.is_unset());
        assert!(cm.shortest_note.is_unset());
        assert_eq!(cm.number_of_top_scores, 0);
        assert_eq!(cm.number_of_bottom_scores, 0);
        assert_eq!(cm.group_average_score, 0.0);
        assert!(!cm.group_average_score.is_nan());
    }

    #[test]
    fn test_single_better_single_bet() {
        let a = better(1, "Alpha");
        let cm = compute_competition_metrics(0, 10, &[scored(&a, 5)]);

        assert_eq!(cm.highest_average_better, MetricValue::new(a.clone(), 5.0));
        assert_eq!(cm.lowest_average_better, MetricValue::new(a.clone(), 5.0));
        assert_eq!(cm.most_top_scores.value, 0);
        assert_eq!(cm.most_bottom_scores.value, 0);
        assert_eq!(cm.group_average_score, 5.0);
    }

    #[test]
    fn test_top_and_bottom_classification() {
        let a = better(1, "Alpha");
        let b = better(2, "Bravo");
        let bets = vec![
            scored(&a, 0),
            scored(&a, 10),
            scored(&a, 10),
            scored(&b, 5),
            scored(&b, 5),
            scored(&b, 5),
        ];

        let cm = compute_competition_metrics(0, 10, &bets);

        assert_eq!(cm.most_top_scores, MetricValue::new(a.clone(), 2));
        assert_eq!(cm.most_bottom_scores, MetricValue::new(a.clone(), 1));
        assert_eq!(cm.number_of_top_scores, 2);
        assert_eq!(cm.number_of_bottom_scores, 1);
        assert!((cm.group_average_score - 35.0 / 6.0).abs() < 1e-9);
        assert_eq!(cm.highest_average_better.who, Some(a));
        assert_eq!(cm.lowest_average_better.who, Some(b));
    }

    #[test]
    fn test_tie_keeps_first_seen_better() {
        let a = better(5, "Alpha");
        let b = better(1, "Bravo");
        let bets = vec![scored(&a, 7), scored(&b, 6), scored(&b, 8), scored(&a, 7)];

        let cm = compute_competition_metrics(0, 10, &bets);

        assert_eq!(cm.highest_average_better, MetricValue::new(a.clone(), 7.0));
        assert_eq!(cm.lowest_average_better, MetricValue::new(a, 7.0));
    }

    #[test]
    fn test_tie_follows_bet_order_not_id() {
        let a = better(5, "Alpha");
        let b = better(1, "Bravo");
        let bets = vec![scored(&b, 7), scored(&a, 7)];

        let cm = compute_competition_metrics(0, 10, &bets);

        assert_eq!(cm.highest_average_better.who, Some(b));
    }

    #[test]
    fn test_note_extremes_with_empty_note() {
        let a = better(1, "Alpha");
        let b = better(2, "Bravo");
        let bets = vec![noted(&a, ""), noted(&a, "hello world"), noted(&b, "hi")];

        let cm = compute_competition_metrics(0, 10, &bets);

        assert_eq!(
            cm.longest_note,
            MetricValue::new(a, "hello world".to_string())
        );
        assert_eq!(cm.shortest_note, MetricValue::new(b, "hi".to_string()));
    }

    #[test]
    fn test_note_length_ties_on_bytes() {
        let a = better(1, "Alpha");
        let b = better(2, "Bravo");
        let bets = vec![noted(&a, "ab"), noted(&b, "é")];

        let cm = compute_competition_metrics(0, 10, &bets);

        // "é" is two bytes, so it ties with "ab" and the first holder stays.
        assert_eq!(cm.shortest_note, MetricValue::new(a.clone(), "ab".to_string()));
        assert_eq!(cm.longest_note, MetricValue::new(a, "ab".to_string()));
    }

    #[test]
    fn test_all_notes_empty_leaves_note_records_unset() {
        let a = better(1, "Alpha");
        let cm = compute_competition_metrics(0, 10, &[scored(&a, 3), noted(&a, "")]);

        assert!(cm.longest_note.is_unset());
        assert!(cm.shortest_note.is_unset());
        assert_eq!(cm.shortest_note.value, "");
    }

    #[test]
    fn test_absent_scores_count_as_bottom_scores() {
        let a = better(1, "Alpha");
        let mut bet = scored(&a, 0);
        bet.score = None;

        let cm = compute_competition_metrics(0, 10, &[bet, scored(&a, 10)]);

        assert_eq!(cm.number_of_bottom_scores, 1);
        assert_eq!(cm.number_of_top_scores, 1);
        assert_eq!(cm.group_average_score, 5.0);
    }

    #[test]
    fn test_negative_score_range() {
        let a = better(1, "Alpha");
        let b = better(2, "Bravo");
        let bets = vec![scored(&a, -5), scored(&a, -5), scored(&b, 5)];

        let cm = compute_competition_metrics(-5, 5, &bets);

        assert_eq!(cm.most_bottom_scores, MetricValue::new(a.clone(), 2));
        assert_eq!(cm.most_top_scores, MetricValue::new(b.clone(), 1));
        assert_eq!(cm.lowest_average_better, MetricValue::new(a, -5.0));
        assert_eq!(cm.highest_average_better.who, Some(b));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let betters: Vec<_> = (1..=20).map(|i| better(i, &format!("Better {}", i))).collect();
        let bets: Vec<_> = betters
            .iter()
            .flat_map(|b| [scored(b, 7), noted(b, "same")])
            .collect();

        let first = compute_competition_metrics(0, 10, &bets);
        let second = compute_competition_metrics(0, 10, &bets);

        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.highest_average_better.who, Some(betters[0].clone()));
        assert_eq!(first.longest_note.who, Some(betters[0].clone()));
    }
}
