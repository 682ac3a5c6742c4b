//! Record-holder selection for a single metric.

use crate::models::{BetterRef, MetricValue};

use super::aggregate::note_len;

/// Which side of a comparison takes the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    GreaterWins,
    LesserWins,
}

/// A value that can compete for a metric record.
pub trait MetricCandidate {
    /// Whether this value may hold a record at all.
    fn is_eligible(&self) -> bool {
        true
    }

    /// Whether this value strictly beats `current`. Ties never win.
    fn beats(&self, current: &Self, comparison: Comparison) -> bool;
}

impl MetricCandidate for f64 {
    fn beats(&self, current: &Self, comparison: Comparison) -> bool {
        match comparison {
            Comparison::GreaterWins => self > current,
            Comparison::LesserWins => self < current,
        }
    }
}

impl MetricCandidate for u32 {
    fn beats(&self, current: &Self, comparison: Comparison) -> bool {
        match comparison {
            Comparison::GreaterWins => self > current,
            Comparison::LesserWins => self < current,
        }
    }
}

/// Notes compete on length; an empty note never holds a record.
impl MetricCandidate for String {
    fn is_eligible(&self) -> bool {
        !self.is_empty()
    }

    fn beats(&self, current: &Self, comparison: Comparison) -> bool {
        let (len, current_len) = (note_len(self), note_len(current));
        match comparison {
            Comparison::GreaterWins => len > current_len,
            Comparison::LesserWins => len < current_len,
        }
    }
}

/// Decide whether `candidate` takes the record from `current`.
///
/// Returns the new record when it does. An unset record is taken by any
/// eligible candidate.
pub fn should_update_metric<T: MetricCandidate>(
    candidate: T,
    comparison: Comparison,
    current: &MetricValue<T>,
    who: &BetterRef,
) -> Option<MetricValue<T>> {
    if !candidate.is_eligible() {
        return None;
    }

    if current.is_unset() || candidate.beats(&current.value, comparison) {
        Some(MetricValue::new(who.clone(), candidate))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BetterId;

    fn alpha() -> BetterRef {
        BetterRef::new(BetterId::new(1), "Alpha")
    }

    fn bravo() -> BetterRef {
        BetterRef::new(BetterId::new(2), "Bravo")
    }

    #[test]
    fn test_unset_record_is_always_taken() {
        let current: MetricValue<f64> = MetricValue::default();
        let mv = should_update_metric(-3.5, Comparison::GreaterWins, &current, &alpha()).unwrap();

        assert_eq!(mv.who, Some(alpha()));
        assert_eq!(mv.value, -3.5);

        let current: MetricValue<u32> = MetricValue::default();
        assert!(should_update_metric(0, Comparison::LesserWins, &current, &alpha()).is_some());
    }

    #[test]
    fn test_numeric_greater_wins() {
        let current = MetricValue::new(alpha(), 5.0);

        assert!(should_update_metric(5.5, Comparison::GreaterWins, &current, &bravo()).is_some());
        assert!(should_update_metric(4.5, Comparison::GreaterWins, &current, &bravo()).is_none());
    }

    #[test]
    fn test_numeric_lesser_wins() {
        let current = MetricValue::new(alpha(), 3_u32);

        assert!(should_update_metric(2, Comparison::LesserWins, &current, &bravo()).is_some());
        assert!(should_update_metric(4, Comparison::LesserWins, &current, &bravo()).is_none());
    }

    #[test]
    fn test_ties_keep_current_holder() {
        let avg = MetricValue::new(alpha(), 7.0);
        assert!(should_update_metric(7.0, Comparison::GreaterWins, &avg, &bravo()).is_none());
        assert!(should_update_metric(7.0, Comparison::LesserWins, &avg, &bravo()).is_none());

        let count = MetricValue::new(alpha(), 2_u32);
        assert!(should_update_metric(2, Comparison::GreaterWins, &count, &bravo()).is_none());

        let note = MetricValue::new(alpha(), "abc".to_string());
        assert!(
            should_update_metric("xyz".to_string(), Comparison::GreaterWins, &note, &bravo())
                .is_none()
        );
    }

    #[test]
    fn test_note_length_comparison() {
        let current = MetricValue::new(alpha(), "hello".to_string());

        let longer =
            should_update_metric("hello world".to_string(), Comparison::GreaterWins, &current, &bravo());
        assert_eq!(longer.unwrap().value, "hello world");

        let shorter = should_update_metric("hi".to_string(), Comparison::LesserWins, &current, &bravo());
        assert_eq!(shorter.unwrap().who, Some(bravo()));
    }

    #[test]
    fn test_empty_note_never_wins() {
        let unset: MetricValue<String> = MetricValue::default();
        assert!(should_update_metric(String::new(), Comparison::LesserWins, &unset, &alpha()).is_none());
        assert!(should_update_metric(String::new(), Comparison::GreaterWins, &unset, &alpha()).is_none());

        let current = MetricValue::new(alpha(), "hi".to_string());
        assert!(should_update_metric(String::new(), Comparison::LesserWins, &current, &bravo()).is_none());
    }
}
