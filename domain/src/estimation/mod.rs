//! Estimation engine
//!
//! Pure functions that reduce a set of [`VoteValue`]s to the statistics shown
//! once votes are revealed. Only numeric votes take part; sentinel cards and
//! empty votes are ignored by every statistic. Nothing is cached: callers
//! recompute from the current vote set each time.
//!
//! ```
//! use poker_domain::estimation::{average, consensus, median, outliers};
//! use poker_domain::VoteValue;
//!
//! let votes = [VoteValue::from(5.0), VoteValue::from(8.0)];
//! assert_eq!(average(&votes), Some(6.5));
//! assert_eq!(median(&votes), Some(6.5));
//! assert!(!consensus(&votes, 70.0));
//! assert_eq!(outliers(&votes).min, Some(5.0));
//! ```

pub mod summary;

use crate::vote::VoteValue;
use serde::{Deserialize, Serialize};

pub use summary::RoundSummary;

/// Default share of votes the modal value must exceed for consensus.
pub const CONSENSUS_THRESHOLD_PERCENT: f64 = 70.0;

/// Numeric subset of `votes`, sorted ascending.
pub fn numeric_votes(votes: &[VoteValue]) -> Vec<f64> {
    let mut numbers: Vec<f64> = votes.iter().filter_map(VoteValue::as_number).collect();
    numbers.sort_by(f64::total_cmp);
    numbers
}

/// Arithmetic mean rounded to one decimal place, `None` without numeric votes.
pub fn average(votes: &[VoteValue]) -> Option<f64> {
    let numbers = numeric_votes(votes);
    if numbers.is_empty() {
        return None;
    }
    let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
    Some(round_one_decimal(mean))
}

/// Order-statistic median, `None` without numeric votes.
pub fn median(votes: &[VoteValue]) -> Option<f64> {
    let numbers = numeric_votes(votes);
    if numbers.is_empty() {
        return None;
    }
    let mid = numbers.len() / 2;
    if numbers.len() % 2 == 1 {
        Some(numbers[mid])
    } else {
        Some((numbers[mid - 1] + numbers[mid]) / 2.0)
    }
}

/// Most frequent numeric value.
///
/// On ties the smallest value reaching the highest count wins.
pub fn mode(votes: &[VoteValue]) -> Option<f64> {
    mode_with_count(&numeric_votes(votes)).map(|(value, _)| value)
}

/// Whether the modal value's share strictly exceeds `threshold_percent`.
///
/// An empty numeric set never reaches consensus.
pub fn consensus(votes: &[VoteValue], threshold_percent: f64) -> bool {
    let numbers = numeric_votes(votes);
    match mode_with_count(&numbers) {
        Some((_, count)) => count as f64 * 100.0 > threshold_percent * numbers.len() as f64,
        None => false,
    }
}

/// Lowest and highest numeric vote, present only when votes disagree.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Outliers {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Outliers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has_outliers(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }
}

/// Min/max of the numeric votes when there are at least two and they differ.
pub fn outliers(votes: &[VoteValue]) -> Outliers {
    let numbers = numeric_votes(votes);
    match (numbers.first(), numbers.last()) {
        (Some(&min), Some(&max)) if numbers.len() >= 2 && min != max => Outliers {
            min: Some(min),
            max: Some(max),
        },
        _ => Outliers::none(),
    }
}

/// `sorted` must be ascending; walks runs of equal values.
fn mode_with_count(sorted: &[f64]) -> Option<(f64, usize)> {
    let mut best: Option<(f64, usize)> = None;
    let mut i = 0;
    while i < sorted.len() {
        let value = sorted[i];
        let run = sorted[i..].iter().take_while(|v| **v == value).count();
        if best.is_none_or(|(_, count)| run > count) {
            best = Some((value, run));
        }
        i += run;
    }
    best
}

/// Half-up rounding to one decimal (6.25 becomes 6.3).
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vote::Sentinel;

    fn nums(values: &[f64]) -> Vec<VoteValue> {
        values.iter().copied().map(VoteValue::from).collect()
    }

    #[test]
    fn test_numeric_votes_filters_and_sorts() {
        let votes = vec![
            VoteValue::from(8.0),
            VoteValue::Sentinel(Sentinel::Unknown),
            VoteValue::Empty,
            VoteValue::from(3.0),
        ];
        assert_eq!(numeric_votes(&votes), vec![3.0, 8.0]);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        assert_eq!(average(&nums(&[1.0, 2.0, 2.0])), Some(1.7));
        assert_eq!(average(&nums(&[5.0, 8.0])), Some(6.5));
        assert_eq!(average(&nums(&[3.0])), Some(3.0));
    }

    #[test]
    fn test_no_data_for_non_numeric_sets() {
        let votes = vec![
            VoteValue::Sentinel(Sentinel::Unknown),
            VoteValue::Sentinel(Sentinel::NeedsBreak),
            VoteValue::Empty,
        ];
        assert_eq!(average(&votes), None);
        assert_eq!(median(&votes), None);
        assert_eq!(mode(&votes), None);
        assert_eq!(average(&[]), None);
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_sentinels_do_not_shift_statistics() {
        let mut votes = nums(&[2.0, 4.0]);
        votes.push(VoteValue::Sentinel(Sentinel::NeedsBreak));
        votes.push(VoteValue::Empty);
        assert_eq!(average(&votes), Some(3.0));
        assert_eq!(median(&votes), Some(3.0));
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&nums(&[8.0, 1.0, 3.0])), Some(3.0));
        assert_eq!(median(&nums(&[1.0, 2.0, 3.0, 13.0])), Some(2.5));
    }

    #[test]
    fn test_consensus() {
        assert!(consensus(&nums(&[5.0, 5.0, 5.0, 5.0]), 70.0));
        assert!(!consensus(&nums(&[5.0, 5.0, 8.0, 13.0]), 70.0));
        assert!(!consensus(&[], 70.0));
        // 3 of 4 is 75%
        assert!(consensus(&nums(&[5.0, 5.0, 5.0, 8.0]), 70.0));
        // exactly at the threshold is not enough
        assert!(!consensus(&nums(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 3.0, 5.0]), 70.0));
    }

    #[test]
    fn test_mode_tie_prefers_lowest_value() {
        assert_eq!(mode(&nums(&[8.0, 8.0, 3.0, 3.0, 13.0])), Some(3.0));
        assert_eq!(mode(&nums(&[5.0, 8.0, 8.0])), Some(8.0));
    }

    #[test]
    fn test_outliers() {
        assert_eq!(outliers(&nums(&[5.0])), Outliers::none());
        assert_eq!(outliers(&nums(&[5.0, 5.0])), Outliers::none());
        let result = outliers(&nums(&[3.0, 5.0, 8.0]));
        assert_eq!(result.min, Some(3.0));
        assert_eq!(result.max, Some(8.0));
        assert!(result.has_outliers());
    }

    #[test]
    fn test_outliers_ignore_sentinels() {
        let mut votes = nums(&[5.0]);
        votes.push(VoteValue::Sentinel(Sentinel::Unknown));
        assert!(!outliers(&votes).has_outliers());
    }
}
