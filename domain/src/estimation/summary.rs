//! Round summary derived from a session's votes

use super::{CONSENSUS_THRESHOLD_PERCENT, Outliers, average, consensus, median, mode, numeric_votes, outliers};
use crate::core::ids::WorkItemId;
use crate::session::Session;
use crate::vote::VoteValue;
use serde::{Deserialize, Serialize};

/// Statistics for one round, recomputed from scratch on every call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundSummary {
    pub work_item_id: Option<WorkItemId>,
    /// Votes cast, including sentinel cards
    pub total_votes: usize,
    pub numeric_count: usize,
    pub average: Option<f64>,
    pub median: Option<f64>,
    pub mode: Option<f64>,
    pub consensus: bool,
    pub outliers: Outliers,
}

impl RoundSummary {
    pub fn from_votes(votes: &[VoteValue], threshold_percent: f64) -> Self {
        Self {
            work_item_id: None,
            total_votes: votes.iter().filter(|v| !v.is_empty()).count(),
            numeric_count: numeric_votes(votes).len(),
            average: average(votes),
            median: median(votes),
            mode: mode(votes),
            consensus: consensus(votes, threshold_percent),
            outliers: outliers(votes),
        }
    }

    /// Summary of the session's current round, only while votes are visible.
    pub fn from_session(session: &Session, threshold_percent: f64) -> Option<Self> {
        if !session.phase().votes_visible() {
            return None;
        }
        let mut summary = Self::from_votes(&session.vote_values(), threshold_percent);
        summary.work_item_id = session.active_work_item_id().cloned();
        Some(summary)
    }

    /// Summary using the default consensus threshold.
    pub fn with_default_threshold(session: &Session) -> Option<Self> {
        Self::from_session(session, CONSENSUS_THRESHOLD_PERCENT)
    }

    /// Estimate to propose: the modal value on consensus, otherwise the median.
    pub fn suggested_estimate(&self) -> VoteValue {
        let value = if self.consensus { self.mode } else { self.median };
        value.map(VoteValue::Numeric).unwrap_or_default()
    }
}
