//! Session snapshots
//!
//! A [`Snapshot`] is a complete, versioned copy of a session. Servers emit a
//! new one after every change; clients keep the newest one they have seen
//! and never merge fields from different snapshots.

use crate::session::Session;
use serde::{Deserialize, Serialize};

/// Full session state at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub session: Session,
    /// Milliseconds since the Unix epoch
    pub generated_at: u64,
    /// Strictly increasing within a session
    pub sequence_id: u64,
}

impl Snapshot {
    pub fn new(session: Session, generated_at: u64, sequence_id: u64) -> Self {
        Self {
            session,
            generated_at,
            sequence_id,
        }
    }
}

/// Client-side ordering guard for incoming snapshots.
///
/// A snapshot is applied only if its `sequence_id` is strictly greater than
/// the last applied one, which drops duplicates and late deliveries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotReconciler {
    last_applied: Option<u64>,
}

impl SnapshotReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a previously applied sequence id.
    pub fn with_last_applied(last_applied: Option<u64>) -> Self {
        Self { last_applied }
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.last_applied
    }

    pub fn should_apply(&self, sequence_id: u64) -> bool {
        self.last_applied.is_none_or(|last| sequence_id > last)
    }

    /// Record `snapshot` as applied if it is newer; returns whether it was.
    pub fn accept(&mut self, snapshot: &Snapshot) -> bool {
        if self.should_apply(snapshot.sequence_id) {
            self.last_applied = Some(snapshot.sequence_id);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::{ParticipantId, SessionId};
    use crate::session::SessionSettings;

    fn snapshot(sequence_id: u64) -> Snapshot {
        let session = Session::new(
            SessionId::new("s"),
            "S",
            ParticipantId::new("m"),
            SessionSettings::default(),
        );
        Snapshot::new(session, 1_700_000_000_000, sequence_id)
    }

    #[test]
    fn test_first_snapshot_is_always_applied() {
        let mut reconciler = SnapshotReconciler::new();
        assert!(reconciler.accept(&snapshot(1234)));
        assert_eq!(reconciler.last_applied(), Some(1234));
    }

    #[test]
    fn test_stale_and_duplicate_snapshots_are_discarded() {
        let mut reconciler = SnapshotReconciler::new();
        assert!(reconciler.accept(&snapshot(5)));
        assert!(!reconciler.accept(&snapshot(4)));
        assert!(!reconciler.accept(&snapshot(5)));
        assert!(reconciler.accept(&snapshot(6)));
        assert_eq!(reconciler.last_applied(), Some(6));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(snapshot(7)).unwrap();
        assert_eq!(json["sequenceId"], 7);
        assert_eq!(json["generatedAt"], 1_700_000_000_000u64);
        assert_eq!(json["session"]["phase"], "lobby");
    }
}
