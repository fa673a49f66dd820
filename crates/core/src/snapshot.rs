//! Render-ready, fully owned views of a [`Ledger`].
//!
//! A snapshot never aliases live state: turns are cloned and the summary is
//! computed at capture time, so the renderer can hold one across refreshes
//! while the writer keeps appending. The core never formats for display;
//! icons, colors, and collapsing are the renderer's business.

use serde::{Deserialize, Serialize};

use crate::ledger::{ActionRecord, Ledger, Turn};
use crate::stats::{self, ActionSummary};

/// Point-in-time view of the ledger plus derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub session_id: String,
    pub turns: Vec<Turn>,
    pub summary: ActionSummary,
    /// The most recently started still-pending action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_flight: Option<ActionRecord>,
}

impl LedgerSnapshot {
    pub fn of(ledger: &Ledger) -> Self {
        let in_flight = ledger
            .turns()
            .iter()
            .flat_map(|t| &t.actions)
            .filter(|a| !a.is_terminal())
            .next_back()
            .cloned();
        Self {
            session_id: ledger.session_id.clone(),
            turns: ledger.turns().to_vec(),
            summary: stats::summarize(ledger),
            in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn in_flight_is_the_most_recently_started_pending_action() {
        let mut ledger = Ledger::new();
        ledger.attach(testing::pending_record("a", "shell"));
        ledger.attach(testing::terminal_record("b", "shell", true, 100));
        ledger.attach(testing::pending_record("c", "calculator"));

        let snapshot = LedgerSnapshot::of(&ledger);

        assert_eq!(snapshot.in_flight.unwrap().id, "c");
    }

    #[test]
    fn snapshot_is_detached_from_later_mutation() {
        let mut ledger = Ledger::new();
        ledger.attach(testing::pending_record("a", "shell"));

        let snapshot = LedgerSnapshot::of(&ledger);
        ledger.start_turn();
        ledger.attach(testing::pending_record("b", "shell"));
        ledger.append_reasoning("later thoughts");

        assert_eq!(snapshot.turns.len(), 1);
        assert_eq!(snapshot.turns[0].actions.len(), 1);
        assert!(snapshot.turns[0].reasoning_text.is_empty());
    }

    #[test]
    fn snapshot_serializes_for_the_renderer_boundary() {
        let mut ledger = Ledger::new();
        ledger.attach(testing::terminal_record("a", "shell", false, 250));

        let json = serde_json::to_value(LedgerSnapshot::of(&ledger)).unwrap();

        assert_eq!(json["turns"][0]["actions"][0]["status"], "failed");
        assert_eq!(json["turns"][0]["actions"][0]["duration_ms"], 250);
        assert_eq!(json["summary"]["failed"], 1);
    }
}
