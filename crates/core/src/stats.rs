//! Summary statistics derived from a [`Ledger`].
//!
//! Always recomputed from the turn sequence on request, never maintained
//! incrementally. Ledger sizes are bounded by a single conversation, so a
//! full pass is cheap, and a single source of truth cannot drift.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::{ActionStatus, Ledger, ToolCategory};

/// Invocation counts split by tool origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub builtin: u64,
    pub mcp: u64,
    pub custom: u64,
}

/// Aggregate view of a ledger, computed by [`summarize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub total_actions: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub pending: u64,
    pub turn_count: u64,
    /// `(tool_name, invocation count)` sorted by count descending.
    pub per_tool_counts: Vec<(String, u64)>,
    pub per_category_counts: CategoryCounts,
    /// `succeeded / (succeeded + failed)`; `None` with no terminal records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_rate: Option<f64>,
    /// Mean duration over terminal records; `None` with no terminal records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_duration_ms: Option<f64>,
}

/// Compute summary statistics over every action in the ledger.
pub fn summarize(ledger: &Ledger) -> ActionSummary {
    let mut summary = ActionSummary {
        turn_count: ledger.turn_count() as u64,
        ..Default::default()
    };

    let mut tool_counts: HashMap<&str, u64> = HashMap::new();
    let mut duration_sum_ms = 0u64;
    let mut duration_count = 0u64;

    for action in ledger.turns().iter().flat_map(|t| &t.actions) {
        summary.total_actions += 1;
        *tool_counts.entry(action.tool_name.as_str()).or_default() += 1;
        match action.category {
            ToolCategory::Builtin => summary.per_category_counts.builtin += 1,
            ToolCategory::Mcp => summary.per_category_counts.mcp += 1,
            ToolCategory::Custom => summary.per_category_counts.custom += 1,
        }
        match action.status {
            ActionStatus::Pending => summary.pending += 1,
            ActionStatus::Succeeded => summary.succeeded += 1,
            ActionStatus::Failed => summary.failed += 1,
        }
        if let Some(ms) = action.duration_ms {
            duration_sum_ms += ms;
            duration_count += 1;
        }
    }

    let terminal = summary.succeeded + summary.failed;
    if terminal > 0 {
        summary.success_rate = Some(summary.succeeded as f64 / terminal as f64);
    }
    if duration_count > 0 {
        summary.mean_duration_ms = Some(duration_sum_ms as f64 / duration_count as f64);
    }

    let mut per_tool: Vec<(String, u64)> = tool_counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    per_tool.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    summary.per_tool_counts = per_tool;

    summary
}
