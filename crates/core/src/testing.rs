//! Shared test fixtures, available to dependent crates via the `testing`
//! feature.

use chrono::{Duration, Utc};
use serde_json::{Map, Value};

use crate::ledger::{ActionRecord, ToolCategory};

/// Pending record for `tool_name` with a single `"arg": "value"` input.
pub fn pending_record(id: &str, tool_name: &str) -> ActionRecord {
    let mut input = Map::new();
    input.insert("arg".to_string(), Value::String("value".to_string()));
    ActionRecord::pending(
        id.to_string(),
        tool_name.to_string(),
        ToolCategory::Custom,
        input,
        Utc::now(),
    )
}

/// Terminal record that ran for `duration_ms` milliseconds.
pub fn terminal_record(id: &str, tool_name: &str, success: bool, duration_ms: i64) -> ActionRecord {
    let mut record = pending_record(id, tool_name);
    let ended = record.started_at + Duration::milliseconds(duration_ms);
    record.finalize(Value::String("done".to_string()), success, ended);
    record
}

/// Pending record tagged with an explicit category.
pub fn record_with_category(id: &str, category: ToolCategory) -> ActionRecord {
    let mut record = pending_record(id, "tool");
    record.category = category;
    record
}
