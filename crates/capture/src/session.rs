//! The event sink and action aggregator.
//!
//! A [`CaptureSession`] owns one session's [`Ledger`] together with the
//! correlation state needed to match `tool_end` events back to the records
//! their `tool_start` created, across arbitrary interleaving of starts and
//! ends for distinct ids (the runtime may run tools in parallel; the only
//! per-id guarantee is start before end). Records always surface in start
//! order, so parallel executions render in a stable sequence regardless of
//! which finishes first.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use actiontrail_core::{ActionRecord, Ledger, LedgerSnapshot};
use actiontrail_runtime_config::CaptureConfig;

use crate::categorize::categorize;
use crate::event::{AgentEvent, MessageBlock};

/// Counters for events the pipeline tolerated instead of raising.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    /// Recognized event kinds dropped for a missing/mistyped field.
    pub malformed_events: u64,
    /// Replayed `tool_start`s for an id already seen.
    pub duplicate_starts: u64,
    /// Replayed `tool_end`s for an already-terminal record.
    pub duplicate_ends: u64,
    /// `tool_end`s with no matching start (record was synthesized).
    pub orphan_ends: u64,
}

/// Where a record landed in the ledger, keyed by correlation id.
#[derive(Debug, Clone, Copy)]
struct ActionSlot {
    turn_index: u64,
    slot: usize,
}

/// Session-scoped capture state: event sink, aggregator, reasoning
/// tracker, and snapshot provider in one owned object.
///
/// Single logical writer, synchronous handlers, nothing here blocks or
/// suspends. Callers that deliver events from multiple threads must
/// serialize delivery before it reaches the sink.
#[derive(Debug)]
pub struct CaptureSession {
    ledger: Ledger,
    config: CaptureConfig,
    builtin: HashSet<String>,
    slots: HashMap<String, ActionSlot>,
    start_seq: u64,
    diagnostics: CaptureDiagnostics,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(CaptureConfig::default())
    }
}

impl CaptureSession {
    pub fn new(config: CaptureConfig) -> Self {
        let builtin = config.tools.builtin.iter().cloned().collect();
        Self {
            ledger: Ledger::new(),
            config,
            builtin,
            slots: HashMap::new(),
            start_seq: 0,
            diagnostics: CaptureDiagnostics::default(),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.diagnostics
    }

    /// Owned, render-ready view of the ledger plus derived statistics.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::of(&self.ledger)
    }

    /// Decode a raw runtime payload and dispatch it.
    ///
    /// A recognized kind with a bad payload is dropped and counted; this
    /// never fails back into the runtime.
    pub fn handle_raw(&mut self, value: Value) {
        match AgentEvent::from_value(value) {
            Ok(event) => self.handle_event(event),
            Err(err) => {
                self.diagnostics.malformed_events += 1;
                debug!(error = %err, "dropping malformed agent event");
            }
        }
    }

    /// Dispatch one event, synchronously, in arrival order.
    pub fn handle_event(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::UserMessageStart => {
                self.ledger.start_turn();
            }
            AgentEvent::ToolStart {
                id,
                name,
                input,
                timestamp,
                server_origin,
            } => self.on_tool_start(id, name, input, timestamp, server_origin),
            AgentEvent::ToolEnd {
                id,
                output,
                success,
                timestamp,
            } => self.on_tool_end(id, output, success, timestamp),
            AgentEvent::ReasoningDelta { text } => {
                if self.config.capture.reasoning {
                    self.ledger.append_reasoning(&text);
                }
            }
            // plain chat text belongs to the renderer, not the ledger
            AgentEvent::TextDelta { .. } => {}
            AgentEvent::TurnEnd => self.ledger.close_open_turn(),
            AgentEvent::Message { content } => {
                for block in content {
                    match block {
                        MessageBlock::ToolUse { id, name, input } => {
                            self.on_tool_start(id, name, input, Utc::now(), false)
                        }
                        MessageBlock::ToolResult { id, success, content } => {
                            self.on_tool_end(id, content, success, Utc::now())
                        }
                        MessageBlock::Other => {}
                    }
                }
            }
            AgentEvent::Other => {}
        }
    }

    fn on_tool_start(
        &mut self,
        id: Option<String>,
        name: String,
        input: Map<String, Value>,
        timestamp: DateTime<Utc>,
        server_origin: bool,
    ) {
        self.start_seq += 1;
        let id = match id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => format!("{name}#{}", self.start_seq),
        };
        if self.slots.contains_key(&id) {
            // the runtime is the sole producer; a repeat is a replay
            self.diagnostics.duplicate_starts += 1;
            debug!(%id, tool = %name, "ignoring replayed tool_start");
            return;
        }
        let category = categorize(&name, server_origin, &self.builtin);
        let record = ActionRecord::pending(id.clone(), name, category, input, timestamp);
        let (turn_index, slot) = self.ledger.attach(record);
        self.slots.insert(id, ActionSlot { turn_index, slot });
    }

    fn on_tool_end(&mut self, id: String, output: Value, success: bool, timestamp: DateTime<Utc>) {
        if let Some(at) = self.slots.get(&id).copied() {
            // a slow tool may finish after its turn closed; the record is
            // finalized in the turn it started in, not the open one
            if let Some(record) = self.ledger.action_mut(at.turn_index, at.slot) {
                if !record.finalize(output, success, timestamp) {
                    self.diagnostics.duplicate_ends += 1;
                    debug!(%id, "ignoring replayed tool_end");
                }
            }
            return;
        }
        // completion with no matching start (sink attached mid-stream):
        // keep the history complete rather than insist on correlation
        self.diagnostics.orphan_ends += 1;
        warn!(%id, "tool_end with no matching start, synthesizing record");
        let record = ActionRecord::synthesized(id.clone(), output, success, timestamp);
        let (turn_index, slot) = self.ledger.attach(record);
        self.slots.insert(id, ActionSlot { turn_index, slot });
    }

    /// Atomic reset of the ledger and all correlation state. Call between
    /// event dispatches, never during one.
    pub fn clear(&mut self) {
        self.ledger.clear();
        self.slots.clear();
        self.start_seq = 0;
        self.diagnostics = CaptureDiagnostics::default();
    }

    /// Drop oldest closed turns until at most `max_turns` remain, and
    /// forget correlation entries that pointed into them.
    pub fn trim_to(&mut self, max_turns: usize) -> usize {
        let removed = self.ledger.trim_to(max_turns);
        if removed > 0 {
            let first = self.ledger.first_index();
            self.slots.retain(|_, at| at.turn_index >= first);
        }
        removed
    }

    /// Apply the configured retention limit, if one is set.
    pub fn apply_retention(&mut self) -> usize {
        match self.config.retention.max_turns {
            Some(max) => self.trim_to(max as usize),
            None => 0,
        }
    }
}
