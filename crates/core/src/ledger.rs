use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where a tool came from, inferred at start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// One of the runtime's enumerated built-in tools.
    Builtin,
    /// Dispatched through an MCP server.
    Mcp,
    /// Anything else (user-registered tools).
    Custom,
}

/// Lifecycle state of a single tool invocation.
///
/// Transitions `Pending` → `Succeeded`/`Failed` at most once; a record is
/// never mutated again after reaching a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Succeeded,
    Failed,
}

impl ActionStatus {
    pub fn is_terminal(self) -> bool {
        self != ActionStatus::Pending
    }

    pub fn from_success(success: bool) -> Self {
        if success {
            ActionStatus::Succeeded
        } else {
            ActionStatus::Failed
        }
    }
}

/// The captured lifecycle of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Correlation id from the runtime, or synthesized `"<name>#<seq>"`.
    pub id: String,
    pub tool_name: String,
    pub category: ToolCategory,
    pub status: ActionStatus,
    /// Input parameters captured at start; immutable afterwards.
    pub input: Map<String, Value>,
    /// Result payload, set exactly once at completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// `ended_at - started_at`; `None` while pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// The turn that was open when this action started.
    pub turn_index: u64,
}

impl ActionRecord {
    /// New pending record. `turn_index` is assigned by [`Ledger::attach`].
    pub fn pending(
        id: String,
        tool_name: String,
        category: ToolCategory,
        input: Map<String, Value>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tool_name,
            category,
            status: ActionStatus::Pending,
            input,
            output: None,
            started_at,
            ended_at: None,
            duration_ms: None,
            turn_index: 0,
        }
    }

    /// Zero-duration terminal record for a result whose start was never seen.
    pub fn synthesized(
        id: String,
        output: Value,
        success: bool,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tool_name: "unknown".to_string(),
            category: ToolCategory::Custom,
            status: ActionStatus::from_success(success),
            input: Map::new(),
            output: Some(output),
            started_at: timestamp,
            ended_at: Some(timestamp),
            duration_ms: Some(0),
            turn_index: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move a pending record to its terminal state.
    ///
    /// Returns `false` (leaving the record untouched) if the record is
    /// already terminal, so a replayed completion is a no-op.
    pub fn finalize(&mut self, output: Value, success: bool, ended_at: DateTime<Utc>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = ActionStatus::from_success(success);
        self.output = Some(output);
        self.ended_at = Some(ended_at);
        self.duration_ms = Some((ended_at - self.started_at).num_milliseconds().max(0) as u64);
        true
    }
}

/// The span of activity between one user message and the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Monotonically increasing from 0, stable across trims.
    pub index: u64,
    /// Action records in start order.
    pub actions: Vec<ActionRecord>,
    /// Accumulated thinking-token text, append-only while the turn is open.
    pub reasoning_text: String,
    pub closed: bool,
}

impl Turn {
    pub fn new(index: u64) -> Self {
        Self {
            index,
            actions: Vec::new(),
            reasoning_text: String::new(),
            closed: false,
        }
    }
}

/// The full ordered history of turns for one session.
///
/// Owned by exactly one session; there is no ambient global. A single
/// logical writer mutates it through the capture pipeline and readers take
/// owned [`snapshot`](crate::snapshot::LedgerSnapshot)s, so no locking
/// lives here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    /// Absolute index of `turns[0]`; advances when old turns are trimmed.
    first_index: u64,
    turns: Vec<Turn>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            first_index: 0,
            turns: Vec::new(),
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn action_count(&self) -> usize {
        self.turns.iter().map(|t| t.actions.len()).sum()
    }

    /// Absolute index of the oldest retained turn.
    pub fn first_index(&self) -> u64 {
        self.first_index
    }

    fn next_index(&self) -> u64 {
        self.first_index + self.turns.len() as u64
    }

    pub fn turn(&self, index: u64) -> Option<&Turn> {
        let offset = index.checked_sub(self.first_index)?;
        self.turns.get(offset as usize)
    }

    fn turn_mut(&mut self, index: u64) -> Option<&mut Turn> {
        let offset = index.checked_sub(self.first_index)?;
        self.turns.get_mut(offset as usize)
    }

    pub fn has_open_turn(&self) -> bool {
        self.turns.last().is_some_and(|t| !t.closed)
    }

    /// Close the open turn (if any) and append the next one.
    ///
    /// Exactly one turn is open at a time; this is the only way a second
    /// turn comes into existence.
    pub fn start_turn(&mut self) -> u64 {
        self.close_open_turn();
        let index = self.next_index();
        self.turns.push(Turn::new(index));
        index
    }

    /// Mark the open turn closed, freezing its actions and reasoning text.
    pub fn close_open_turn(&mut self) {
        if let Some(turn) = self.turns.last_mut() {
            turn.closed = true;
        }
    }

    /// The currently open turn, implicitly opening turn 0 (or the next
    /// turn) when tool or reasoning events precede the first recognized
    /// user message.
    fn open_turn_mut(&mut self) -> &mut Turn {
        if !self.has_open_turn() {
            self.start_turn();
        }
        self.turns.last_mut().unwrap()
    }

    /// Append a record to the open turn, in start order.
    ///
    /// Stamps the record with the open turn's index and returns
    /// `(turn_index, slot)` so the caller can find it again when the
    /// matching completion arrives.
    pub fn attach(&mut self, mut record: ActionRecord) -> (u64, usize) {
        let turn = self.open_turn_mut();
        record.turn_index = turn.index;
        turn.actions.push(record);
        (turn.index, turn.actions.len() - 1)
    }

    /// Look up a record by the location [`attach`](Self::attach) returned.
    ///
    /// `None` once the owning turn has been trimmed away.
    pub fn action_mut(&mut self, turn_index: u64, slot: usize) -> Option<&mut ActionRecord> {
        self.turn_mut(turn_index)?.actions.get_mut(slot)
    }

    /// Append reasoning text to the open turn.
    pub fn append_reasoning(&mut self, text: &str) {
        self.open_turn_mut().reasoning_text.push_str(text);
    }

    /// Drop everything; the session identity survives.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.first_index = 0;
    }

    /// Drop oldest closed turns wholesale until at most `max_turns` remain.
    ///
    /// The open turn is never trimmed. Returns the number of turns removed;
    /// absolute turn indices of the survivors are unchanged.
    pub fn trim_to(&mut self, max_turns: usize) -> usize {
        let mut removable = self.turns.len().saturating_sub(max_turns);
        removable = removable.min(self.turns.iter().take_while(|t| t.closed).count());
        if removable > 0 {
            self.turns.drain(..removable);
            self.first_index += removable as u64;
        }
        removable
    }
}
