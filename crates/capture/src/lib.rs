//! Capture pipeline for agent action history.
//!
//! The agent runtime pushes one [`AgentEvent`] at a time into a
//! [`CaptureSession`]; the session correlates tool starts with results,
//! groups everything into turns, and hands owned snapshots to the renderer
//! on its own refresh cadence. Every handler is a short, synchronous,
//! non-failing mutation: capture must never be able to break the chat flow
//! it observes, so anomalies land in diagnostics counters instead of
//! errors.

pub mod categorize;
pub mod event;
pub mod session;

pub use event::{AgentEvent, EventDecodeError, MessageBlock};
pub use session::{CaptureDiagnostics, CaptureSession};
