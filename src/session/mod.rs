//! Study sessions.
//!
//! [`SessionRegistry`] holds session records. [`SessionManager`] tracks the
//! current session and records lifecycle events in the memory bank.

mod manager;
mod registry;

pub use manager::SessionManager;
pub use registry::SessionRegistry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Memory bank key for lifecycle events.
pub const SESSION_EVENTS_KEY: &str = "session_events";

/// Memory bank key for end-of-session summaries.
pub const SESSION_SUMMARY_KEY: &str = "session_summary";

/// A per-user interaction context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    /// Free-form progress data, shallow-merged on update.
    pub data: Map<String, Value>,
}

impl Session {
    fn new(id: String, user_id: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: user_id.to_string(),
            created_at: now,
            last_accessed: now,
            data: Map::new(),
        }
    }
}

/// Lifecycle event kinds recorded under [`SESSION_EVENTS_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEventKind {
    SessionStarted,
    ProgressUpdated,
    SessionEnded,
}

/// A lifecycle event as stored in the memory bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub event: SessionEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// An end-of-session summary as stored under [`SESSION_SUMMARY_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregated study history for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserHistory {
    pub user_id: String,
    pub sessions_count: usize,
    /// Sum of the latest `study_time_minutes` reported by each session.
    pub total_study_time: u64,
    /// `completed_tasks` from each session's latest progress, first-seen order.
    pub completed_tasks: Vec<String>,
}
