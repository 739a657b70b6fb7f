//! Session manager: current-session tracking and lifecycle events.

use super::{
    Session, SessionEvent, SessionEventKind, SessionRegistry, SessionSummary, UserHistory,
    SESSION_EVENTS_KEY, SESSION_SUMMARY_KEY,
};
use crate::collaborator::Summarizer;
use crate::config::Prompts;
use crate::memory_bank::MemoryBank;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default cap on the session JSON embedded in a summary prompt.
const DEFAULT_PROMPT_DATA_LIMIT: usize = 2000;

/// Tracks one current session on top of a [`SessionRegistry`].
///
/// The memory bank and summarizer are both optional. Without a memory bank no
/// events are recorded; without a summarizer sessions end without a summary.
pub struct SessionManager {
    registry: SessionRegistry,
    memory: Option<MemoryBank>,
    summarizer: Option<Arc<dyn Summarizer>>,
    prompts: Prompts,
    current: Option<String>,
    record_events: bool,
    prompt_data_limit: usize,
}

impl SessionManager {
    /// Create a manager over `registry` with no memory bank or summarizer.
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            registry,
            memory: None,
            summarizer: None,
            prompts: Prompts::default(),
            current: None,
            record_events: true,
            prompt_data_limit: DEFAULT_PROMPT_DATA_LIMIT,
        }
    }

    /// Attach a memory bank for lifecycle events and history.
    pub fn with_memory(mut self, memory: MemoryBank) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach a summarizer consulted when a session ends.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Enable or disable lifecycle event recording.
    pub fn with_event_recording(mut self, enabled: bool) -> Self {
        self.record_events = enabled;
        self
    }

    /// Cap the session JSON embedded in the summary prompt.
    pub fn with_prompt_data_limit(mut self, limit: usize) -> Self {
        self.prompt_data_limit = limit;
        self
    }

    pub fn memory(&self) -> Option<&MemoryBank> {
        self.memory.as_ref()
    }

    /// The attached memory bank, attaching an empty one if there is none.
    pub fn memory_or_attach(&mut self) -> &mut MemoryBank {
        self.memory.get_or_insert_with(MemoryBank::new)
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Start a session for `user_id` and make it current.
    ///
    /// Sessions started earlier stay in the registry.
    pub fn start_session(&mut self, user_id: &str) -> String {
        info!("Starting new session for user: {}", user_id);
        let session_id = self.registry.create_session(user_id);
        self.current = Some(session_id.clone());

        self.record(SessionEvent {
            session_id: session_id.clone(),
            user_id: Some(user_id.to_string()),
            event: SessionEventKind::SessionStarted,
            data: None,
            timestamp: Utc::now(),
        });

        session_id
    }

    /// The current session, if any. Refreshes its `last_accessed` time.
    pub fn session_data(&mut self) -> Option<Session> {
        let id = self.current.as_deref()?;
        self.registry.get_session(id).cloned()
    }

    /// Store `progress` on the current session.
    pub fn update_session_progress(&mut self, progress: Value) -> bool {
        let Some(session_id) = self.current.clone() else {
            warn!("No active session to update");
            return false;
        };

        info!("Updating session progress");

        let mut partial = Map::new();
        partial.insert("progress".to_string(), progress.clone());
        partial.insert("last_updated".to_string(), json!(Utc::now()));

        let success = self.registry.update_session(&session_id, partial);
        if success {
            self.record(SessionEvent {
                session_id,
                user_id: None,
                event: SessionEventKind::ProgressUpdated,
                data: Some(progress),
                timestamp: Utc::now(),
            });
        }

        success
    }

    /// End the current session.
    ///
    /// A summary is requested first when a summarizer is attached. Failing to
    /// get one never stops the session from ending.
    pub async fn end_session(&mut self) -> bool {
        let Some(session_id) = self.current.clone() else {
            warn!("No active session to end");
            return false;
        };

        info!("Ending session: {}", session_id);

        let summary = match self.summarizer.clone() {
            Some(summarizer) => match self.summary_prompt(&session_id) {
                Some(prompt) => request_summary(summarizer.as_ref(), &prompt).await,
                None => None,
            },
            None => None,
        };

        self.record(SessionEvent {
            session_id: session_id.clone(),
            user_id: None,
            event: SessionEventKind::SessionEnded,
            data: None,
            timestamp: Utc::now(),
        });

        if let Some(summary) = summary {
            if let Some(memory) = self.memory.as_mut() {
                let record = SessionSummary {
                    session_id: session_id.clone(),
                    summary,
                    timestamp: Utc::now(),
                };
                if let Some(value) = to_value(&record) {
                    memory.save(SESSION_SUMMARY_KEY, value);
                }
            }
        }

        let success = self.registry.delete_session(&session_id);
        self.current = None;
        success
    }

    fn summary_prompt(&mut self, session_id: &str) -> Option<String> {
        let session = self.registry.get_session(session_id)?;
        let session_json = serde_json::to_string(session).ok()?;
        let truncated: String = session_json.chars().take(self.prompt_data_limit).collect();

        let mut vars = HashMap::new();
        vars.insert("session_json".to_string(), truncated);
        Some(self.prompts.render_with_custom(&self.prompts.session.summary, &vars))
    }

    /// Aggregate a user's history from recorded lifecycle events.
    pub fn user_history(&self, user_id: &str) -> UserHistory {
        info!("Retrieving history for user: {}", user_id);

        let mut history = UserHistory {
            user_id: user_id.to_string(),
            ..Default::default()
        };

        let Some(memory) = self.memory.as_ref() else {
            return history;
        };

        let events: Vec<SessionEvent> = memory
            .entries(SESSION_EVENTS_KEY)
            .iter()
            .filter_map(|e| serde_json::from_value(e.data.clone()).ok())
            .collect();

        let sessions: Vec<&str> = events
            .iter()
            .filter(|e| {
                e.event == SessionEventKind::SessionStarted
                    && e.user_id.as_deref() == Some(user_id)
            })
            .map(|e| e.session_id.as_str())
            .collect();
        history.sessions_count = sessions.len();

        let mut latest_progress: HashMap<&str, &Value> = HashMap::new();
        for event in &events {
            if event.event == SessionEventKind::ProgressUpdated {
                if let Some(data) = &event.data {
                    latest_progress.insert(event.session_id.as_str(), data);
                }
            }
        }

        let mut seen = HashSet::new();
        for session_id in sessions {
            let Some(progress) = latest_progress.get(session_id) else {
                continue;
            };
            if let Some(minutes) = progress.get("study_time_minutes").and_then(Value::as_u64) {
                history.total_study_time = history.total_study_time.saturating_add(minutes);
            }
            let tasks = progress
                .get("completed_tasks")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
                .filter_map(Value::as_str);
            for task in tasks {
                if seen.insert(task.to_string()) {
                    history.completed_tasks.push(task.to_string());
                }
            }
        }

        history
    }

    fn record(&mut self, event: SessionEvent) {
        if !self.record_events {
            return;
        }
        let Some(memory) = self.memory.as_mut() else {
            return;
        };
        if let Some(value) = to_value(&event) {
            memory.save(SESSION_EVENTS_KEY, value);
        }
    }
}

fn to_value<T: Serialize>(record: &T) -> Option<Value> {
    match serde_json::to_value(record) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to serialize session record: {}", e);
            None
        }
    }
}

#[instrument(skip_all)]
async fn request_summary(summarizer: &dyn Summarizer, prompt: &str) -> Option<String> {
    match summarizer.invoke(prompt).await {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            debug!("Session summary was empty");
            None
        }
        Err(e) => {
            debug!("Session summary failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{ExtractiveSummarizer, VerbAdapter};
    use crate::error::ConciergeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager_with_memory() -> SessionManager {
        SessionManager::new(SessionRegistry::new()).with_memory(MemoryBank::new())
    }

    fn events(manager: &SessionManager) -> Vec<SessionEvent> {
        manager
            .memory()
            .unwrap()
            .entries(SESSION_EVENTS_KEY)
            .iter()
            .map(|e| serde_json::from_value(e.data.clone()).unwrap())
            .collect()
    }

    struct FailingSummarizer {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn invoke(&self, _prompt: &str) -> crate::error::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ConciergeError::Collaborator("offline".to_string()))
        }
    }

    #[test]
    fn test_start_session_sets_current_and_records_event() {
        let mut manager = manager_with_memory();
        let id = manager.start_session("student_1");

        assert_eq!(manager.current_session_id(), Some(id.as_str()));
        let session = manager.session_data().unwrap();
        assert_eq!(session.user_id, "student_1");

        let events = events(&manager);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, SessionEventKind::SessionStarted);
        assert_eq!(events[0].user_id.as_deref(), Some("student_1"));
        assert_eq!(events[0].session_id, id);
    }

    #[test]
    fn test_update_without_session() {
        let mut manager = manager_with_memory();
        assert!(!manager.update_session_progress(json!({"status": "x"})));
        assert!(manager.session_data().is_none());
        assert!(manager.memory().unwrap().is_empty());
    }

    #[test]
    fn test_update_progress_merges_and_records() {
        let mut manager = manager_with_memory();
        manager.start_session("u1");

        assert!(manager.update_session_progress(json!({"current_task": "reading"})));
        let session = manager.session_data().unwrap();
        assert_eq!(session.data["progress"], json!({"current_task": "reading"}));
        assert!(session.data.contains_key("last_updated"));

        let events = events(&manager);
        assert_eq!(events[1].event, SessionEventKind::ProgressUpdated);
        assert_eq!(events[1].data, Some(json!({"current_task": "reading"})));
    }

    #[test]
    fn test_events_disabled() {
        let mut manager = manager_with_memory().with_event_recording(false);
        manager.start_session("u1");
        manager.update_session_progress(json!({}));
        assert!(manager.memory().unwrap().is_empty());
    }

    #[test]
    fn test_new_session_replaces_current_only() {
        let mut manager = SessionManager::new(SessionRegistry::new());
        let first = manager.start_session("u1");
        let second = manager.start_session("u2");

        assert_ne!(first, second);
        assert_eq!(manager.current_session_id(), Some(second.as_str()));
        assert_eq!(manager.registry().len(), 2);
    }

    #[tokio::test]
    async fn test_end_session_without_collaborator() {
        let mut manager = manager_with_memory();
        let id = manager.start_session("u1");

        assert!(manager.end_session().await);
        assert!(manager.current_session_id().is_none());
        assert!(manager.registry().is_empty());

        let events = events(&manager);
        assert_eq!(events.last().unwrap().event, SessionEventKind::SessionEnded);
        assert_eq!(events.last().unwrap().session_id, id);
        assert!(manager.memory().unwrap().retrieve(SESSION_SUMMARY_KEY, 10).is_empty());
    }

    #[tokio::test]
    async fn test_end_session_twice() {
        let mut manager = manager_with_memory();
        manager.start_session("u1");
        assert!(manager.end_session().await);
        assert!(!manager.end_session().await);
    }

    #[tokio::test]
    async fn test_failing_collaborator_is_swallowed() {
        let summarizer = Arc::new(FailingSummarizer {
            calls: AtomicUsize::new(0),
        });
        let mut manager = manager_with_memory().with_summarizer(summarizer.clone());
        manager.start_session("u1");

        assert!(manager.end_session().await);
        assert_eq!(summarizer.calls.load(Ordering::SeqCst), 1);
        assert!(manager.memory().unwrap().retrieve(SESSION_SUMMARY_KEY, 10).is_empty());
    }

    #[tokio::test]
    async fn test_summary_is_stored() {
        let adapter = VerbAdapter::new("stub")
            .with_verb("ask", |prompt: String| async move {
                assert!(prompt.contains("\"user_id\":\"u1\""));
                Ok(json!("Great progress on regression."))
            });
        let mut manager = manager_with_memory().with_summarizer(Arc::new(adapter));
        let id = manager.start_session("u1");

        assert!(manager.end_session().await);

        let summaries = manager.memory().unwrap().retrieve(SESSION_SUMMARY_KEY, 10);
        assert_eq!(summaries.len(), 1);
        let summary: SessionSummary = serde_json::from_value(summaries[0].clone()).unwrap();
        assert_eq!(summary.session_id, id);
        assert_eq!(summary.summary, "Great progress on regression.");
    }

    #[tokio::test]
    async fn test_summary_prompt_is_truncated() {
        let adapter = VerbAdapter::new("echo")
            .with_verb("run", |prompt: String| async move { Ok(json!(prompt)) });
        let mut manager = manager_with_memory()
            .with_summarizer(Arc::new(adapter))
            .with_prompt_data_limit(5);
        manager.start_session("u1");
        manager.update_session_progress(json!({"notes": "x".repeat(100)}));

        assert!(manager.end_session().await);
        let stored = manager.memory().unwrap().retrieve(SESSION_SUMMARY_KEY, 1);
        let summary = stored[0]["summary"].as_str().unwrap();
        assert!(summary.contains("Session Data JSON: {\"id\"\n"));
    }

    #[tokio::test]
    async fn test_extractive_summary() {
        let mut manager =
            manager_with_memory().with_summarizer(Arc::new(ExtractiveSummarizer::new(500)));
        manager.start_session("u1");
        manager.update_session_progress(json!({
            "completed_tasks": ["quiz"],
            "study_time_minutes": 45
        }));
        assert!(manager.end_session().await);

        let stored = manager.memory().unwrap().retrieve(SESSION_SUMMARY_KEY, 10);
        assert_eq!(stored.len(), 1);
        let summary = stored[0]["summary"].as_str().unwrap();
        assert!(!summary.contains("Summarize the following"));
        assert!(!summary.contains("Session Data JSON"));
        assert!(summary.contains("Studied for 45 minutes."));
        assert!(summary.contains("Completed tasks: quiz."));
    }

    #[tokio::test]
    async fn test_history_study_time_saturates() {
        let mut manager = manager_with_memory();

        manager.start_session("u1");
        manager.update_session_progress(json!({"study_time_minutes": u64::MAX}));
        manager.end_session().await;

        manager.start_session("u1");
        manager.update_session_progress(json!({"study_time_minutes": 1}));
        manager.end_session().await;

        let history = manager.user_history("u1");
        assert_eq!(history.sessions_count, 2);
        assert_eq!(history.total_study_time, u64::MAX);
    }

    #[tokio::test]
    async fn test_user_history() {
        let mut manager = manager_with_memory();

        manager.start_session("alice");
        manager.update_session_progress(json!({
            "completed_tasks": ["plan"],
            "study_time_minutes": 10
        }));
        manager.update_session_progress(json!({
            "completed_tasks": ["plan", "quiz"],
            "study_time_minutes": 45
        }));
        manager.end_session().await;

        manager.start_session("bob");
        manager.update_session_progress(json!({"study_time_minutes": 99}));
        manager.end_session().await;

        manager.start_session("alice");
        manager.update_session_progress(json!({
            "completed_tasks": ["review", "quiz"],
            "study_time_minutes": 15
        }));

        let history = manager.user_history("alice");
        assert_eq!(history.sessions_count, 2);
        assert_eq!(history.total_study_time, 60);
        assert_eq!(history.completed_tasks, vec!["plan", "quiz", "review"]);

        let bob = manager.user_history("bob");
        assert_eq!(bob.sessions_count, 1);
        assert_eq!(bob.total_study_time, 99);

        assert_eq!(manager.user_history("carol").sessions_count, 0);
    }

    #[test]
    fn test_history_without_memory() {
        let mut manager = SessionManager::new(SessionRegistry::new());
        manager.start_session("alice");
        let history = manager.user_history("alice");
        assert_eq!(history.sessions_count, 0);
        assert_eq!(history.user_id, "alice");
    }
}
