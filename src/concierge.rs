//! StudyConcierge facade.
//!
//! Wires the memory bank, session manager and optional summarizer together
//! from [`Settings`].

use crate::collaborator::{ExtractiveSummarizer, Summarizer};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::memory_bank::{MemoryBank, SearchHit, StoreEntry};
use crate::session::{Session, SessionManager, SessionRegistry, UserHistory};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// The study assistant core: one memory bank and one session manager.
pub struct StudyConcierge {
    settings: Settings,
    sessions: SessionManager,
}

impl StudyConcierge {
    /// Create a concierge from settings.
    ///
    /// An [`ExtractiveSummarizer`] is attached when `session.summarize_on_end`
    /// is set.
    pub fn new(settings: Settings) -> Result<Self> {
        let summarizer: Option<Arc<dyn Summarizer>> = if settings.session.summarize_on_end {
            Some(Arc::new(ExtractiveSummarizer::new(
                settings.session.summary_max_chars,
            )))
        } else {
            None
        };
        Self::with_summarizer(settings, summarizer)
    }

    /// Create a concierge with a caller-supplied summarizer (or none).
    pub fn with_summarizer(
        settings: Settings,
        summarizer: Option<Arc<dyn Summarizer>>,
    ) -> Result<Self> {
        info!("Initializing StudyConcierge");

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let mut sessions = SessionManager::new(SessionRegistry::new())
            .with_memory(MemoryBank::new())
            .with_prompts(prompts)
            .with_event_recording(settings.session.record_events)
            .with_prompt_data_limit(settings.session.prompt_data_limit);

        if let Some(summarizer) = summarizer {
            sessions = sessions.with_summarizer(summarizer);
        }

        Ok(Self { settings, sessions })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    fn memory_mut(&mut self) -> &mut MemoryBank {
        self.sessions.memory_or_attach()
    }

    /// Start a session and record its initial progress.
    #[instrument(skip(self))]
    pub fn start_session(&mut self, user_id: &str) -> String {
        let session_id = self.sessions.start_session(user_id);
        self.sessions.update_session_progress(json!({
            "status": "session_started",
            "timestamp": Utc::now(),
        }));
        session_id
    }

    pub fn current_session(&mut self) -> Option<Session> {
        self.sessions.session_data()
    }

    pub fn update_progress(&mut self, progress: Value) -> bool {
        self.sessions.update_session_progress(progress)
    }

    pub async fn end_session(&mut self) -> bool {
        self.sessions.end_session().await
    }

    pub fn user_history(&self, user_id: &str) -> UserHistory {
        self.sessions.user_history(user_id)
    }

    /// Append a value to the memory bank.
    pub fn remember(&mut self, key: &str, data: Value) -> StoreEntry {
        self.memory_mut().save(key, data).clone()
    }

    /// Most recent values under `key`, newest first.
    pub fn recall(&self, key: &str, limit: Option<usize>) -> Vec<Value> {
        let limit = limit.unwrap_or(self.settings.memory.retrieve_limit);
        self.sessions
            .memory()
            .map(|m| m.retrieve(key, limit))
            .unwrap_or_default()
    }

    pub fn search(&self, query: &str, top_k: Option<usize>) -> Vec<SearchHit> {
        let top_k = top_k.unwrap_or(self.settings.memory.search_top_k);
        self.sessions
            .memory()
            .map(|m| m.search(query, top_k))
            .unwrap_or_default()
    }

    pub fn forget(&mut self, key: &str) -> bool {
        self.memory_mut().delete(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.sessions
            .memory()
            .map(MemoryBank::get_all_keys)
            .unwrap_or_default()
    }

    pub fn clear_memory(&mut self) {
        self.memory_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SESSION_EVENTS_KEY;

    fn concierge() -> StudyConcierge {
        StudyConcierge::new(Settings::default()).unwrap()
    }

    #[test]
    fn test_start_session_records_initial_progress() {
        let mut concierge = concierge();
        let id = concierge.start_session("student_123");

        let session = concierge.current_session().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.data["progress"]["status"], json!("session_started"));
        assert_eq!(concierge.recall(SESSION_EVENTS_KEY, None).len(), 2);
    }

    #[test]
    fn test_memory_operations_use_configured_defaults() {
        let mut settings = Settings::default();
        settings.memory.retrieve_limit = 2;
        settings.memory.search_top_k = 1;
        let mut concierge = StudyConcierge::new(settings).unwrap();

        for topic in ["ML", "AI", "Stats"] {
            concierge.remember("quizzes", json!({"topic": topic, "kind": "quiz"}));
        }

        assert_eq!(
            concierge.recall("quizzes", None),
            vec![json!({"topic": "Stats", "kind": "quiz"}), json!({"topic": "AI", "kind": "quiz"})]
        );
        assert_eq!(concierge.recall("quizzes", Some(10)).len(), 3);
        assert_eq!(concierge.search("quiz", None).len(), 1);
        assert_eq!(concierge.search("quiz", Some(5)).len(), 3);

        assert_eq!(concierge.keys(), vec!["quizzes".to_string()]);
        assert!(concierge.forget("quizzes"));
        assert!(!concierge.forget("quizzes"));
    }

    #[tokio::test]
    async fn test_summarize_on_end() {
        let mut settings = Settings::default();
        settings.session.summarize_on_end = true;
        let mut concierge = StudyConcierge::new(settings).unwrap();

        concierge.start_session("u1");
        concierge.update_progress(json!({
            "completed_tasks": ["quiz"],
            "study_time_minutes": 45
        }));
        assert!(concierge.end_session().await);

        let stored = concierge.recall("session_summary", None);
        assert_eq!(stored.len(), 1);
        let summary = stored[0]["summary"].as_str().unwrap();
        assert!(!summary.contains("Summarize the following"));
        assert!(summary.ends_with("Studied for 45 minutes. Completed tasks: quiz."));
        assert!(concierge.current_session().is_none());
    }

    #[tokio::test]
    async fn test_full_lifecycle_history() {
        let mut concierge = concierge();
        concierge.start_session("u1");
        concierge.update_progress(json!({
            "completed_tasks": ["study_plan_created"],
            "study_time_minutes": 45
        }));
        assert!(concierge.end_session().await);

        let history = concierge.user_history("u1");
        assert_eq!(history.sessions_count, 1);
        assert_eq!(history.total_study_time, 45);

        concierge.clear_memory();
        assert!(concierge.keys().is_empty());
    }
}
