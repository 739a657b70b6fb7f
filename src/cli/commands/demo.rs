//! Demo command implementation.

use crate::cli::Output;
use crate::concierge::StudyConcierge;
use crate::config::Settings;
use crate::session::{SESSION_EVENTS_KEY, SESSION_SUMMARY_KEY};
use anyhow::Result;
use serde_json::json;

/// Run a scripted study session end to end.
pub async fn run_demo(user: &str, summarize: bool, mut settings: Settings) -> Result<()> {
    if summarize {
        settings.session.summarize_on_end = true;
    }
    let mut concierge = StudyConcierge::new(settings)?;

    Output::header("StudyConcierge demo");

    let session_id = concierge.start_session(user);
    Output::success(&format!("Started session: {}", session_id));

    concierge.remember(
        "notes",
        json!("Machine learning is a method of data analysis that automates analytical model building"),
    );
    concierge.remember(
        "notes",
        json!("Linear regression fits a line; logistic regression predicts a class probability"),
    );
    concierge.remember("quizzes", json!({"topic": "Machine Learning", "questions": 3}));
    Output::success("Saved study notes and a quiz to memory");

    let query = "machine learning regression";
    let hits = concierge.search(query, None);
    Output::success(&format!("Search for '{}' found {} entries", query, hits.len()));
    for hit in &hits {
        Output::search_hit(hit);
    }
    println!();

    let progress = json!({
        "completed_tasks": ["study_plan_created", "content_summarized", "quiz_generated"],
        "current_task": "reviewing_material",
        "study_time_minutes": 45
    });
    concierge.update_progress(progress);
    Output::success("Session progress updated");

    if let Some(session) = concierge.current_session() {
        Output::session(&session);
    }

    let spinner = Output::spinner("Ending session...");
    let ended = concierge.end_session().await;
    spinner.finish_and_clear();

    if ended {
        Output::success("Session ended");
    } else {
        Output::warning("Session was already gone");
    }

    if let Some(summary) = concierge.recall(SESSION_SUMMARY_KEY, Some(1)).first() {
        Output::kv("Summary", summary["summary"].as_str().unwrap_or_default());
    }

    Output::header("History");
    Output::history(&concierge.user_history(user));

    Output::header(&format!(
        "Lifecycle events ({})",
        concierge.recall(SESSION_EVENTS_KEY, Some(usize::MAX)).len()
    ));
    for event in concierge.recall(SESSION_EVENTS_KEY, None) {
        Output::value(&event);
    }

    Ok(())
}
