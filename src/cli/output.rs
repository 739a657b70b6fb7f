//! CLI output formatting utilities.

use crate::memory_bank::SearchHit;
use crate::session::{Session, UserHistory};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print a stored value.
    pub fn value(data: &Value) {
        Self::list_item(&content_preview(&compact(data), 200));
    }

    /// Print a search hit.
    pub fn search_hit(hit: &SearchHit) {
        println!(
            "\n{} {} @ {} (score: {})",
            style(">>").green(),
            style(&hit.key).bold(),
            style(hit.timestamp.format("%Y-%m-%d %H:%M:%S")).cyan(),
            hit.score
        );
        println!("   {}", content_preview(&compact(&hit.data), 200));
    }

    /// Print a session record.
    pub fn session(session: &Session) {
        Output::kv("Session", &session.id);
        Output::kv("User", &session.user_id);
        Output::kv("Created", &session.created_at.to_rfc3339());
        Output::kv("Last accessed", &session.last_accessed.to_rfc3339());
        Output::kv("Data", &content_preview(&compact(&Value::Object(session.data.clone())), 200));
    }

    /// Print a user's study history.
    pub fn history(history: &UserHistory) {
        Output::kv("User", &history.user_id);
        Output::kv("Sessions", &history.sessions_count.to_string());
        Output::kv("Study time", &format_minutes(history.total_study_time));
        if history.completed_tasks.is_empty() {
            Output::kv("Completed tasks", "none");
        } else {
            Output::kv("Completed tasks", &history.completed_tasks.join(", "));
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Format minutes as a human-readable duration.
fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let kept: String = content.chars().take(max_len).collect();
        format!("{}...", kept)
    }
}
