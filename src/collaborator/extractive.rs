//! Local summarizer for session payloads.

use super::Summarizer;
use crate::error::{ConciergeError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Progress fields already covered by a dedicated recap sentence, or noise.
const RECAP_SKIPPED_FIELDS: &[&str] = &[
    "study_time_minutes",
    "completed_tasks",
    "status",
    "timestamp",
    "last_updated",
];

/// Summarizes the payload of a prompt without any backend.
///
/// Instruction text before the first JSON object is ignored. A session
/// payload is turned into a short recap of its progress; anything else gets
/// the first and last sentence. It is the default collaborator when session
/// summaries are enabled.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    max_chars: usize,
}

impl ExtractiveSummarizer {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Apply the heuristic synchronously.
    pub fn summarize(&self, text: &str) -> String {
        let text = text.trim();
        let sentences: Vec<&str> = text
            .split(". ")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        let summary = if sentences.len() <= 3 {
            sentences.join(". ")
        } else {
            format!("{}. {}", sentences[0], sentences[sentences.len() - 1])
        };
        let summary = if summary.is_empty() || summary.ends_with('.') {
            summary
        } else {
            format!("{}.", summary)
        };

        truncate_chars(&summary, self.max_chars)
    }
}

/// Parse the first JSON value embedded in a prompt.
fn embedded_json(prompt: &str) -> Option<Value> {
    let start = prompt.find('{')?;
    serde_json::Deserializer::from_str(&prompt[start..])
        .into_iter::<Value>()
        .next()?
        .ok()
}

/// Build a sentence recap from a serialized session (or a bare progress map).
fn recap(payload: &Value) -> Option<String> {
    let object = payload.as_object()?;
    let mut sentences = Vec::new();

    if let (Some(id), Some(user)) = (
        object.get("id").and_then(Value::as_str),
        object.get("user_id").and_then(Value::as_str),
    ) {
        sentences.push(format!("Session {} for {}.", id, user));
    }

    let progress = match object.get("data") {
        Some(data) => data.get("progress").and_then(Value::as_object),
        None => Some(object),
    };

    let Some(progress) = progress else {
        sentences.push("No progress was recorded.".to_string());
        return Some(sentences.join(" "));
    };

    if let Some(status) = progress.get("status").and_then(Value::as_str) {
        sentences.push(format!("Status: {}.", status.replace('_', " ")));
    }
    if let Some(minutes) = progress.get("study_time_minutes").and_then(Value::as_u64) {
        sentences.push(format!("Studied for {} minutes.", minutes));
    }
    let tasks: Vec<&str> = progress
        .get("completed_tasks")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .collect();
    if !tasks.is_empty() {
        sentences.push(format!("Completed tasks: {}.", tasks.join(", ")));
    }

    for (key, value) in progress {
        if RECAP_SKIPPED_FIELDS.contains(&key.as_str()) {
            continue;
        }
        let rendered = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => continue,
        };
        sentences.push(format!("{}: {}.", key.replace('_', " "), rendered));
    }

    if sentences.is_empty() {
        return None;
    }
    Some(sentences.join(" "))
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new(300)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let summary = match embedded_json(prompt).as_ref().and_then(recap) {
            Some(text) => truncate_chars(&text, self.max_chars),
            // Truncated or absent JSON: summarize the payload text only.
            None => self.summarize(prompt.find('{').map_or(prompt, |i| &prompt[i..])),
        };
        if summary.is_empty() {
            return Err(ConciergeError::Collaborator("nothing to summarize".to_string()));
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_kept_whole() {
        let s = ExtractiveSummarizer::new(500);
        assert_eq!(s.summarize("One. Two. Three"), "One. Two. Three.");
    }

    #[test]
    fn test_long_text_first_and_last() {
        let s = ExtractiveSummarizer::new(500);
        let text = "First point. Second point. Third point. Final point.";
        assert_eq!(s.summarize(text), "First point. Final point.");
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        let s = ExtractiveSummarizer::new(10);
        let summary = s.summarize("Überblick über maschinelles Lernen");
        assert!(summary.ends_with("..."));
        assert!(summary.chars().count() <= 10);
    }

    #[tokio::test]
    async fn test_empty_prompt_is_unavailable() {
        let s = ExtractiveSummarizer::default();
        assert!(s.invoke("   ").await.is_err());
        assert_eq!(s.invoke("Progress was good").await.unwrap(), "Progress was good.");
    }

    #[tokio::test]
    async fn test_session_prompt_recaps_progress_only() {
        let s = ExtractiveSummarizer::default();
        let prompt = "Summarize the following session data. Highlight next steps.\n\
            Session Data JSON: {\"id\":\"session_u1_1\",\"user_id\":\"u1\",\
            \"data\":{\"progress\":{\"status\":\"in_progress\",\"topic\":\"ML\",\
            \"completed_tasks\":[\"plan\",\"quiz\"],\"study_time_minutes\":45}}}\n";

        let summary = s.invoke(prompt).await.unwrap();
        assert_eq!(
            summary,
            "Session session_u1_1 for u1. Status: in progress. Studied for 45 minutes. \
             Completed tasks: plan, quiz. topic: ML."
        );
    }

    #[tokio::test]
    async fn test_session_without_progress() {
        let s = ExtractiveSummarizer::default();
        let prompt = "Recap: {\"id\":\"session_u1_1\",\"user_id\":\"u1\",\"data\":{}}";
        assert_eq!(
            s.invoke(prompt).await.unwrap(),
            "Session session_u1_1 for u1. No progress was recorded."
        );
    }

    #[tokio::test]
    async fn test_truncated_json_skips_instructions() {
        let s = ExtractiveSummarizer::default();
        let summary = s
            .invoke("Summarize this. Be brief.\nSession Data JSON: {\"id\"")
            .await
            .unwrap();
        assert!(!summary.contains("Summarize"));
        assert!(summary.starts_with("{\"id\""));
    }
}
