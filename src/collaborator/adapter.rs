//! Adapter that maps a backend's named verbs onto [`Summarizer::invoke`].

use super::Summarizer;
use crate::error::{ConciergeError, Result};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Conventional verbs, probed in this order unless overridden.
pub const DEFAULT_VERB_ORDER: [&str; 4] = ["run", "ask", "call", "generate"];

/// A backend entry point: prompt in, JSON value out.
pub type VerbFn = Box<dyn Fn(String) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Probes registered verbs in order and returns the first usable answer.
///
/// A string result is used as-is. `null` is an unrecognized shape and moves on
/// to the next verb, as does an error. Any other JSON value is serialized.
pub struct VerbAdapter {
    name: String,
    verbs: HashMap<String, VerbFn>,
    order: Vec<String>,
}

impl VerbAdapter {
    /// Create an adapter with no verbs and the default probe order.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            verbs: HashMap::new(),
            order: DEFAULT_VERB_ORDER.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Register a verb.
    pub fn with_verb<F, Fut>(mut self, verb: &str, f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Value>> + Send + 'static,
    {
        let boxed: VerbFn = Box::new(move |prompt| Box::pin(f(prompt)));
        self.verbs.insert(verb.to_string(), boxed);
        self
    }

    /// Replace the probe order.
    pub fn with_order(mut self, order: &[&str]) -> Self {
        self.order = order.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Verbs that would actually be tried, in probe order.
    pub fn available_verbs(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|v| self.verbs.contains_key(v.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Interpret a verb's return value as text, if the shape is usable.
fn interpret(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => serde_json::to_string(&other).ok(),
    }
}

#[async_trait]
impl Summarizer for VerbAdapter {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        for verb in &self.order {
            let Some(f) = self.verbs.get(verb) else {
                continue;
            };

            match f(prompt.to_string()).await {
                Ok(value) => match interpret(value) {
                    Some(text) => {
                        debug!("{} answered via '{}'", self.name, verb);
                        return Ok(text);
                    }
                    None => debug!("{} '{}' returned an unrecognized result", self.name, verb),
                },
                Err(e) => debug!("{} '{}' failed: {}", self.name, verb, e),
            }
        }

        Err(ConciergeError::Collaborator(format!(
            "{} has no verb that produced a usable result",
            self.name
        )))
    }
}
