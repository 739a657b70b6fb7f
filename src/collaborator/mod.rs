//! Natural-language collaborators.
//!
//! The session manager only ever sees the [`Summarizer`] capability. Backends
//! with their own calling conventions are wrapped in a [`VerbAdapter`], which
//! keeps all method probing out of the core.

mod adapter;
mod extractive;

pub use adapter::{VerbAdapter, VerbFn, DEFAULT_VERB_ORDER};
pub use extractive::ExtractiveSummarizer;

use crate::error::Result;
use async_trait::async_trait;

/// A pluggable free-text backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Turn a prompt into text. Errors mean "no result available".
    async fn invoke(&self, prompt: &str) -> Result<String>;
}
