//! StudyConcierge - study sessions backed by a timestamped memory bank
//!
//! The core of a multi-agent study assistant: an append-only memory bank and
//! a session registry with a lifecycle on top of it.
//!
//! # Architecture
//!
//! - `memory_bank` - Append-only timestamped key/value store with keyword search
//! - `session` - Session registry, current-session manager and user history
//! - `collaborator` - Pluggable summarizer capability and backend adapters
//! - `concierge` - Facade wiring everything together from settings
//! - `config` - Settings and prompt templates
//! - `cli` - Command line interface, interactive shell and HTTP server
//!
//! # Example
//!
//! ```rust,no_run
//! use serde_json::json;
//! use studyconcierge::concierge::StudyConcierge;
//! use studyconcierge::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut concierge = StudyConcierge::new(Settings::default())?;
//!
//!     let session_id = concierge.start_session("student_123");
//!     concierge.remember("quizzes", json!({"topic": "ML"}));
//!     concierge.update_progress(json!({"study_time_minutes": 45}));
//!     concierge.end_session().await;
//!
//!     println!("{} -> {:?}", session_id, concierge.recall("quizzes", None));
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod collaborator;
pub mod concierge;
pub mod config;
pub mod error;
pub mod memory_bank;
pub mod session;

pub use error::{ConciergeError, Result};
