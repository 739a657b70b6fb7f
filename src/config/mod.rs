//! Configuration module for StudyConcierge.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SessionPrompts};
pub use settings::{
    GeneralSettings, MemorySettings, PromptSettings, ServerSettings, SessionSettings, Settings,
};
