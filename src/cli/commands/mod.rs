//! CLI command implementations.

mod config;
mod demo;
mod serve;
mod shell;

pub use config::run_config;
pub use demo::run_demo;
pub use serve::run_serve;
pub use shell::run_shell;
