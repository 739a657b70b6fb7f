//! Interactive shell over an in-memory concierge.

use crate::cli::Output;
use crate::concierge::StudyConcierge;
use crate::config::Settings;
use crate::error::{ConciergeError, Result};
use console::style;
use serde_json::Value;
use std::io::{self, BufRead, Write};

const HELP: &str = "Commands:
  save <key> <json|text>   append a value under key
  get <key> [limit]        newest values under key
  search <query...>        keyword search across all keys
  delete <key>             remove every value under key
  keys                     list keys
  clear                    remove everything
  start <user>             start a session and make it current
  progress <json>          record progress on the current session
  session                  show the current session
  history <user>           aggregated history for a user
  end                      end the current session
  help                     show this help
  exit                     leave the shell";

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
enum ShellCommand {
    Save { key: String, data: Value },
    Get { key: String, limit: Option<usize> },
    Search { query: String },
    Delete { key: String },
    Keys,
    Clear,
    Start { user: String },
    Progress { data: Value },
    Session,
    History { user: String },
    End,
    Help,
    Exit,
}

/// Parse a value argument: JSON if it parses, otherwise the raw text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_line(line: &str) -> Result<ShellCommand> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let require = |what: &str| -> Result<String> {
        if rest.is_empty() {
            Err(ConciergeError::InvalidInput(format!("'{}' needs {}", command, what)))
        } else {
            Ok(rest.to_string())
        }
    };

    let parsed = match command.to_lowercase().as_str() {
        "save" => {
            let rest = require("a key and a value")?;
            let (key, raw) = rest.split_once(char::is_whitespace).ok_or_else(|| {
                ConciergeError::InvalidInput("'save' needs a key and a value".to_string())
            })?;
            ShellCommand::Save {
                key: key.to_string(),
                data: parse_value(raw.trim()),
            }
        }
        "get" => {
            let rest = require("a key")?;
            let mut parts = rest.split_whitespace();
            let key = parts.next().unwrap_or_default().to_string();
            let limit = match parts.next() {
                Some(n) => Some(n.parse::<usize>().map_err(|_| {
                    ConciergeError::InvalidInput(format!("'{}' is not a valid limit", n))
                })?),
                None => None,
            };
            ShellCommand::Get { key, limit }
        }
        "search" => ShellCommand::Search {
            query: require("a query")?,
        },
        "delete" => ShellCommand::Delete {
            key: require("a key")?,
        },
        "keys" => ShellCommand::Keys,
        "clear" => ShellCommand::Clear,
        "start" => ShellCommand::Start {
            user: require("a user id")?,
        },
        "progress" => {
            let raw = require("progress data")?;
            ShellCommand::Progress {
                data: parse_value(&raw),
            }
        }
        "session" => ShellCommand::Session,
        "history" => ShellCommand::History {
            user: require("a user id")?,
        },
        "end" => ShellCommand::End,
        "help" | "?" => ShellCommand::Help,
        "exit" | "quit" => ShellCommand::Exit,
        other => {
            return Err(ConciergeError::InvalidInput(format!(
                "unknown command '{}', try 'help'",
                other
            )))
        }
    };

    Ok(parsed)
}

/// Execute one command. Returns false when the shell should exit.
async fn execute(concierge: &mut StudyConcierge, command: ShellCommand) -> bool {
    match command {
        ShellCommand::Save { key, data } => {
            let entry = concierge.remember(&key, data);
            Output::success(&format!("Saved under '{}' at {}", key, entry.timestamp.to_rfc3339()));
        }
        ShellCommand::Get { key, limit } => {
            let values = concierge.recall(&key, limit);
            if values.is_empty() {
                Output::info(&format!("Nothing stored under '{}'", key));
            }
            for value in &values {
                Output::value(value);
            }
        }
        ShellCommand::Search { query } => {
            let hits = concierge.search(&query, None);
            if hits.is_empty() {
                Output::warning("No results found matching your query.");
            }
            for hit in &hits {
                Output::search_hit(hit);
            }
        }
        ShellCommand::Delete { key } => {
            if concierge.forget(&key) {
                Output::success(&format!("Deleted '{}'", key));
            } else {
                Output::warning(&format!("No key '{}'", key));
            }
        }
        ShellCommand::Keys => {
            let keys = concierge.keys();
            if keys.is_empty() {
                Output::info("Memory is empty.");
            }
            for key in keys {
                Output::list_item(&key);
            }
        }
        ShellCommand::Clear => {
            concierge.clear_memory();
            Output::success("Memory cleared.");
        }
        ShellCommand::Start { user } => {
            let id = concierge.start_session(&user);
            Output::success(&format!("Started session: {}", id));
        }
        ShellCommand::Progress { data } => {
            if concierge.update_progress(data) {
                Output::success("Progress recorded.");
            } else {
                Output::warning("No active session. Use 'start <user>' first.");
            }
        }
        ShellCommand::Session => match concierge.current_session() {
            Some(session) => Output::session(&session),
            None => Output::info("No active session."),
        },
        ShellCommand::History { user } => Output::history(&concierge.user_history(&user)),
        ShellCommand::End => {
            if concierge.end_session().await {
                Output::success("Session ended.");
            } else {
                Output::warning("No active session to end.");
            }
        }
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Exit => return false,
    }
    true
}

/// Run the interactive shell.
pub async fn run_shell(settings: Settings) -> anyhow::Result<()> {
    let mut concierge = StudyConcierge::new(settings)?;

    println!("\n{}", style("StudyConcierge Shell").bold().cyan());
    println!(
        "{}\n",
        style("Type 'help' for commands, or 'exit' to quit. Memory lives until you exit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("study>").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        if input.trim().is_empty() {
            continue;
        }

        match parse_line(&input) {
            Ok(command) => {
                if !execute(&mut concierge, command).await {
                    break;
                }
            }
            Err(e) => Output::error(&e.to_string()),
        }
    }

    if concierge.sessions().current_session_id().is_some() {
        concierge.end_session().await;
    }
    Output::info("Goodbye!");
    Ok(())
}
