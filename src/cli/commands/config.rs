//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<PathBuf>, settings: Settings) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                Output::warning(&format!("Config already exists at {:?}", config_path));
                Output::info("Use --force to overwrite it.");
            } else {
                settings.save_to(&config_path)?;
                Output::success(&format!("Wrote config to {:?}", config_path));
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_and_respects_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.server.port = 4100;
        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), settings).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().server.port, 4100);

        let mut changed = Settings::default();
        changed.server.port = 4200;
        run_config(&ConfigAction::Init { force: false }, Some(path.clone()), changed.clone()).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().server.port, 4100);

        run_config(&ConfigAction::Init { force: true }, Some(path.clone()), changed).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().server.port, 4200);
    }
}
