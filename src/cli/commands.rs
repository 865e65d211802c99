//! Subcommand handlers for config actions.

use std::path::{Path, PathBuf};

use super::args::ConfigAction;
use crate::config::{default_path, ConfigError, DEFAULT_CONFIG};
use crate::job::{JobSettings, DEFAULT_DELAY_SECS, DEFAULT_FRAMERATE};

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("(not set)")
}

/// Handle config subcommand actions.
///
/// `config_path` is the `--config` flag, `settings` the flags and file merged.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
    settings: JobSettings,
) -> Result<(), ConfigError> {
    let config_path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            println!("Current configuration:");
            println!("  URL: {}", show(&settings.url));
            println!("  Output name: {}", show(&settings.output));
            println!(
                "  Working directory: {}",
                settings
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  Capture start: {}", show(&settings.start));
            println!("  Capture end: {}", show(&settings.end));
            println!(
                "  Delay: {}s",
                settings.delay.unwrap_or(DEFAULT_DELAY_SECS)
            );
            println!(
                "  Frame rate: {}",
                settings.framerate.unwrap_or(DEFAULT_FRAMERATE)
            );
            println!(
                "  Encoder: {}",
                settings.encoder.as_deref().unwrap_or("default")
            );
            println!("  Bitrate: {}", show(&settings.bitrate));
            println!("  Chroma: {}", show(&settings.chroma));
            println!(
                "  Rotation: {}",
                settings
                    .rotation
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }

            match settings.resolve() {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration problem: {}", e),
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(ConfigError::AlreadyExists { path: config_path });
            }

            let write_err = |source| ConfigError::WriteError {
                path: config_path.clone(),
                source,
            };
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(write_err)?;

            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
