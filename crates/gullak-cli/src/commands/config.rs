//! Config command handlers

use anyhow::{bail, Context, Result};

use gullak_core::Config;

use crate::output::{Output, OutputFormat};

use crate::ConfigCommands;

pub fn handle(command: Option<ConfigCommands>, output: &Output) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => show(output),
        Some(ConfigCommands::Set { key, value }) => set(key, value, output),
    }
}

/// Show current configuration
fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "advisor_url": config.advisor_url,
                    "advisor_timeout_secs": config.advisor_timeout_secs,
                    "notifications_enabled": config.notifications_enabled,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:              {}", config.data_dir.display());
            println!(
                "  advisor_url:           {}",
                config.advisor_url.as_deref().unwrap_or("(not set)")
            );
            println!("  advisor_timeout_secs:  {}", config.advisor_timeout_secs);
            println!("  notifications_enabled: {}", config.notifications_enabled);
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "advisor_url" => {
            config.advisor_url = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.clone())
            };
        }
        "advisor_timeout_secs" => {
            config.advisor_timeout_secs = value
                .parse()
                .context("Invalid value for advisor_timeout_secs. Use a number of seconds.")?;
        }
        "notifications_enabled" => {
            config.notifications_enabled = value
                .parse()
                .context("Invalid value for notifications_enabled. Use 'true' or 'false'.")?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, advisor_url, advisor_timeout_secs, notifications_enabled",
                key
            );
        }
    }

    config.save().context("Failed to save configuration")?;
    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}
