//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use cancionero_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "root": config.root,
                    "remote": config.remote,
                    "branch": config.branch,
                    "git_path": config.git_path,
                    "git_timeout_secs": config.git_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            if let Some(root) = &config.root {
                println!("{}", root.display());
            }
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  root:             {}", display_or_unset(&config.root));
            println!("  remote:           {}", config.remote);
            println!("  branch:           {}", config.branch);
            println!("  git_path:         {}", display_or_unset(&config.git_path));
            println!("  git_timeout_secs: {}", config.git_timeout_secs);
            println!("  log_file:         {}", display_or_unset(&config.log_file));
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "root" => config.root = optional_path(value),
        "remote" => config.remote = required(key, value)?,
        "branch" => config.branch = required(key, value)?,
        "git_path" => config.git_path = optional_path(value),
        "git_timeout_secs" => {
            config.git_timeout_secs = value
                .parse()
                .context("Invalid value for git_timeout_secs. Use a whole number of seconds.")?;
        }
        "log_file" => config.log_file = optional_path(value),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: root, remote, branch, git_path, git_timeout_secs, log_file",
                key
            );
        }
    }
    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn required(key: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        bail!("{} cannot be empty", key);
    }
    Ok(value.trim().to_string())
}

fn display_or_unset(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not set)".to_string())
}
