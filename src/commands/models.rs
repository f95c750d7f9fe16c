//! Model listing command for Sofi Chat
//!
//! This module provides the one-shot `models` command, which prints the
//! models the backend can route questions to as a table or as JSON.

use crate::backend::{ChatBackend, HttpBackend, ModelDescriptor};
use crate::config::Config;
use crate::error::{Result, SofiError};
use prettytable::{cell, row, Table};

/// List the models reported by the backend
///
/// # Arguments
///
/// * `config` - Configuration containing backend settings
/// * `json` - Print JSON instead of a table
///
/// # Returns
///
/// Returns Ok(()) on success, error if the backend is unreachable or the
/// response cannot be used
///
/// # Examples
///
/// ```no_run
/// use sofi_chat::config::Config;
/// use sofi_chat::commands::models::list_models;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load("config/config.yaml", &Default::default())?;
/// list_models(&config, false).await?;
/// # Ok(())
/// # }
/// ```
pub async fn list_models(config: &Config, json: bool) -> Result<()> {
    tracing::info!("Listing models from {}", config.backend.base_url);

    let backend = HttpBackend::new(&config.backend)?;
    let models = backend.list_models().await?;

    if json {
        println!("{}", models_json(&models)?);
        return Ok(());
    }

    if models.is_empty() {
        println!("No models available from {}", backend.base_url());
        return Ok(());
    }

    println!("\nAvailable models from {}:\n", backend.base_url());
    models_table(&models).printstd();
    println!();
    Ok(())
}

/// Serialize models into pretty JSON
///
/// # Errors
///
/// Returns `SofiError::Serialization` if serialization fails
pub fn models_json(models: &[ModelDescriptor]) -> Result<String> {
    let json = serde_json::to_string_pretty(models).map_err(SofiError::Serialization)?;
    Ok(json)
}

/// Build the model table
pub fn models_table(models: &[ModelDescriptor]) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Model", "Description", "Best For", "API Key"]);

    for model in models {
        let best_for = if model.best_for.is_empty() {
            "-".to_string()
        } else {
            model.best_for.join(", ")
        };

        table.add_row(row![
            model.name,
            model.description,
            best_for,
            format_key_configured(model.key_configured)
        ]);
    }

    table
}

fn format_key_configured(configured: bool) -> &'static str {
    if configured {
        "Configured"
    } else {
        "Missing"
    }
}
