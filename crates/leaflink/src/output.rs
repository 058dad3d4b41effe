//! Output rendering: tables, JSON, and severity coloring.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use leaflink_core::DisplayTier;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Render a list of rows in the requested format.
pub fn render_list<T>(format: OutputFormat, rows: &[T]) -> Result<String, CliError>
where
    T: Tabled + Serialize,
{
    match format {
        OutputFormat::Table => {
            if rows.is_empty() {
                return Ok("(none)".into());
            }
            Ok(Table::new(rows).with(Style::rounded()).to_string())
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
    }
}

/// Render a single serializable value as JSON.
pub fn render_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Color a classification label by its display tier.
pub fn tier_colored(label: &str, tier: DisplayTier) -> String {
    match tier {
        DisplayTier::Critical => label.red().bold().to_string(),
        DisplayTier::Warning => label.bright_yellow().to_string(),
        DisplayTier::Notice => label.yellow().to_string(),
        DisplayTier::Normal => label.to_string(),
    }
}
