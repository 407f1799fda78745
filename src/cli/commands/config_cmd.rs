//! Configuration display command.

use console::style;

use crate::config::{Config, Settings};

/// Print the effective configuration with credentials redacted.
pub fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    let source_path = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none (defaults and environment)".to_string());

    let view_levels = settings
        .allowed_view_levels
        .iter()
        .map(|level| level.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    println!("{}", style("Effective configuration").bold());
    println!("  {:<18} {}", "Config file:", style(source_path).dim());
    println!("  {:<18} {}", "Source database:", settings.display_source_url());
    println!("  {:<18} {}", "Target database:", settings.display_target_url());
    println!(
        "  {:<18} {}",
        "Target file path:",
        settings.target_file_path.display()
    );
    println!("  {:<18} {}", "Table prefix:", settings.table_prefix);
    println!("  {:<18} [{}]", "View levels:", view_levels);

    Ok(())
}
