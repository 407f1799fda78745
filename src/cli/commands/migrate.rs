//! Migration command.

use std::io;

use anyhow::Context;
use console::style;
use indicatif::ProgressBar;
use tokio::sync::mpsc;

use crate::cli::helpers::{confirm_destruction, migration_progress_style, truncate};
use crate::config::Settings;
use crate::repository::{
    DestinationWriter, DocmanQueries, DocmanSource, MysqlPool, RecordingDestination, SourceReader,
    ValorDestination,
};
use crate::services::{
    MigrationConfig, MigrationError, MigrationEvent, MigrationReport, MigrationService,
};

/// Run the migration, or a dry run into memory.
pub async fn cmd_run(settings: &Settings, yes: bool, dry_run: bool) -> anyhow::Result<()> {
    println!(
        "{} Migrating DocMan lawsuits into valor{}",
        style("→").cyan(),
        if dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );
    println!("  Source: {}", settings.display_source_url());
    if dry_run {
        println!("  Target: {}", style("in memory, nothing written").dim());
    } else {
        println!("  Target: {}", settings.display_target_url());
    }
    println!("  Files:  {}", settings.target_file_path.display());
    println!("  Prefix: {}", settings.table_prefix);

    // A dry run clears nothing, so there is nothing to confirm
    if !yes && !dry_run {
        let stdin = io::stdin();
        let confirmed = confirm_destruction(&mut stdin.lock(), &mut io::stdout())?;
        if !confirmed {
            println!("{} Cancelled", style("!").yellow());
            return Ok(());
        }
    }

    let queries = DocmanQueries::new(
        settings.table_prefix.clone(),
        settings.allowed_view_levels.clone(),
    );
    let mut source = DocmanSource::connect(&MysqlPool::new(&settings.source_url), queries)
        .await
        .map_err(MigrationError::SourceQuery)?;

    let config = MigrationConfig {
        target_file_path: settings.target_file_path.clone(),
    };

    if dry_run {
        let mut service = MigrationService::new(source, RecordingDestination::new(), config);
        let report = execute(&mut service).await?;
        let (_, recorded) = service.into_parts();

        print_report(&report);
        print_dry_run(&recorded);
        return Ok(());
    }

    let destination = match ValorDestination::connect(&MysqlPool::new(&settings.target_url)).await
    {
        Ok(destination) => destination,
        Err(e) => {
            let _ = source.close().await;
            return Err(MigrationError::DestinationWrite(e).into());
        }
    };

    let mut service = MigrationService::new(source, destination, config);
    let report = execute(&mut service).await?;
    print_report(&report);

    Ok(())
}

/// Run the service while an event handler task drives the progress bar.
async fn execute<S, D>(service: &mut MigrationService<S, D>) -> anyhow::Result<MigrationReport>
where
    S: SourceReader,
    D: DestinationWriter,
{
    let (event_tx, mut event_rx) = mpsc::channel::<MigrationEvent>(100);

    let event_handler = tokio::spawn(async move {
        let mut progress: Option<ProgressBar> = None;

        while let Some(event) = event_rx.recv().await {
            match event {
                MigrationEvent::Started { total_documents } => {
                    let bar = ProgressBar::new(total_documents);
                    bar.set_style(migration_progress_style());
                    bar.set_message("Purging destination tables...");
                    progress = Some(bar);
                }
                MigrationEvent::Purged => {
                    if let Some(ref bar) = progress {
                        bar.set_message("Reading lawsuits...");
                    }
                }
                MigrationEvent::LawsuitStarted {
                    position,
                    count,
                    title,
                } => {
                    if let Some(ref bar) = progress {
                        bar.set_message(format!(
                            "({}/{}) {}",
                            position,
                            count,
                            truncate(&title, 40)
                        ));
                    }
                }
                MigrationEvent::FileMigrated {
                    processed,
                    percent,
                    file_name,
                    ..
                } => {
                    if let Some(ref bar) = progress {
                        bar.set_position(processed);
                        bar.set_message(format!("{:.2}% [{}]", percent, file_name));
                    }
                }
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
    });

    let result = service.migrate(event_tx).await;

    // The sender was moved into the service, so the handler ends here
    let _ = event_handler.await;

    with_abort_context(result)
}

/// Label a failed run. The error is printed once, by `main`.
fn with_abort_context(
    result: Result<MigrationReport, MigrationError>,
) -> anyhow::Result<MigrationReport> {
    result.context("Migration aborted")
}

fn print_report(report: &MigrationReport) {
    println!(
        "{} Migration complete in {:.1}s",
        style("✓").green(),
        report.elapsed.as_secs_f64()
    );
    println!("  Lawsuits:    {}", report.lawsuits);
    println!("  Folders:     {}", report.folders);
    println!(
        "  Attachments: {} of {} enabled documents",
        report.attachments, report.total_documents
    );

    let unreached = report.unreached_documents();
    if unreached > 0 {
        println!(
            "  {} {} enabled documents are not in a migrated lawsuit folder",
            style("→").dim(),
            unreached
        );
    }
    if report.anomalies > 0 {
        println!(
            "  {} {} metadata fields could not be extracted (run with -v and RUST_LOG=docman_migrate=debug for details)",
            style("!").yellow(),
            report.anomalies
        );
    }
}

fn print_dry_run(recorded: &RecordingDestination) {
    println!("\n{}", style("Lawsuits that would be written:").bold());
    for (id, lawsuit) in &recorded.lawsuits {
        let folders = recorded
            .folders
            .iter()
            .filter(|(_, folder)| folder.lawsuit_id == *id)
            .count();
        let process = if lawsuit.process_number.is_empty() {
            style("no process number".to_string()).dim().to_string()
        } else {
            lawsuit.process_number.clone()
        };
        println!(
            "  {} {} ({}, {} folders)",
            style("•").dim(),
            truncate(&lawsuit.title, 60),
            process,
            folders
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::to_diesel_error;

    #[test]
    fn test_abort_keeps_the_cause_in_one_chain() {
        let err = with_abort_context(Err(MigrationError::DestinationWrite(to_diesel_error(
            "table valor_lawsuits doesn't exist",
        ))))
        .unwrap_err();

        assert_eq!(err.to_string(), "Migration aborted");
        assert!(err
            .downcast_ref::<MigrationError>()
            .is_some_and(MigrationError::is_destination));
        assert!(format!("{err:#}")
            .starts_with("Migration aborted: Destination write failed: table valor_lawsuits"));
    }

    #[test]
    fn test_successful_run_passes_through() {
        let report = MigrationReport {
            lawsuits: 2,
            ..Default::default()
        };
        assert_eq!(with_abort_context(Ok(report.clone())).unwrap(), report);
    }
}
