use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use nuisance_config::NuisanceConfig;
use nuisance_core::notifier::{NotificationOutcome, SmtpNotifier};
use nuisance_core::report::Report;
use nuisance_core::store::{export_csv, CsvRecordStore};
use nuisance_core::{ReportService, SubmissionOutcome, ValidationError};
use tracing::debug;

/// Exit status for rejected input, distinct from storage failures.
const EXIT_INVALID_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "nuisance", version, about)]
pub struct Cli {
    /// Explicit configuration file instead of `config/nuisance.yaml`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the report store if it does not exist yet
    Init,
    /// Submit a nuisance report and alert security
    Submit(SubmitArgs),
    /// Show every submitted report
    List,
    /// Write all reports to a CSV file
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Car Alarm, Noise Complaint or Other
    #[arg(short, long)]
    pub issue_type: String,
    /// What is happening
    #[arg(short, long)]
    pub description: String,
    /// Where it is happening, e.g. "Parking Lot B"
    #[arg(short, long)]
    pub location: String,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Destination file; defaults to cherrywood_reports_<YYYYMMDD>.csv
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

type Service = ReportService<CsvRecordStore, SmtpNotifier>;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => NuisanceConfig::load_from_path(path),
        None => NuisanceConfig::load(),
    }
    .context("loading configuration")?;
    debug!(store = %config.store.path.display(), "configuration loaded");

    let service = ReportService::new(
        CsvRecordStore::new(&config.store.path),
        SmtpNotifier::new(config.notifier.clone()),
    );
    service.initialize()?;

    let code = match cli.command {
        Commands::Init => {
            println!("Report store ready at {}", service.store().path().display());
            ExitCode::SUCCESS
        }
        Commands::Submit(args) => submit(&service, &args),
        Commands::List => {
            list(&service.history()?, &mut io::stdout().lock())?;
            ExitCode::SUCCESS
        }
        Commands::Export(args) => {
            export(&service, args)?;
            ExitCode::SUCCESS
        }
    };

    if cli.print_metrics {
        print!("{}", service.metrics().gather_metrics()?);
    }
    Ok(code)
}

fn submit(service: &Service, args: &SubmitArgs) -> ExitCode {
    match service.submit_report(&args.issue_type, &args.description, &args.location) {
        SubmissionOutcome::ValidationFailed(e) => {
            eprintln!("{}", rejection_message(&e));
            ExitCode::from(EXIT_INVALID_INPUT)
        }
        SubmissionOutcome::PersistenceFailed(e) => {
            eprintln!("Report could not be saved: {e}");
            ExitCode::FAILURE
        }
        SubmissionOutcome::Submitted {
            report,
            notification,
        } => {
            println!(
                "Report submitted successfully! ({} at {}, {})",
                report.issue_type,
                report.location,
                report.formatted_timestamp()
            );
            match notification {
                NotificationOutcome::Delivered => {
                    println!("Security team has been notified via email.")
                }
                NotificationOutcome::NotDelivered(reason) => println!(
                    "Report saved, but email notification could not be sent ({reason}). \
                     Please check email configuration."
                ),
            }
            ExitCode::SUCCESS
        }
    }
}

fn rejection_message(error: &ValidationError) -> String {
    match error {
        ValidationError::UnknownIssueType(_) => format!("Report rejected: {error}"),
        ValidationError::EmptyDescription | ValidationError::EmptyLocation => {
            format!("Please fill in all required fields: {error}")
        }
    }
}

fn list<W: Write>(reports: &[Report], out: &mut W) -> io::Result<()> {
    if reports.is_empty() {
        return writeln!(out, "No reports have been submitted yet.");
    }
    writeln!(out, "Total Reports: {}", reports.len())?;
    for report in reports {
        writeln!(
            out,
            "{} | {} | {} | {} | {}",
            report.formatted_timestamp(),
            report.issue_type,
            report.location,
            report.status,
            report.description.replace('\n', " ")
        )?;
    }
    Ok(())
}

fn export(service: &Service, args: ExportArgs) -> anyhow::Result<()> {
    let reports = service.history()?;
    let output = args.output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "cherrywood_reports_{}.csv",
            chrono::Local::now().format("%Y%m%d")
        ))
    });
    let file = File::create(&output).with_context(|| format!("creating {}", output.display()))?;
    export_csv(&reports, BufWriter::new(file))
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Exported {} reports to {}", reports.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nuisance_core::report::NewReport;

    #[test]
    fn rejection_message_matches_failure() {
        let unknown = rejection_message(&ValidationError::UnknownIssueType("Fireworks".into()));
        assert!(unknown.starts_with("Report rejected: unknown issue type 'Fireworks'"));
        assert!(!unknown.contains("fill in all required fields"));

        assert_eq!(
            rejection_message(&ValidationError::EmptyLocation),
            "Please fill in all required fields: location must not be empty"
        );
    }

    #[test]
    fn list_reports_empty_history() {
        let mut out = Vec::new();
        list(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No reports have been submitted yet.\n");
    }

    #[test]
    fn list_flattens_multiline_descriptions() {
        let ts = chrono::NaiveDateTime::parse_from_str("2025-02-02 02:02:02", "%Y-%m-%d %H:%M:%S").unwrap();
        let report = Report::stamp(
            NewReport::parse("Other", "line one\nline two", "Lobby").unwrap(),
            ts,
        );
        let mut out = Vec::new();
        list(&[report], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Total Reports: 1\n2025-02-02 02:02:02 | Other | Lobby | Pending | line one line two\n"
        );
    }
}
