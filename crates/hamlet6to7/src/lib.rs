//! hamlet6to7 - command-line front end for the Hamlet 6 to 7 migrator
//!
//! Argument parsing, path handling and reporting live here so the binary
//! stays a thin wrapper and the behaviour can be tested without spawning
//! processes.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, value_parser, Arg, ArgAction, ArgMatches, Command};
use hamlet_migrate::{FileOutcome, FileTracer, MigrateConfig, MigrationSummary};

/// Environment variable that forces a dry run
pub const DRY_RUN_ENV: &str = "HAMLET6TO7_DRY_RUN";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Parsed command line
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub paths: Vec<PathBuf>,
    pub dry_run: bool,
    pub format: OutputFormat,
    pub verbosity: u8,
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let paths = matches
            .get_many::<PathBuf>("paths")
            .map(|paths| paths.cloned().collect())
            .unwrap_or_default();

        let format = match matches.get_one::<String>("format").map(String::as_str) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Text,
        };

        Self {
            paths,
            dry_run: matches.get_flag("dry-run"),
            format,
            verbosity: matches.get_count("verbose"),
        }
    }

    /// Log level implied by the number of `-v` flags
    pub fn log_level(&self) -> tracing::Level {
        match self.verbosity {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn config(&self) -> MigrateConfig {
        MigrateConfig::new().dry_run(self.dry_run)
    }
}

pub fn command() -> Command {
    Command::new("hamlet6to7")
        .version(hamlet_migrate::VERSION)
        .about("Rewrite Hamlet 6 templates and quasi-quotes to Hamlet 7 syntax, in place")
        .after_help(
            "Files are overwritten without backups. Make sure your work is committed \
             to version control before running.",
        )
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("Template files (.hamlet, .cassius, .julius), Haskell sources (.hs, .lhs) or directories")
                .required(true)
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Report what would change without writing anything")
                .env(DRY_RUN_ENV)
                .value_parser(BoolishValueParser::new())
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Report format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v debug, -vv trace)")
                .action(ArgAction::Count),
        )
}

/// Migrate everything named in `options` and write the report to `out`
pub fn run<W: Write>(options: &CliOptions, out: &mut W) -> Result<MigrationSummary> {
    tracing::debug!(paths = options.paths.len(), dry_run = options.dry_run, "starting migration");

    let mut tracer = FileTracer::with_default_rules(options.config());
    let summary = tracer.migrate_paths(&options.paths);

    match options.format {
        OutputFormat::Text => render_text(&summary, out).context("Failed to write report")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &summary).context("Failed to write JSON report")?;
            writeln!(out)?;
        }
    }

    Ok(summary)
}

/// Process exit status for a finished run: 1 if any file failed
pub fn exit_status(summary: &MigrationSummary) -> u8 {
    if summary.success() {
        0
    } else {
        1
    }
}

/// One line per file followed by a totals line
pub fn render_text<W: Write>(summary: &MigrationSummary, out: &mut W) -> std::io::Result<()> {
    for report in &summary.files {
        let path = report.path.display();
        match &report.outcome {
            FileOutcome::Migrated { rewrites, written: true } => {
                writeln!(out, "migrated       {path} ({rewrites} {})", plural(*rewrites, "rewrite"))?
            }
            FileOutcome::Migrated { rewrites, written: false } => {
                writeln!(out, "would migrate  {path} ({rewrites} {})", plural(*rewrites, "rewrite"))?
            }
            FileOutcome::Unchanged => writeln!(out, "unchanged      {path}")?,
            FileOutcome::Failed(error) => writeln!(out, "error          {error}")?,
        }
    }

    let migrated_label = if summary.dry_run { "would migrate" } else { "migrated" };
    writeln!(
        out,
        "{} {}: {} {migrated_label}, {} unchanged, {} failed",
        summary.files_processed,
        plural(summary.files_processed as usize, "file"),
        summary.files_migrated,
        summary.files_unchanged,
        summary.files_failed,
    )
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hamlet_migrate::{FileKind, FileReport, MigrateError};

    fn parse(args: &[&str]) -> CliOptions {
        let matches = command().try_get_matches_from(args).unwrap();
        CliOptions::from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["hamlet6to7", "a.hamlet", "src"]);
        assert_eq!(options.paths, vec![PathBuf::from("a.hamlet"), PathBuf::from("src")]);
        assert_eq!(options.format, OutputFormat::Text);
        assert_eq!(options.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_flags() {
        let options = parse(&["hamlet6to7", "--dry-run", "--format", "json", "-vv", "x.hs"]);
        assert!(options.dry_run);
        assert!(options.config().dry_run);
        assert_eq!(options.format, OutputFormat::Json);
        assert_eq!(options.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_dry_run_from_environment() {
        std::env::set_var(DRY_RUN_ENV, "1");
        let forced = parse(&["hamlet6to7", "a.hamlet"]);
        std::env::set_var(DRY_RUN_ENV, "false");
        let disabled = parse(&["hamlet6to7", "a.hamlet"]);
        std::env::remove_var(DRY_RUN_ENV);

        assert!(forced.dry_run);
        assert!(forced.config().dry_run);
        assert!(!disabled.dry_run);
    }

    #[test]
    fn test_exit_status() {
        let mut summary = MigrationSummary::new(false);
        summary.record(FileReport {
            path: PathBuf::from("a.hamlet"),
            kind: Some(FileKind::Hamlet),
            outcome: FileOutcome::Unchanged,
        });
        assert_eq!(exit_status(&summary), 0);

        summary.record(FileReport::failed(
            PathBuf::from("b.txt"),
            MigrateError::UnrecognizedKind { path: "b.txt".into() },
        ));
        assert_eq!(exit_status(&summary), 1);
    }

    #[test]
    fn test_paths_are_required() {
        assert!(command().try_get_matches_from(["hamlet6to7"]).is_err());
        assert!(command().try_get_matches_from(["hamlet6to7", "--format", "xml", "a.hs"]).is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }
}
