/*!
# FileTracer - In-place File Migration

Reads source files, applies the transformation rules for their kind, and
writes the result back over the original. A file is either fully rewritten
or left exactly as it was: the new content is built in memory, written to
a sibling temporary file and renamed into place.
*/

use std::cmp::Reverse;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use walkdir::WalkDir;

use super::haskell_rules;
use super::rules::{RuleStats, TemplateGrammarRule, TransformationRule};
use super::{Rewrite, TransformResult, TransformationContext};
use crate::error::MigrateError;
use crate::grammar::TemplateGrammar;
use crate::kind::{FileKind, FileTask};
use crate::MigrateConfig;

/// File-based migration engine
pub struct FileTracer {
    rules: Vec<Box<dyn TransformationRule>>,
    stats: HashMap<String, RuleStats>,
    config: MigrateConfig,
}

impl FileTracer {
    /// A tracer with no rules; every file comes out unchanged
    pub fn new(config: MigrateConfig) -> Self {
        Self {
            rules: Vec::new(),
            stats: HashMap::new(),
            config,
        }
    }

    /// A tracer with the template grammars and the Haskell marker rules
    pub fn with_default_rules(config: MigrateConfig) -> Self {
        let mut tracer = Self::new(config);
        for grammar in [TemplateGrammar::Hamlet, TemplateGrammar::Cassius, TemplateGrammar::Julius] {
            tracer.add_rule(Box::new(TemplateGrammarRule::new(grammar)));
        }
        for rule in haskell_rules::default_rules() {
            tracer.add_rule(rule);
        }
        tracer
    }

    /// Add a transformation rule, keeping rules sorted by priority
    pub fn add_rule(&mut self, rule: Box<dyn TransformationRule>) {
        let rule_name = rule.name().to_string();
        self.stats.insert(rule_name.clone(), RuleStats::new(rule_name));
        self.rules.push(rule);
        self.rules.sort_by_key(|rule| Reverse(rule.priority()));
    }

    /// Names of the rules that run on `kind`, in execution order
    pub fn rule_names(&self, kind: FileKind) -> Vec<&'static str> {
        self.rules
            .iter()
            .filter(|rule| rule.applies_to(kind))
            .map(|rule| rule.name())
            .collect()
    }

    /// Migrate every file named by `paths`, expanding directories.
    ///
    /// Failures are recorded per file; one bad file never stops the batch.
    pub fn migrate_paths<P: AsRef<Path>>(&mut self, paths: &[P]) -> MigrationSummary {
        let mut summary = MigrationSummary::new(self.config.dry_run);
        let mut queue = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                collect_directory(path, self.config.max_depth, &mut queue);
            } else {
                queue.push(Ok(path.to_path_buf()));
            }
        }

        for queued in queue {
            let report = match queued {
                Ok(file) => self.migrate_file(&file),
                Err(report) => report,
            };
            summary.record(report);
        }

        summary.rules = self.rule_stats();
        summary
    }

    /// Migrate a single file in place
    pub fn migrate_file(&mut self, path: &Path) -> FileReport {
        let outcome = match self.try_migrate_file(path) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "migration failed");
                FileOutcome::Failed(e)
            }
        };

        FileReport {
            path: path.to_path_buf(),
            kind: FileKind::from_path(path),
            outcome,
        }
    }

    fn try_migrate_file(&mut self, path: &Path) -> TransformResult<FileOutcome> {
        let task = FileTask::new(path)?;
        let source = fs::read_to_string(&task.path).map_err(|e| MigrateError::unreadable(&task.path, e))?;

        let context = TransformationContext::new()
            .with_source_file(&task.path)
            .with_max_depth(self.config.max_depth);

        let rewrite = self.migrate_source(task.kind, &source, &context)?;
        if !rewrite.changed() || rewrite.text == source {
            tracing::debug!(path = %task.path.display(), "unchanged");
            return Ok(FileOutcome::Unchanged);
        }

        if self.config.dry_run {
            tracing::info!(path = %task.path.display(), rewrites = rewrite.occurrences, "would migrate");
        } else {
            write_atomically(&task.path, &rewrite.text)?;
            tracing::info!(path = %task.path.display(), rewrites = rewrite.occurrences, "migrated");
        }

        Ok(FileOutcome::Migrated {
            rewrites: rewrite.occurrences,
            written: !self.config.dry_run,
        })
    }

    /// Run every rule for `kind` over `source`, without touching the disk
    pub fn migrate_source(
        &mut self,
        kind: FileKind,
        source: &str,
        context: &TransformationContext,
    ) -> TransformResult<Rewrite> {
        let mut current = Rewrite::unchanged(source);

        for rule in self.rules.iter().filter(|rule| rule.applies_to(kind)) {
            if !rule.matches(&current.text, context) {
                continue;
            }

            let result = rule.transform(&current.text, context);
            let stats = self.stats.get_mut(rule.name());

            match result {
                Ok(rewrite) => {
                    if let Some(stats) = stats {
                        stats.record(&rewrite);
                    }
                    if rewrite.changed() {
                        tracing::trace!(rule = rule.name(), rewrites = rewrite.occurrences, "rule applied");
                        current = Rewrite {
                            text: rewrite.text,
                            occurrences: current.occurrences + rewrite.occurrences,
                        };
                    }
                }
                Err(e) => {
                    if let Some(stats) = stats {
                        stats.errors += 1;
                    }
                    return Err(e);
                }
            }
        }

        Ok(current)
    }

    /// Get transformation statistics, in rule execution order
    pub fn rule_stats(&self) -> Vec<RuleStats> {
        self.rules
            .iter()
            .filter_map(|rule| self.stats.get(rule.name()).cloned())
            .collect()
    }
}

/// Queue the files with a recognized kind below `dir`, in name order.
///
/// Symlinked directories are not followed. A subdirectory nested more than
/// `max_depth` levels down, or an entry that cannot be read, is queued as a
/// failed report and the walk carries on with its siblings.
fn collect_directory(dir: &Path, max_depth: usize, queue: &mut Vec<Result<PathBuf, FileReport>>) {
    let walker = WalkDir::new(dir)
        .follow_links(false)
        .max_depth(max_depth.saturating_add(1))
        .sort_by_file_name();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                tracing::debug!(path = %path.display(), error = %e, "skipping unreadable entry");
                let error = MigrateError::unreadable(&path, io::Error::from(e));
                queue.push(Err(FileReport::failed(path, error)));
                continue;
            }
        };

        if entry.file_type().is_dir() {
            if entry.depth() > max_depth {
                let path = entry.into_path();
                tracing::debug!(path = %path.display(), max_depth, "directory nested too deep");
                let error = MigrateError::DepthExceeded {
                    path: path.clone(),
                    max_depth,
                };
                queue.push(Err(FileReport::failed(path, error)));
            }
        } else if FileKind::from_path(entry.path()).is_some() {
            queue.push(Ok(entry.into_path()));
        }
    }
}

/// Replace `path` with `content` via a sibling temp file and a rename.
///
/// Symlinks are resolved first so the link stays and its target is rewritten.
fn write_atomically(path: &Path, content: &str) -> TransformResult<()> {
    let target = fs::canonicalize(path).map_err(|e| MigrateError::unwritable(path, e))?;
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = target.with_file_name(format!(".{file_name}.hamlet6to7.tmp"));

    if let Err(e) = replace_with(&target, &temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(MigrateError::unwritable(path, e));
    }
    Ok(())
}

fn replace_with(path: &Path, temp_path: &Path, content: &str) -> io::Result<()> {
    let permissions = fs::metadata(path)?.permissions();
    fs::write(temp_path, content)?;
    fs::set_permissions(temp_path, permissions)?;
    fs::rename(temp_path, path)
}

/// What happened to one file
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileOutcome {
    /// `written` is false in dry-run mode
    Migrated { rewrites: usize, written: bool },
    Unchanged,
    Failed(#[serde(serialize_with = "serialize_error")] MigrateError),
}

impl FileOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

fn serialize_error<S: Serializer>(error: &MigrateError, serializer: S) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct ErrorView {
        error: &'static str,
        message: String,
    }

    ErrorView {
        error: error.kind(),
        message: error.to_string(),
    }
    .serialize(serializer)
}

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: Option<FileKind>,
    pub outcome: FileOutcome,
}

impl FileReport {
    pub fn failed(path: PathBuf, error: MigrateError) -> Self {
        Self {
            kind: FileKind::from_path(&path),
            path,
            outcome: FileOutcome::Failed(error),
        }
    }
}

/// Summary of a migration run
#[derive(Debug, Default, Serialize)]
pub struct MigrationSummary {
    pub dry_run: bool,
    pub files_processed: u64,
    pub files_migrated: u64,
    pub files_unchanged: u64,
    pub files_failed: u64,
    pub rewrites: u64,
    pub files: Vec<FileReport>,
    pub rules: Vec<RuleStats>,
}

impl MigrationSummary {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    pub fn record(&mut self, report: FileReport) {
        self.files_processed += 1;
        match &report.outcome {
            FileOutcome::Migrated { rewrites, .. } => {
                self.files_migrated += 1;
                self.rewrites += *rewrites as u64;
            }
            FileOutcome::Unchanged => self.files_unchanged += 1,
            FileOutcome::Failed(_) => self.files_failed += 1,
        }
        self.files.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| report.outcome.is_failure())
    }

    pub fn success(&self) -> bool {
        self.files_failed == 0
    }
}
