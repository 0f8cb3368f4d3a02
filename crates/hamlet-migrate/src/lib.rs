//! # Hamlet Migrate
//!
//! Rewrites Hamlet 6 era templates to the Hamlet 7 syntax, including:
//! - Standalone `.hamlet`, `.cassius` and `.julius` template files
//! - Quasi-quoted template blocks embedded in Haskell source
//! - The CPP guards and quoter macros used to straddle GHC 6 and GHC 7
//!
//! Files are rewritten in place. Each file is migrated entirely in memory
//! and only written back once the whole rewrite succeeded.

#![warn(clippy::all)]

pub mod error;
pub mod grammar;
pub mod kind;
pub mod tracer;

// Re-export commonly used types
pub use error::MigrateError;
pub use grammar::TemplateGrammar;
pub use kind::{FileKind, FileTask};
pub use tracer::file_tracer::{FileOutcome, FileReport, FileTracer, MigrationSummary};
pub use tracer::{Rewrite, TransformResult, TransformationContext, TransformationRule};

/// Migrator version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bound on directory and guard nesting
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Initialize tracing for the migrator.
///
/// `RUST_LOG` takes precedence; otherwise both the library and the CLI log
/// at `level`. Safe to call more than once.
pub fn init_tracing(level: tracing::Level) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("hamlet_migrate={level},hamlet6to7={level}"))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Migration run configuration
#[derive(Debug, Clone)]
pub struct MigrateConfig {
    /// Compute every outcome but leave files on disk untouched
    pub dry_run: bool,
    /// Maximum directory recursion and guard nesting depth
    pub max_depth: usize,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MigrateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }
}
