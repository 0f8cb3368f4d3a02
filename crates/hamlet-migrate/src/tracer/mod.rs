/*!
# Tracer - Rule-driven Source Migration

A SystemTracer-like engine that walks a set of files and rewrites each one
with an ordered set of transformation rules. Standalone templates get a
whole-content grammar rewrite; Haskell sources get the quasi-quote and CPP
marker rules in `haskell_rules`.

## Architecture

- `TransformationRule`: Trait for defining text rewrite rules
- `FileTracer`: Reads files, applies rules in memory, writes atomically
- `patterns`: Quasi-quote opener and terminator scanning shared by the rules
- `haskell_rules`: The four Haskell source marker rules

## Example Usage

```rust,no_run
use hamlet_migrate::{FileTracer, MigrateConfig};

let mut tracer = FileTracer::with_default_rules(MigrateConfig::default());
let summary = tracer.migrate_paths(&["templates", "Handler/Root.hs"]);
assert!(summary.success());
```
*/

pub mod file_tracer;
pub mod haskell_rules;
pub mod patterns;
pub mod rules;

use std::path::Path;

use serde::Serialize;

use crate::error::MigrateError;

// Re-export main types
pub use file_tracer::FileTracer;
pub use rules::{RuleStats, TemplateGrammarRule, TransformationRule};

/// Common result type for transformations
pub type TransformResult<T> = Result<T, MigrateError>;

/// New text produced by a rule plus how many spots it rewrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub text: String,
    pub occurrences: usize,
}

impl Rewrite {
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            occurrences: 0,
        }
    }

    pub fn changed(&self) -> bool {
        self.occurrences > 0
    }
}

#[derive(Debug, Clone)]
pub struct TransformationContext {
    pub source_file: Option<String>,
    pub current_depth: usize,
    pub max_depth: usize,
}

impl Default for TransformationContext {
    fn default() -> Self {
        Self {
            source_file: None,
            current_depth: 0,
            max_depth: crate::DEFAULT_MAX_DEPTH,
        }
    }
}

impl TransformationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_file(mut self, file: &Path) -> Self {
        self.source_file = Some(file.display().to_string());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn descend(&self) -> Self {
        Self {
            source_file: self.source_file.clone(),
            current_depth: self.current_depth + 1,
            max_depth: self.max_depth,
        }
    }

    /// `max_depth` is inclusive: a context may sit `max_depth` levels down
    pub fn exceeds_max_depth(&self) -> bool {
        self.current_depth > self.max_depth
    }

    /// File name used in error messages
    pub fn file_label(&self) -> String {
        self.source_file.clone().unwrap_or_else(|| "<input>".to_string())
    }

    pub fn depth_exceeded(&self) -> MigrateError {
        MigrateError::DepthExceeded {
            path: self.file_label().into(),
            max_depth: self.max_depth,
        }
    }
}
