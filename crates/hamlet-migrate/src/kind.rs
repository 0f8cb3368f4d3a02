use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MigrateError;
use crate::grammar::TemplateGrammar;

/// What a file is, judged solely by its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    Hamlet,
    Cassius,
    Julius,
    /// Haskell source that may contain quasi-quoted template blocks
    HaskellSource,
}

impl FileKind {
    /// Classify a path by extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        Self::from_extension(&ext)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "hamlet" => Some(Self::Hamlet),
            "cassius" => Some(Self::Cassius),
            "julius" => Some(Self::Julius),
            "hs" | "lhs" => Some(Self::HaskellSource),
            _ => None,
        }
    }

    /// The whole-content grammar applied to standalone template files
    pub fn template_grammar(self) -> Option<TemplateGrammar> {
        match self {
            Self::Hamlet => Some(TemplateGrammar::Hamlet),
            Self::Cassius => Some(TemplateGrammar::Cassius),
            Self::Julius => Some(TemplateGrammar::Julius),
            Self::HaskellSource => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hamlet => "hamlet",
            Self::Cassius => "cassius",
            Self::Julius => "julius",
            Self::HaskellSource => "haskell-source",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single file queued for migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub path: PathBuf,
    pub kind: FileKind,
}

impl FileTask {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, MigrateError> {
        let path = path.into();
        match FileKind::from_path(&path) {
            Some(kind) => Ok(Self { path, kind }),
            None => Err(MigrateError::UnrecognizedKind { path }),
        }
    }
}
