use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-file migration failures.
///
/// None of these abort a batch; the file tracer records them against the
/// offending path and moves on to the next file.
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("cannot read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unrecognized file kind: {}", .path.display())]
    UnrecognizedKind { path: PathBuf },

    #[error("{file}:{line}: quoted block opened by `{opener}` is never closed with `|]`")]
    UnterminatedBlock {
        file: String,
        line: usize,
        opener: String,
    },

    #[error("{file}:{line}: `{directive}` has no matching #endif")]
    UnterminatedGuard {
        file: String,
        line: usize,
        directive: String,
    },

    #[error("cannot write {}: {source}", .path.display())]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: nesting deeper than {max_depth} levels", .path.display())]
    DepthExceeded { path: PathBuf, max_depth: usize },
}

impl MigrateError {
    pub fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub fn unwritable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Unwritable {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly tag used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreadable { .. } => "unreadable",
            Self::UnrecognizedKind { .. } => "unrecognized-kind",
            Self::UnterminatedBlock { .. } => "unterminated-block",
            Self::UnterminatedGuard { .. } => "unterminated-guard",
            Self::Unwritable { .. } => "unwritable",
            Self::DepthExceeded { .. } => "depth-exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_location() {
        let err = MigrateError::UnterminatedBlock {
            file: "src/Handler.hs".to_string(),
            line: 12,
            opener: "[$hamlet|".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "src/Handler.hs:12: quoted block opened by `[$hamlet|` is never closed with `|]`"
        );
        assert_eq!(err.kind(), "unterminated-block");
    }

    #[test]
    fn test_io_errors_keep_source() {
        let err = MigrateError::unreadable(
            "missing.hamlet",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().starts_with("cannot read missing.hamlet"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
