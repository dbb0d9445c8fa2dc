use std::path::PathBuf;
use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur while building the registry or processing a document.
#[derive(Debug, Error)]
pub enum JanaError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The prose component directory exists but could not be listed.
    #[error("Failed to scan component directory {}: {source}", path.display())]
    Registry {
        /// Directory that was being scanned
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },
    /// A caller-supplied extension pass failed.
    #[error("Pass `{pass}` failed: {message}")]
    Pass {
        /// Name of the failing pass
        pass: String,
        /// Error message
        message: String,
    },
    /// A pass panicked while processing a document.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl JanaError {
    /// Create an extension pass error
    pub fn pass(pass: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pass {
            pass: pass.into(),
            message: message.into(),
        }
    }

    /// Create a registry scan error for `path`
    pub fn registry(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Registry {
            path: path.into(),
            source,
        }
    }
}
