//! Error types for mediacook-av.

use std::path::PathBuf;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Maximum number of stderr bytes kept in a [`Error::ProcessFailed`].
const STDERR_SNIPPET_LEN: usize = 1024;

/// Errors that can occur while invoking external tools.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required external tool is not available.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// An external tool exited non-zero and the invocation did not tolerate it.
    #[error("{tool} exited with {}: {stderr}", describe_exit(exit_code))]
    ProcessFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A tool exited cleanly but printed output we could not parse.
    #[error("failed to parse {tool} output: {message}")]
    ParseError { tool: String, message: String },

    /// The specified file was not found.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a tool not found error.
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    /// Create a process failure, keeping only the tail of stderr.
    pub fn process_failed(tool: impl Into<String>, exit_code: Option<i32>, stderr: &str) -> Self {
        Self::ProcessFailed {
            tool: tool.into(),
            exit_code,
            stderr: stderr_snippet(stderr),
        }
    }

    /// Create a parse error.
    pub fn parse_error(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "signal".to_string(),
    }
}

/// Keep the last [`STDERR_SNIPPET_LEN`] bytes of stderr. Encoders print the
/// actual failure at the end, after the banner and stream listing.
fn stderr_snippet(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.len() <= STDERR_SNIPPET_LEN {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - STDERR_SNIPPET_LEN;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &trimmed[start..])
}
