// ── Paw Atoms: Error Types ─────────────────────────────────────────────────
// Error enums for the memory journal, built with `thiserror`.
//
// Design rules:
//   • `CommandError` is the value a command handler returns on failure. It is
//     never a panic and never aborts replay; callers decide whether to journal.
//   • `EngineError` is coarse-grained by domain (I/O, DB, Command, Version…).
//     Storage failures surface here and fail the whole orchestrator operation.
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • `EngineError` → `String` conversion is provided via `Display` so that
//     tool boundaries (`Result<String, String>`) can call `.map_err(|e|
//     e.to_string())` without boilerplate.

use thiserror::Error;

// ── Command handler failures ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The addressed path has no file (and, for `view`, no files beneath it).
    #[error("The path {path} does not exist")]
    PathNotFound { path: String },

    /// `old_str` must occur exactly once; `count` is how often it occurred.
    #[error("{}", ambiguity_message(.path, *.count))]
    AmbiguousOrMissingMatch { path: String, count: usize },

    /// `insert_line` outside `0..=line_count`.
    #[error("Invalid insert_line {line} for {path}: must be between 0 and {line_count}")]
    LineOutOfRange {
        path: String,
        line: i64,
        line_count: usize,
    },

    /// A rename target is already occupied.
    #[error("The destination {path} already exists")]
    DestinationExists { path: String },
}

fn ambiguity_message(path: &str, count: usize) -> String {
    if count == 0 {
        format!("No replacement was performed, old_str did not appear verbatim in {}", path)
    } else {
        format!(
            "No replacement was performed. Multiple occurrences of old_str in {} ({} found). Please ensure it is unique",
            path, count
        )
    }
}

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite / rusqlite database failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A command handler rejected the operation.
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    /// A version outside the project's journal was requested.
    #[error("Version {version} is out of range (journal is at version {latest})")]
    VersionOutOfRange { version: usize, latest: usize },

    /// Rollback target: the file did not exist at the requested version.
    #[error("File {path} is not present at version {version}")]
    FileNotPresentAtVersion { path: String, version: usize },

    /// The project moved on between a read and the write that depended on it.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool argument decoding or dispatch failure.
    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create a tool error with name and message.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

// ── Bridge: &str → EngineError ─────────────────────────────────────────────

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All engine operations return this type.
pub type EngineResult<T> = Result<T, EngineError>;

/// Handler results: the success message, or the reason nothing changed.
pub type CommandResult = Result<String, CommandError>;

// ── Conversion: EngineError → String ──────────────────────────────────────

impl From<EngineError> for String {
    fn from(e: EngineError) -> Self {
        e.to_string()
    }
}
