// OpenPawz Memory Journal
// Versioned, auditable agent memory: every change to an agent's memory files
// is journaled so any past version can be reconstructed, inspected, verified
// against live state, and rolled back.

pub mod atoms;
pub mod engine;

pub use atoms::error::{CommandError, EngineError, EngineResult};
pub use atoms::types::{
    CommandOutcome, EditOutcome, FileSystemDiff, HistoryItem, JournalCommand, JournalEntry, MemoryFile,
    MemoryFileSystem, ReplayResult, RollbackOutcome, ToolCommand, VerifyReport, VersionDiff,
};
pub use engine::config::JournalConfig;
pub use engine::journal::MemoryJournal;
pub use engine::store::{MemoryBackend, SqliteMemoryStore};
