// Memory Journal — Persistence boundary
// The orchestrator talks to storage only through `MemoryBackend`. A backend
// holds two independent things per project: the live memory filesystem
// (canonical state) and the append-only journal.
//
// Module layout:
//   schema  — SQLite tables and idempotent migrations
//   sqlite  — SqliteMemoryStore, the rusqlite-backed implementation

use crate::atoms::error::EngineResult;
use crate::atoms::types::{JournalEntry, MemoryFileSystem};
use async_trait::async_trait;

pub(crate) mod schema;
mod sqlite;

pub use sqlite::SqliteMemoryStore;

#[async_trait]
pub trait MemoryBackend: Send + Sync {
    async fn load_memory(&self, project_id: &str) -> EngineResult<MemoryFileSystem>;

    /// Replace the project's persisted filesystem with `fs`.
    async fn save_memory(&self, project_id: &str, fs: &MemoryFileSystem) -> EngineResult<()>;

    async fn clear_memory(&self, project_id: &str) -> EngineResult<()>;

    /// The project's journal in append order.
    async fn load_journal(&self, project_id: &str) -> EngineResult<Vec<JournalEntry>>;

    /// Append one entry; returns the new journal version.
    async fn save_journal_entry(&self, project_id: &str, entry: &JournalEntry) -> EngineResult<usize>;

    async fn clear_journal(&self, project_id: &str) -> EngineResult<()>;

    async fn journal_version(&self, project_id: &str) -> EngineResult<usize>;

    /// Clear both journal and filesystem. Backends that can should do this in
    /// one transaction; a partially cleared project is not a legal state.
    async fn clear_project(&self, project_id: &str) -> EngineResult<()> {
        self.clear_journal(project_id).await?;
        self.clear_memory(project_id).await
    }
}
