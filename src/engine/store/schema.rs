// Database schema and migrations for the memory journal store.
// Called by SqliteMemoryStore::open() and open_in_memory(). Every statement is
// CREATE … IF NOT EXISTS, so running it again is a no-op; new tables and
// indexes are appended at the end of run_migrations().

use crate::atoms::error::EngineResult;
use log::info;
use rusqlite::Connection;

pub(crate) fn run_migrations(conn: &Connection) -> EngineResult<()> {
    // ── Live memory filesystem ───────────────────────────────────────
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS memory_files (
            project_id TEXT NOT NULL,
            path TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (project_id, path)
        );
    ")?;

    // ── Append-only journal ──────────────────────────────────────────
    // `version` is 1-based and dense per project; it is the row's position.
    conn.execute_batch("
        CREATE TABLE IF NOT EXISTS memory_journal (
            project_id TEXT NOT NULL,
            version INTEGER NOT NULL,
            timestamp TEXT NOT NULL,
            kind TEXT NOT NULL,
            command_json TEXT NOT NULL,
            PRIMARY KEY (project_id, version)
        );
    ")?;

    // ── Later additions ──────────────────────────────────────────────
    conn.execute_batch("
        CREATE INDEX IF NOT EXISTS idx_memory_journal_kind
            ON memory_journal(project_id, kind);
    ")?;

    info!("[store] Memory journal schema ready");
    Ok(())
}
