// SQLite-backed memory store.
// One connection behind a parking_lot Mutex; every method takes the lock for
// its whole statement sequence, and multi-statement writes run inside a
// transaction so a project is never left half-saved.

use super::schema;
use super::MemoryBackend;
use crate::atoms::error::EngineResult;
use crate::atoms::types::{EntryCommand, JournalEntry, MemoryFile, MemoryFileSystem, Timestamp};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteMemoryStore {
    /// `pub` for integration tests that need to reach under the backend
    /// (e.g. to simulate drift by editing rows directly).
    pub conn: Mutex<Connection>,
}

impl SqliteMemoryStore {
    /// Open (or create) the store at `path` and initialize tables.
    pub fn open(path: &Path) -> EngineResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!("[store] Opening memory journal store at {:?}", path);

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        schema::run_migrations(&conn)?;

        Ok(SqliteMemoryStore { conn: Mutex::new(conn) })
    }

    /// Private in-memory store, used by tests and benchmarks.
    pub fn open_in_memory() -> EngineResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(SqliteMemoryStore { conn: Mutex::new(conn) })
    }

    /// Every project id that has files or journal entries.
    pub fn list_projects(&self) -> EngineResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT project_id FROM memory_files
             UNION SELECT project_id FROM memory_journal
             ORDER BY project_id",
        )?;
        let projects = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(projects)
    }
}

fn format_ts(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(column: usize, raw: &str) -> rusqlite::Result<Timestamp> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e)))
}

impl MemoryFile {
    /// Map a row with columns (path, content, created_at, updated_at) → MemoryFile.
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let created_at: String = row.get(2)?;
        let updated_at: String = row.get(3)?;
        Ok(MemoryFile {
            path: row.get(0)?,
            content: row.get(1)?,
            created_at: parse_ts(2, &created_at)?,
            updated_at: parse_ts(3, &updated_at)?,
        })
    }
}

#[async_trait]
impl MemoryBackend for SqliteMemoryStore {
    // ── Memory filesystem ──────────────────────────────────────────────

    async fn load_memory(&self, project_id: &str) -> EngineResult<MemoryFileSystem> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT path, content, created_at, updated_at FROM memory_files WHERE project_id = ?1 ORDER BY path",
        )?;
        let files = stmt
            .query_map(params![project_id], MemoryFile::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(files.into_iter().collect())
    }

    async fn save_memory(&self, project_id: &str, fs: &MemoryFileSystem) -> EngineResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM memory_files WHERE project_id = ?1", params![project_id])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO memory_files (project_id, path, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for f in fs.files() {
                insert.execute(params![
                    project_id,
                    f.path,
                    f.content,
                    format_ts(&f.created_at),
                    format_ts(&f.updated_at)
                ])?;
            }
        }
        tx.commit()?;
        debug!("[store] Saved {} memory files for project {}", fs.len(), project_id);
        Ok(())
    }

    async fn clear_memory(&self, project_id: &str) -> EngineResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM memory_files WHERE project_id = ?1", params![project_id])?;
        Ok(())
    }

    // ── Journal ────────────────────────────────────────────────────────

    async fn load_journal(&self, project_id: &str) -> EngineResult<Vec<JournalEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT timestamp, command_json FROM memory_journal WHERE project_id = ?1 ORDER BY version",
        )?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                let ts: String = row.get(0)?;
                Ok((parse_ts(0, &ts)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut journal = Vec::with_capacity(rows.len());
        for (timestamp, json) in rows {
            let command: EntryCommand = serde_json::from_str(&json)?;
            journal.push(JournalEntry { timestamp, command });
        }
        Ok(journal)
    }

    async fn save_journal_entry(&self, project_id: &str, entry: &JournalEntry) -> EngineResult<usize> {
        let json = serde_json::to_string(&entry.command)?;
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let next: i64 = tx.query_row(
            "SELECT COALESCE(MAX(version), 0) + 1 FROM memory_journal WHERE project_id = ?1",
            params![project_id],
            |r| r.get(0),
        )?;
        tx.execute(
            "INSERT INTO memory_journal (project_id, version, timestamp, kind, command_json) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![project_id, next, format_ts(&entry.timestamp), entry.command.kind(), json],
        )?;
        tx.commit()?;
        Ok(next as usize)
    }

    async fn clear_journal(&self, project_id: &str) -> EngineResult<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM memory_journal WHERE project_id = ?1", params![project_id])?;
        Ok(())
    }

    async fn journal_version(&self, project_id: &str) -> EngineResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM memory_journal WHERE project_id = ?1",
            params![project_id],
            |r| r.get(0),
        )?;
        Ok(count as usize)
    }

    async fn clear_project(&self, project_id: &str) -> EngineResult<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM memory_journal WHERE project_id = ?1", params![project_id])?;
        tx.execute("DELETE FROM memory_files WHERE project_id = ?1", params![project_id])?;
        tx.commit()?;
        info!("[store] Cleared journal and memory for project {}", project_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::JournalCommand;
    use chrono::TimeZone;
    use serde_json::json;

    fn test_store() -> SqliteMemoryStore {
        SqliteMemoryStore::open_in_memory().unwrap()
    }

    fn file(path: &str, content: &str) -> MemoryFile {
        let now = Utc::now();
        MemoryFile { path: path.into(), content: content.into(), created_at: now, updated_at: now }
    }

    #[tokio::test]
    async fn memory_round_trips_with_exact_timestamps() {
        let store = test_store();
        let fs: MemoryFileSystem = vec![file("/memories/a", "x"), file("/memories/b", "y\nz")].into_iter().collect();
        store.save_memory("p", &fs).await.unwrap();
        assert_eq!(store.load_memory("p").await.unwrap(), fs);
        assert!(store.load_memory("other").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_memory_replaces_previous_files() {
        let store = test_store();
        let first: MemoryFileSystem = vec![file("/a", "1"), file("/b", "2")].into_iter().collect();
        let second: MemoryFileSystem = vec![file("/c", "3")].into_iter().collect();
        store.save_memory("p", &first).await.unwrap();
        store.save_memory("p", &second).await.unwrap();
        let loaded = store.load_memory("p").await.unwrap();
        assert_eq!(loaded.paths().collect::<Vec<_>>(), vec!["/c"]);
    }

    #[tokio::test]
    async fn journal_versions_are_dense_per_project() {
        let store = test_store();
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let e = JournalEntry::new(JournalCommand::Delete { path: "/a".into() }, ts);
        assert_eq!(store.save_journal_entry("p", &e).await.unwrap(), 1);
        assert_eq!(store.save_journal_entry("p", &e).await.unwrap(), 2);
        assert_eq!(store.save_journal_entry("q", &e).await.unwrap(), 1);
        assert_eq!(store.journal_version("p").await.unwrap(), 2);
        assert_eq!(store.load_journal("p").await.unwrap(), vec![e.clone(), e]);
    }

    #[tokio::test]
    async fn foreign_journal_rows_load_as_unrecognized() {
        let store = test_store();
        {
            let conn = store.conn.lock();
            conn.execute(
                "INSERT INTO memory_journal (project_id, version, timestamp, kind, command_json) VALUES ('p', 1, '2024-01-01T00:00:00Z', 'chmod', ?1)",
                params![json!({"command": "chmod", "path": "/a"}).to_string()],
            )
            .unwrap();
        }
        let journal = store.load_journal("p").await.unwrap();
        assert_eq!(journal.len(), 1);
        assert!(matches!(journal[0].command, EntryCommand::Unrecognized { .. }));
    }

    #[tokio::test]
    async fn clear_project_empties_both_tables() {
        let store = test_store();
        let fs: MemoryFileSystem = vec![file("/a", "1")].into_iter().collect();
        store.save_memory("p", &fs).await.unwrap();
        store
            .save_journal_entry("p", &JournalEntry::new(JournalCommand::Delete { path: "/a".into() }, Utc::now()))
            .await
            .unwrap();
        assert_eq!(store.list_projects().unwrap(), vec!["p".to_string()]);

        store.clear_project("p").await.unwrap();
        assert!(store.load_memory("p").await.unwrap().is_empty());
        assert_eq!(store.journal_version("p").await.unwrap(), 0);
        assert!(store.list_projects().unwrap().is_empty());
    }
}
