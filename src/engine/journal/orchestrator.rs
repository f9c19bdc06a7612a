// Memory Journal — Verification & Rollback Orchestrator
//
// Composes replay and diff against the persisted canonical state. The journal
// is append-only: corrective actions (rollback, user edit, user delete) are new
// entries, never rewrites of old ones.
//
// Every operation holds the project's lock for its whole read-modify-write,
// so there is one writer per project at a time. Storage failures propagate as
// failures of the whole operation; replay anomalies are reported, not fatal.

use crate::atoms::constants::MEMORY_TOOL_NAME;
use crate::atoms::error::{CommandError, EngineError, EngineResult};
use crate::atoms::types::*;
use crate::engine::journal::diff::{compare_file_systems, diff_lines, diff_stats};
use crate::engine::journal::handlers;
use crate::engine::journal::locks::ProjectLocks;
use crate::engine::journal::replay::replay;
use crate::engine::store::MemoryBackend;
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

pub struct MemoryJournal<B: MemoryBackend> {
    backend: Arc<B>,
    locks: ProjectLocks,
    log_replay_warnings: bool,
}

impl<B: MemoryBackend> MemoryJournal<B> {
    pub fn new(backend: Arc<B>) -> Self {
        MemoryJournal {
            backend,
            locks: ProjectLocks::new(),
            log_replay_warnings: true,
        }
    }

    /// Whether tolerated replay anomalies (double deletes) are logged at warn.
    pub fn with_replay_warnings_logged(mut self, enabled: bool) -> Self {
        self.log_replay_warnings = enabled;
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    // ── Agent tool path ────────────────────────────────────────────────

    /// Run one memory tool command against the live filesystem. On success the
    /// new state is persisted and the command journaled; on failure nothing is
    /// written and the error comes back as `is_error` content. Views never
    /// touch the journal.
    pub async fn apply_command(&self, project_id: &str, command: ToolCommand) -> EngineResult<CommandOutcome> {
        let _guard = self.locks.acquire(project_id).await;
        let mut fs = self.backend.load_memory(project_id).await?;
        let version = self.backend.journal_version(project_id).await?;

        if let ToolCommand::View { path, view_range } = &command {
            return Ok(outcome(handlers::view(&fs, path, *view_range), version));
        }
        let Some(journal_command) = command.to_journal() else {
            return Err(EngineError::tool(MEMORY_TOOL_NAME, "read-only command cannot be journaled"));
        };

        let now = Utc::now();
        match handlers::apply(&mut fs, &journal_command, now) {
            Ok(message) => {
                let kind = journal_command.kind();
                self.backend.save_memory(project_id, &fs).await?;
                let version = self
                    .backend
                    .save_journal_entry(project_id, &JournalEntry::new(journal_command, now))
                    .await?;
                info!("[journal] {} applied to project {} → version {}", kind, project_id, version);
                Ok(outcome(Ok(message), version))
            }
            Err(e) => {
                info!("[journal] {} rejected for project {}: {}", journal_command.kind(), project_id, e);
                Ok(outcome(Err(e), version))
            }
        }
    }

    // ── Verification ───────────────────────────────────────────────────

    /// Replay the full journal and diff it against the persisted state.
    /// Read-only: a drifted project is reported, never repaired here.
    pub async fn verify(&self, project_id: &str) -> EngineResult<VerifyReport> {
        let _guard = self.locks.acquire(project_id).await;
        let (report, _) = self.verify_unlocked(project_id).await?;
        Ok(report)
    }

    /// Overwrite the persisted state with the replayed journal. `report` is
    /// the verification the caller confirmed; if the project changed since,
    /// nothing is written and `Conflict` is returned. Returns the diff that
    /// was repaired (empty when the project was already consistent).
    pub async fn restore_from_journal(&self, project_id: &str, report: &VerifyReport) -> EngineResult<FileSystemDiff> {
        let _guard = self.locks.acquire(project_id).await;
        let (current, replayed) = self.verify_unlocked(project_id).await?;

        if current.journal_version != report.journal_version || current.diff != report.diff {
            return Err(EngineError::Conflict(format!(
                "project {} changed since verification (version {} → {})",
                project_id, report.journal_version, current.journal_version
            )));
        }
        if current.is_consistent() {
            return Ok(current.diff);
        }

        self.backend.save_memory(project_id, &replayed).await?;
        warn!(
            "[journal] Restored project {} from journal v{}: {} added, {} removed, {} modified",
            project_id,
            current.journal_version,
            current.diff.added.len(),
            current.diff.removed.len(),
            current.diff.modified.len()
        );
        Ok(current.diff)
    }

    async fn verify_unlocked(&self, project_id: &str) -> EngineResult<(VerifyReport, MemoryFileSystem)> {
        let journal = self.backend.load_journal(project_id).await?;
        let persisted = self.backend.load_memory(project_id).await?;
        let replayed = replay(&journal, journal.len());
        self.log_anomalies(project_id, &replayed);

        let diff = compare_file_systems(&replayed.fs, &persisted);
        if !diff.is_empty() {
            warn!(
                "[journal] Project {} drifted from its journal: {} path(s) differ",
                project_id,
                diff.total()
            );
        }
        let report = VerifyReport {
            journal_version: journal.len(),
            diff,
            replay_errors: replayed.errors,
            replay_warnings: replayed.warnings,
        };
        Ok((report, replayed.fs))
    }

    // ── Inspection ─────────────────────────────────────────────────────

    /// What entry `version` did to `path`: inline diff of the file's content
    /// after `version - 1` entries against after `version` entries. A file
    /// absent on either side counts as empty.
    pub async fn inspect_version(&self, project_id: &str, version: usize, path: &str) -> EngineResult<VersionDiff> {
        let _guard = self.locks.acquire(project_id).await;
        let journal = self.backend.load_journal(project_id).await?;
        if version == 0 || version > journal.len() {
            return Err(EngineError::VersionOutOfRange { version, latest: journal.len() });
        }

        let before = replay(&journal, version - 1);
        let after = replay(&journal, version);
        let old = before.fs.content(path).unwrap_or("");
        let new = after.fs.content(path).unwrap_or("");
        let lines = diff_lines(old, new);

        Ok(VersionDiff {
            version,
            path: path.to_string(),
            entry_kind: journal[version - 1].command.kind().to_string(),
            stats: diff_stats(&lines),
            lines: lines.iter().map(ToString::to_string).collect(),
        })
    }

    /// The whole reconstructed tree at `version` (0 = empty).
    pub async fn snapshot_at(&self, project_id: &str, version: usize) -> EngineResult<ReplayResult> {
        let _guard = self.locks.acquire(project_id).await;
        let journal = self.backend.load_journal(project_id).await?;
        if version > journal.len() {
            return Err(EngineError::VersionOutOfRange { version, latest: journal.len() });
        }
        Ok(replay(&journal, version))
    }

    pub async fn history(&self, project_id: &str) -> EngineResult<Vec<HistoryItem>> {
        let _guard = self.locks.acquire(project_id).await;
        let journal = self.backend.load_journal(project_id).await?;
        Ok(journal
            .iter()
            .enumerate()
            .map(|(i, entry)| HistoryItem {
                version: i + 1,
                timestamp: entry.timestamp,
                kind: entry.command.kind().to_string(),
                paths: entry
                    .command
                    .as_known()
                    .map(|c| c.paths().into_iter().map(str::to_string).collect())
                    .unwrap_or_default(),
            })
            .collect())
    }

    pub async fn journal_version(&self, project_id: &str) -> EngineResult<usize> {
        self.backend.journal_version(project_id).await
    }

    /// Current persisted filesystem.
    pub async fn current(&self, project_id: &str) -> EngineResult<MemoryFileSystem> {
        let _guard = self.locks.acquire(project_id).await;
        self.backend.load_memory(project_id).await
    }

    // ── Corrective actions ─────────────────────────────────────────────

    /// Restore `path` to its content at `version` by appending a
    /// `user_rollback` entry. The entries being undone stay in the journal.
    pub async fn rollback_file(&self, project_id: &str, path: &str, version: usize) -> EngineResult<RollbackOutcome> {
        let _guard = self.locks.acquire(project_id).await;
        let journal = self.backend.load_journal(project_id).await?;
        if version > journal.len() {
            return Err(EngineError::VersionOutOfRange { version, latest: journal.len() });
        }

        let target = replay(&journal, version)
            .fs
            .content(path)
            .map(str::to_string)
            .ok_or_else(|| EngineError::FileNotPresentAtVersion { path: path.to_string(), version })?;

        let mut fs = self.backend.load_memory(project_id).await?;
        if fs.content(path) == Some(target.as_str()) {
            info!("[journal] Rollback of {} to v{} is a no-op", path, version);
            return Ok(RollbackOutcome::Unchanged);
        }

        let now = Utc::now();
        handlers::create(&mut fs, path, &target, now)?;
        self.backend.save_memory(project_id, &fs).await?;
        let new_version = self
            .backend
            .save_journal_entry(
                project_id,
                &JournalEntry::new(JournalCommand::UserRollback { path: path.to_string(), file_text: target }, now),
            )
            .await?;
        info!(
            "[journal] Rolled back {} in project {} to v{} → version {}",
            path, project_id, version, new_version
        );
        Ok(RollbackOutcome::RolledBack { version: new_version })
    }

    /// Save a human edit directly, bypassing the command handlers. Saving
    /// identical content appends nothing.
    pub async fn user_edit(&self, project_id: &str, path: &str, content: &str) -> EngineResult<EditOutcome> {
        let _guard = self.locks.acquire(project_id).await;
        let mut fs = self.backend.load_memory(project_id).await?;
        if fs.content(path) == Some(content) {
            return Ok(EditOutcome::Unchanged);
        }

        let now = Utc::now();
        handlers::create(&mut fs, path, content, now)?;
        self.backend.save_memory(project_id, &fs).await?;
        let version = self
            .backend
            .save_journal_entry(
                project_id,
                &JournalEntry::new(
                    JournalCommand::UserEdit { path: path.to_string(), file_text: content.to_string() },
                    now,
                ),
            )
            .await?;
        info!("[journal] User edit of {} in project {} → version {}", path, project_id, version);
        Ok(EditOutcome::Saved { version })
    }

    /// Delete a file on a human's behalf; journaled as a plain `delete`.
    pub async fn user_delete(&self, project_id: &str, path: &str) -> EngineResult<usize> {
        let _guard = self.locks.acquire(project_id).await;
        let mut fs = self.backend.load_memory(project_id).await?;
        handlers::delete(&mut fs, path)?;

        self.backend.save_memory(project_id, &fs).await?;
        let version = self
            .backend
            .save_journal_entry(
                project_id,
                &JournalEntry::new(JournalCommand::Delete { path: path.to_string() }, Utc::now()),
            )
            .await?;
        info!("[journal] User deleted {} in project {} → version {}", path, project_id, version);
        Ok(version)
    }

    /// Discard journal and persisted state together. Does nothing unless
    /// `confirmed`; returns whether the project was cleared.
    pub async fn clear_all(&self, project_id: &str, confirmed: bool) -> EngineResult<bool> {
        if !confirmed {
            info!("[journal] Clear of project {} not confirmed; nothing changed", project_id);
            return Ok(false);
        }
        {
            let _guard = self.locks.acquire(project_id).await;
            self.backend.clear_project(project_id).await?;
        }
        self.locks.prune_idle();
        warn!("[journal] Cleared all memory and journal for project {}", project_id);
        Ok(true)
    }

    fn log_anomalies(&self, project_id: &str, replayed: &ReplayResult) {
        for e in &replayed.errors {
            warn!("[journal] Replay error in project {}: {}", project_id, e);
        }
        if self.log_replay_warnings {
            for w in &replayed.warnings {
                warn!("[journal] Replay warning in project {}: {}", project_id, w);
            }
        }
    }
}

fn outcome(result: Result<String, CommandError>, version: usize) -> CommandOutcome {
    match result {
        Ok(content) => CommandOutcome { content, is_error: false, version },
        Err(e) => CommandOutcome { content: e.to_string(), is_error: true, version },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::store::SqliteMemoryStore;

    fn journal() -> MemoryJournal<SqliteMemoryStore> {
        MemoryJournal::new(Arc::new(SqliteMemoryStore::open_in_memory().unwrap()))
    }

    fn create(path: &str, text: &str) -> ToolCommand {
        ToolCommand::Create { path: path.into(), file_text: text.into() }
    }

    #[tokio::test]
    async fn failed_commands_are_not_journaled() {
        let j = journal();
        let out = j
            .apply_command("p", ToolCommand::Delete { path: "/memories/none".into() })
            .await
            .unwrap();
        assert!(out.is_error);
        assert_eq!(out.version, 0);
        assert_eq!(j.journal_version("p").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn views_are_not_journaled() {
        let j = journal();
        j.apply_command("p", create("/memories/a", "x")).await.unwrap();
        let out = j
            .apply_command("p", ToolCommand::View { path: "/memories".into(), view_range: None })
            .await
            .unwrap();
        assert!(!out.is_error);
        assert!(out.content.contains("/memories/a"));
        assert_eq!(j.journal_version("p").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn user_edit_with_same_content_is_a_no_op() {
        let j = journal();
        j.apply_command("p", create("/a", "x")).await.unwrap();
        assert_eq!(j.user_edit("p", "/a", "x").await.unwrap(), EditOutcome::Unchanged);
        assert_eq!(j.user_edit("p", "/a", "y").await.unwrap(), EditOutcome::Saved { version: 2 });
        assert_eq!(j.current("p").await.unwrap().content("/a"), Some("y"));
    }

    #[tokio::test]
    async fn user_delete_missing_path_fails_without_entry() {
        let j = journal();
        let err = j.user_delete("p", "/a").await.unwrap_err();
        assert!(matches!(err, EngineError::Command(CommandError::PathNotFound { .. })));
        assert_eq!(j.journal_version("p").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn inspect_rejects_versions_outside_the_journal() {
        let j = journal();
        j.apply_command("p", create("/a", "x")).await.unwrap();
        assert!(matches!(
            j.inspect_version("p", 0, "/a").await,
            Err(EngineError::VersionOutOfRange { version: 0, latest: 1 })
        ));
        assert!(matches!(
            j.inspect_version("p", 2, "/a").await,
            Err(EngineError::VersionOutOfRange { version: 2, latest: 1 })
        ));
    }

    #[tokio::test]
    async fn inspect_shows_only_the_selected_entry() {
        let j = journal();
        j.apply_command("p", create("/a", "one")).await.unwrap();
        j.apply_command("p", create("/b", "other")).await.unwrap();
        j.apply_command(
            "p",
            ToolCommand::Insert { path: "/a".into(), insert_line: 1, insert_text: "two".into() },
        )
        .await
        .unwrap();

        // Entry 2 touched /b only, so /a is unchanged there.
        let v2 = j.inspect_version("p", 2, "/a").await.unwrap();
        assert_eq!(v2.lines, vec!["  one"]);
        assert_eq!(v2.entry_kind, "create");

        let v3 = j.inspect_version("p", 3, "/a").await.unwrap();
        assert_eq!(v3.lines, vec!["  one", "+ two"]);
        assert_eq!(v3.stats.added, 1);
    }

    #[tokio::test]
    async fn rollback_to_version_without_file_fails() {
        let j = journal();
        j.apply_command("p", create("/a", "x")).await.unwrap();
        j.apply_command("p", create("/b", "y")).await.unwrap();
        assert!(matches!(
            j.rollback_file("p", "/b", 1).await,
            Err(EngineError::FileNotPresentAtVersion { version: 1, .. })
        ));
        assert_eq!(j.rollback_file("p", "/a", 2).await.unwrap(), RollbackOutcome::Unchanged);
        assert_eq!(j.journal_version("p").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn rollback_restores_a_deleted_file() {
        let j = journal();
        j.apply_command("p", create("/a", "keep me")).await.unwrap();
        j.user_delete("p", "/a").await.unwrap();
        let out = j.rollback_file("p", "/a", 1).await.unwrap();
        assert_eq!(out, RollbackOutcome::RolledBack { version: 3 });
        assert_eq!(j.current("p").await.unwrap().content("/a"), Some("keep me"));
        assert!(j.verify("p").await.unwrap().is_consistent());
    }

    #[tokio::test]
    async fn clear_requires_confirmation() {
        let j = journal();
        j.apply_command("p", create("/a", "x")).await.unwrap();
        assert!(!j.clear_all("p", false).await.unwrap());
        assert_eq!(j.journal_version("p").await.unwrap(), 1);
        assert!(j.clear_all("p", true).await.unwrap());
        assert_eq!(j.journal_version("p").await.unwrap(), 0);
        assert!(j.current("p").await.unwrap().is_empty());
        j.clear_all("p", true).await.unwrap();
        assert_eq!(j.locks.tracked_projects(), 0);
    }

    #[tokio::test]
    async fn history_lists_every_entry() {
        let j = journal();
        j.apply_command("p", create("/a", "x")).await.unwrap();
        j.apply_command("p", ToolCommand::Rename { old_path: "/a".into(), new_path: "/b".into() })
            .await
            .unwrap();
        let h = j.history("p").await.unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[1].version, 2);
        assert_eq!(h[1].kind, "rename");
        assert_eq!(h[1].paths, vec!["/a", "/b"]);
    }
}
