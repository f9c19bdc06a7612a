// Memory Journal — Replay Engine
// Rebuilds a project's memory filesystem at any version by re-running the
// journal from the empty state. Pure and best-effort: anomalies are collected,
// never thrown, and replay always reaches the target version.

use crate::atoms::error::CommandError;
use crate::atoms::types::{EntryCommand, JournalCommand, JournalEntry, MemoryFileSystem, ReplayResult};
use crate::engine::journal::handlers;
use log::debug;

/// Reconstruct the filesystem after the first `target_version` entries.
/// A target past the end of the journal replays the whole journal.
///
/// Policy on top of the live handlers:
///   • `view` entries are skipped.
///   • `delete` of a missing path succeeds; it is noted in `warnings`.
///   • `user_edit` / `user_rollback` replace the file's content outright.
///   • Unknown kinds and handler failures are recorded in `errors` and skipped.
pub fn replay(journal: &[JournalEntry], target_version: usize) -> ReplayResult {
    let mut result = ReplayResult::default();
    let end = target_version.min(journal.len());

    for (i, entry) in journal[..end].iter().enumerate() {
        let now = entry.timestamp;
        let command = match &entry.command {
            EntryCommand::Known(command) => command,
            EntryCommand::Unrecognized { kind, .. } => {
                result.errors.push(format!("Unknown command at entry {}: {}", i, kind));
                continue;
            }
            EntryCommand::Malformed { kind, reason, .. } => {
                result.errors.push(format!("Entry {} ({}): {}", i, kind, reason));
                continue;
            }
        };

        let outcome = match command {
            JournalCommand::View { .. } => continue,
            JournalCommand::Delete { path } => match handlers::delete(&mut result.fs, path) {
                Err(CommandError::PathNotFound { .. }) => {
                    result
                        .warnings
                        .push(format!("Entry {} (delete): {} was already absent", i, path));
                    continue;
                }
                other => other,
            },
            JournalCommand::UserEdit { path, file_text } | JournalCommand::UserRollback { path, file_text } => {
                handlers::replace_content(&mut result.fs, path, file_text, now)
            }
            other => handlers::apply(&mut result.fs, other, now),
        };

        if let Err(e) = outcome {
            result.errors.push(format!("Entry {} ({}): {}", i, command.kind(), e));
        }
    }

    debug!(
        "[journal] Replayed {} of {} entries → {} files, {} errors, {} warnings",
        end,
        journal.len(),
        result.fs.len(),
        result.errors.len(),
        result.warnings.len()
    );
    result
}

/// Replay the whole journal.
pub fn replay_all(journal: &[JournalEntry]) -> MemoryFileSystem {
    replay(journal, journal.len()).fs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn entry(i: i64, command: JournalCommand) -> JournalEntry {
        JournalEntry::new(command, Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap())
    }

    fn create(path: &str, text: &str) -> JournalCommand {
        JournalCommand::Create { path: path.into(), file_text: text.into() }
    }

    fn delete(path: &str) -> JournalCommand {
        JournalCommand::Delete { path: path.into() }
    }

    fn journal(commands: Vec<JournalCommand>) -> Vec<JournalEntry> {
        commands.into_iter().enumerate().map(|(i, c)| entry(i as i64, c)).collect()
    }

    #[test]
    fn replay_is_deterministic() {
        let j = journal(vec![
            create("/a", "hello"),
            JournalCommand::StrReplace { path: "/a".into(), old_str: "hello".into(), new_str: "world".into() },
            create("/b", "x"),
            JournalCommand::Rename { old_path: "/b".into(), new_path: "/c".into() },
            JournalCommand::StrReplace { path: "/missing".into(), old_str: "a".into(), new_str: "b".into() },
        ]);
        for v in 0..=j.len() {
            assert_eq!(replay(&j, v), replay(&j, v));
        }
    }

    #[test]
    fn version_zero_is_empty() {
        let j = journal(vec![create("/a", "x")]);
        let r = replay(&j, 0);
        assert!(r.fs.is_empty());
        assert!(r.errors.is_empty());
    }

    #[test]
    fn double_delete_is_silent() {
        let j = journal(vec![create("/a", "x"), delete("/a"), delete("/a")]);
        let r = replay(&j, 3);
        assert!(r.fs.is_empty());
        assert!(r.errors.is_empty());
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn user_edit_is_full_replacement() {
        let j = journal(vec![
            create("/a", "x"),
            JournalCommand::UserEdit { path: "/a".into(), file_text: "z".into() },
        ]);
        assert_eq!(replay(&j, 2).fs.content("/a"), Some("z"));
    }

    #[test]
    fn user_rollback_recreates_a_deleted_file() {
        let j = journal(vec![
            create("/a", "x"),
            delete("/a"),
            JournalCommand::UserRollback { path: "/a".into(), file_text: "x".into() },
        ]);
        let r = replay(&j, 3);
        assert_eq!(r.fs.content("/a"), Some("x"));
        assert!(r.errors.is_empty());
    }

    #[test]
    fn view_entries_are_skipped() {
        let j = journal(vec![create("/a", "x"), JournalCommand::View { path: "/nowhere".into() }]);
        let r = replay(&j, 2);
        assert_eq!(r.fs.len(), 1);
        assert!(r.errors.is_empty());
    }

    #[test]
    fn unknown_and_failed_entries_are_reported_and_skipped() {
        let mut j = journal(vec![create("/a", "x")]);
        j.push(JournalEntry {
            timestamp: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
            command: EntryCommand::from_value(json!({"command": "chmod", "path": "/a"})),
        });
        j.push(entry(2, JournalCommand::StrReplace { path: "/a".into(), old_str: "q".into(), new_str: "r".into() }));
        j.push(entry(3, create("/b", "y")));

        let r = replay(&j, j.len());
        assert_eq!(r.errors.len(), 2);
        assert_eq!(r.errors[0], "Unknown command at entry 1: chmod");
        assert!(r.errors[1].starts_with("Entry 2 (str_replace): "));
        assert_eq!(r.fs.content("/a"), Some("x"));
        assert_eq!(r.fs.content("/b"), Some("y"));
    }

    #[test]
    fn malformed_known_kind_is_reported_with_decode_reason() {
        let mut j = journal(vec![create("/a", "x")]);
        j.push(JournalEntry {
            timestamp: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
            command: EntryCommand::from_value(json!({"command": "create", "path": "/b"})),
        });
        let reason = match &j[1].command {
            EntryCommand::Malformed { reason, .. } => reason.clone(),
            other => panic!("expected malformed entry, got {:?}", other),
        };

        let r = replay(&j, j.len());
        assert_eq!(r.errors, vec![format!("Entry 1 (create): {}", reason)]);
        assert!(reason.contains("file_text"));
        assert!(!r.fs.contains("/b"));
        assert_eq!(r.fs.content("/a"), Some("x"));
    }

    #[test]
    fn timestamps_come_from_entries() {
        let j = journal(vec![create("/a", "x"), create("/a", "y")]);
        let f = replay(&j, 2).fs.get("/a").cloned().unwrap();
        assert_eq!(f.created_at, j[0].timestamp);
        assert_eq!(f.updated_at, j[1].timestamp);
    }

    #[test]
    fn target_beyond_journal_replays_everything() {
        let j = journal(vec![create("/a", "x")]);
        assert_eq!(replay(&j, 99).fs, replay_all(&j));
    }
}
