// ── Paw Atoms: Pure Data Types ────────────────────────────────────────────────
// Plain struct/enum definitions for the memory journal.
// Atoms layer rule: no I/O, no side effects, no imports from engine/.

use crate::atoms::constants::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

pub type Timestamp = DateTime<Utc>;

// ═════════════════════════════════════════════════════════════════════════════
// Memory filesystem
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryFile {
    pub path: String,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Flat path → file mapping for one project. Holds current content only.
/// Backed by a BTreeMap so iteration, listings and serialization are ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, MemoryFile>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&MemoryFile> {
        self.files.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut MemoryFile> {
        self.files.get_mut(path)
    }

    pub fn content(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|f| f.content.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Insert keyed by `file.path`, returning the entry it displaced.
    pub fn insert(&mut self, file: MemoryFile) -> Option<MemoryFile> {
        self.files.insert(file.path.clone(), file)
    }

    pub fn remove(&mut self, path: &str) -> Option<MemoryFile> {
        self.files.remove(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &MemoryFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<MemoryFile> for MemoryFileSystem {
    fn from_iter<I: IntoIterator<Item = MemoryFile>>(iter: I) -> Self {
        let mut fs = MemoryFileSystem::new();
        for file in iter {
            fs.insert(file);
        }
        fs
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Journal
// ═════════════════════════════════════════════════════════════════════════════

/// One mutation, exactly as journaled. Serialized with a `command` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum JournalCommand {
    Create {
        path: String,
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        new_str: String,
    },
    Insert {
        path: String,
        insert_line: i64,
        insert_text: String,
    },
    Delete {
        path: String,
    },
    Rename {
        old_path: String,
        new_path: String,
    },
    /// Read-only. Older journals recorded views; replay skips them.
    View {
        #[serde(default)]
        path: String,
    },
    UserEdit {
        path: String,
        file_text: String,
    },
    UserRollback {
        path: String,
        file_text: String,
    },
}

impl JournalCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            JournalCommand::Create { .. } => KIND_CREATE,
            JournalCommand::StrReplace { .. } => KIND_STR_REPLACE,
            JournalCommand::Insert { .. } => KIND_INSERT,
            JournalCommand::Delete { .. } => KIND_DELETE,
            JournalCommand::Rename { .. } => KIND_RENAME,
            JournalCommand::View { .. } => KIND_VIEW,
            JournalCommand::UserEdit { .. } => KIND_USER_EDIT,
            JournalCommand::UserRollback { .. } => KIND_USER_ROLLBACK,
        }
    }

    /// Paths this command touches (both ends for a rename).
    pub fn paths(&self) -> Vec<&str> {
        match self {
            JournalCommand::Rename { old_path, new_path } => vec![old_path.as_str(), new_path.as_str()],
            JournalCommand::Create { path, .. }
            | JournalCommand::StrReplace { path, .. }
            | JournalCommand::Insert { path, .. }
            | JournalCommand::Delete { path }
            | JournalCommand::View { path }
            | JournalCommand::UserEdit { path, .. }
            | JournalCommand::UserRollback { path, .. } => vec![path.as_str()],
        }
    }
}

/// What a persisted entry decodes to. Only decoding produces the non-`Known`
/// variants; in-process code always journals a `JournalCommand`.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryCommand {
    Known(JournalCommand),
    /// A recognised kind whose fields did not decode.
    Malformed {
        kind: String,
        reason: String,
        raw: serde_json::Value,
    },
    Unrecognized {
        kind: String,
        raw: serde_json::Value,
    },
}

impl EntryCommand {
    pub fn from_value(value: serde_json::Value) -> Self {
        let kind = value
            .get("command")
            .and_then(|k| k.as_str())
            .unwrap_or("<missing>")
            .to_string();
        if !KNOWN_KINDS.contains(&kind.as_str()) {
            return EntryCommand::Unrecognized { kind, raw: value };
        }
        match serde_json::from_value::<JournalCommand>(value.clone()) {
            Ok(command) => EntryCommand::Known(command),
            Err(e) => EntryCommand::Malformed {
                kind,
                reason: e.to_string(),
                raw: value,
            },
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            EntryCommand::Known(c) => c.kind(),
            EntryCommand::Malformed { kind, .. } | EntryCommand::Unrecognized { kind, .. } => kind.as_str(),
        }
    }

    pub fn as_known(&self) -> Option<&JournalCommand> {
        match self {
            EntryCommand::Known(c) => Some(c),
            _ => None,
        }
    }
}

impl From<JournalCommand> for EntryCommand {
    fn from(command: JournalCommand) -> Self {
        EntryCommand::Known(command)
    }
}

impl Serialize for EntryCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EntryCommand::Known(command) => command.serialize(serializer),
            // Round-trip what was read so a foreign entry is never rewritten.
            EntryCommand::Malformed { raw, .. } | EntryCommand::Unrecognized { raw, .. } => {
                raw.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for EntryCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(EntryCommand::from_value(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: Timestamp,
    pub command: EntryCommand,
}

impl JournalEntry {
    pub fn new(command: JournalCommand, timestamp: Timestamp) -> Self {
        JournalEntry { timestamp, command: EntryCommand::Known(command) }
    }
}

/// Filesystem reconstructed from a journal prefix. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplayResult {
    pub fs: MemoryFileSystem,
    pub errors: Vec<String>,
    /// Anomalies replay tolerated without counting them as errors
    /// (e.g. deleting a path that was already gone).
    pub warnings: Vec<String>,
}

// ═════════════════════════════════════════════════════════════════════════════
// Diffs
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

impl FileSystemDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn total(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

// ═════════════════════════════════════════════════════════════════════════════
// Orchestrator results
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyReport {
    pub journal_version: usize,
    /// `a` = replayed journal, `b` = persisted state.
    pub diff: FileSystemDiff,
    pub replay_errors: Vec<String>,
    pub replay_warnings: Vec<String>,
}

impl VerifyReport {
    pub fn is_consistent(&self) -> bool {
        self.diff.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDiff {
    pub version: usize,
    pub path: String,
    /// Kind of the entry that produced `version`.
    pub entry_kind: String,
    pub lines: Vec<String>,
    pub stats: DiffStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RollbackOutcome {
    RolledBack { version: usize },
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    Saved { version: usize },
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub version: usize,
    pub timestamp: Timestamp,
    pub kind: String,
    pub paths: Vec<String>,
}

// ═════════════════════════════════════════════════════════════════════════════
// Agent tool
// ═════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A memory tool invocation as the agent sends it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ToolCommand {
    View {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<[i64; 2]>,
    },
    Create {
        path: String,
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        new_str: String,
    },
    Insert {
        path: String,
        insert_line: i64,
        insert_text: String,
    },
    Delete {
        path: String,
    },
    Rename {
        old_path: String,
        new_path: String,
    },
}

impl ToolCommand {
    /// The entry to journal after this command succeeds; `None` for reads.
    pub fn to_journal(&self) -> Option<JournalCommand> {
        match self.clone() {
            ToolCommand::View { .. } => None,
            ToolCommand::Create { path, file_text } => Some(JournalCommand::Create { path, file_text }),
            ToolCommand::StrReplace { path, old_str, new_str } => {
                Some(JournalCommand::StrReplace { path, old_str, new_str })
            }
            ToolCommand::Insert { path, insert_line, insert_text } => {
                Some(JournalCommand::Insert { path, insert_line, insert_text })
            }
            ToolCommand::Delete { path } => Some(JournalCommand::Delete { path }),
            ToolCommand::Rename { old_path, new_path } => Some(JournalCommand::Rename { old_path, new_path }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub content: String,
    pub is_error: bool,
    /// Journal version after the call (unchanged on error or view).
    pub version: usize,
}
