// ── Paw Atoms: Constants ───────────────────────────────────────────────────
// All named constants for the crate live here.

// ── Memory namespace ───────────────────────────────────────────────────────
// Paths are opaque keys; this prefix is only a convention the agent is told
// about in the tool description and that `view` uses as its default root.
pub const MEMORY_ROOT: &str = "/memories";

// ── Journal command kinds ─────────────────────────────────────────────────
// The `command` tag written into every persisted journal entry. Treat as a
// stable on-disk format: renaming one orphans existing journals.
pub const KIND_CREATE: &str = "create";
pub const KIND_STR_REPLACE: &str = "str_replace";
pub const KIND_INSERT: &str = "insert";
pub const KIND_DELETE: &str = "delete";
pub const KIND_RENAME: &str = "rename";
pub const KIND_VIEW: &str = "view";
pub const KIND_USER_EDIT: &str = "user_edit";
pub const KIND_USER_ROLLBACK: &str = "user_rollback";

/// Every kind a persisted entry may carry and still decode as a known command.
pub const KNOWN_KINDS: &[&str] = &[
    KIND_CREATE,
    KIND_STR_REPLACE,
    KIND_INSERT,
    KIND_DELETE,
    KIND_RENAME,
    KIND_VIEW,
    KIND_USER_EDIT,
    KIND_USER_ROLLBACK,
];

// ── Agent tool ─────────────────────────────────────────────────────────────
pub const MEMORY_TOOL_NAME: &str = "memory";

/// Width of the right-aligned line-number gutter in `view` output.
pub(crate) const VIEW_LINE_NUMBER_WIDTH: usize = 6;

// ── Defaults for configuration ─────────────────────────────────────────────
pub const DEFAULT_PROJECT_ID: &str = "default";
pub(crate) const CONFIG_DIR_NAME: &str = "openpawz";
pub(crate) const CONFIG_FILE_NAME: &str = "journal.toml";
pub(crate) const DB_FILE_NAME: &str = "memory-journal.db";
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
