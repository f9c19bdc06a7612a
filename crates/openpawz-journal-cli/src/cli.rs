//! CLI argument definitions for pawz-journal
//!
//! Uses clap derive. Global flags override the config file; the config file
//! overrides built-in defaults.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pawz-journal - versioned agent memory
///
/// Every change an agent (or you) makes to its memory files is journaled.
/// Browse history, diff any version, verify live state against the journal,
/// and roll files back.
#[derive(Parser, Debug)]
#[command(name = "pawz-journal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// SQLite database holding memory and journal
    #[arg(long, global = true, env = "PAWZ_JOURNAL_DB")]
    pub db: Option<PathBuf>,

    /// Project whose memory to operate on
    #[arg(long, short = 'p', global = true, env = "PAWZ_JOURNAL_PROJECT")]
    pub project: Option<String>,

    /// Config file (default: <config dir>/openpawz/journal.toml)
    #[arg(long, global = true, env = "PAWZ_JOURNAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    // ── Agent tool commands ────────────────────────────────────────────
    /// Show a file with line numbers, or list a directory
    View {
        /// Path to view (default: /memories)
        path: Option<String>,
        /// 1-based inclusive line range; END of -1 means last line
        #[arg(long, num_args = 2, value_names = ["START", "END"], allow_negative_numbers = true)]
        range: Option<Vec<i64>>,
    },

    /// Create or overwrite a file
    Create {
        path: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Replace one exact, unique occurrence of OLD with NEW
    StrReplace { path: String, old: String, new: String },

    /// Insert TEXT before 0-based line LINE
    Insert {
        path: String,
        #[arg(allow_negative_numbers = true)]
        line: i64,
        text: String,
    },

    /// Delete a file
    Delete { path: String },

    /// Move a file; the destination must not exist
    Rename { old_path: String, new_path: String },

    // ── User actions ───────────────────────────────────────────────────
    /// Save a file as a user edit
    #[command(after_help = "EXAMPLES:
    # Replace a memory file with a local file's contents
    pawz-journal edit /memories/prefs.md --file prefs.md

    # Pipe content in
    echo 'dark mode' | pawz-journal edit /memories/prefs.md
")]
    Edit {
        path: String,
        #[command(flatten)]
        content: ContentArgs,
    },

    /// Delete a file as a user action
    Rm { path: String },

    // ── History ────────────────────────────────────────────────────────
    /// List journal entries
    Log,

    /// Show what journal entry VERSION changed in PATH
    Show { version: usize, path: String },

    /// Reconstruct memory as of VERSION (0 = empty)
    Cat {
        version: usize,
        /// Print one file's content instead of the listing
        #[arg(long)]
        path: Option<String>,
    },

    /// Restore PATH to its content at VERSION
    Rollback { path: String, version: usize },

    // ── Integrity ──────────────────────────────────────────────────────
    /// Replay the journal and compare it with live memory
    #[command(after_help = "EXAMPLES:
    # Report drift only
    pawz-journal verify

    # Overwrite live memory with the journal replay
    pawz-journal verify --repair --yes
")]
    Verify {
        /// Overwrite live memory with the journal replay if they differ
        #[arg(long)]
        repair: bool,
        /// Confirm the repair
        #[arg(long, requires = "repair")]
        yes: bool,
    },

    /// Delete all memory and journal entries for the project
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// File content from exactly one source; stdin when neither flag is given.
#[derive(Args, Debug)]
pub struct ContentArgs {
    /// Content as an argument
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read content from a local file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pawz-journal", "log", "--project", "notes", "--json"]).unwrap();
        assert_eq!(cli.project.as_deref(), Some("notes"));
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Log));
    }

    #[test]
    fn verify_yes_requires_repair() {
        assert!(Cli::try_parse_from(["pawz-journal", "verify", "--yes"]).is_err());
        let cli = Cli::try_parse_from(["pawz-journal", "verify", "--repair", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Verify { repair: true, yes: true }));
    }

    #[test]
    fn view_range_accepts_negative_end() {
        let cli = Cli::try_parse_from(["pawz-journal", "view", "/memories/a", "--range", "2", "-1"]).unwrap();
        match cli.command {
            Commands::View { range, .. } => assert_eq!(range, Some(vec![2, -1])),
            other => panic!("unexpected {:?}", other),
        }
    }
}
