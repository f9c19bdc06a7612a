// Memory Journal
// An append-only log of every mutation to an agent's memory filesystem.
// Replaying the log from empty reconstructs any historical version; diffing
// the replay against persisted state detects drift.
//
// Module layout:
//   handlers     — pure mutations over a MemoryFileSystem
//   replay       — rebuild the filesystem as of a version
//   diff         — filesystem comparison and LCS line diff
//   orchestrator — MemoryJournal: verify, repair, inspect, rollback, edits
//   locks        — one writer per project
//   sequencer    — stale-result suppression for version browsing

pub mod diff;
pub mod handlers;
pub mod locks;
pub mod orchestrator;
pub mod replay;
pub mod sequencer;

pub use orchestrator::MemoryJournal;
pub use sequencer::{BrowserView, RequestSequencer, RequestToken, VersionBrowser};
