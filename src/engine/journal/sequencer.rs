// Memory Journal — Request sequencing for interactive browsing
//
// Version browsing issues one replay per navigation step. When steps overlap,
// a slower, older request must not overwrite the view produced by a newer
// one. Every request takes a monotonically increasing token; a result is
// accepted only while its token is still the newest issued.

use crate::atoms::error::EngineResult;
use crate::atoms::types::{ReplayResult, VersionDiff};
use crate::engine::journal::orchestrator::MemoryJournal;
use crate::engine::store::MemoryBackend;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token that supersedes every earlier one.
    pub fn begin(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Hand `value` back only if `token` is still current.
    pub fn accept<T>(&self, token: RequestToken, value: T) -> Option<T> {
        if self.is_current(token) {
            Some(value)
        } else {
            debug!("[journal] Dropping superseded result for request {}", token.0);
            None
        }
    }
}

/// What the browser is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserView {
    Snapshot { version: usize, replay: ReplayResult },
    FileDiff(VersionDiff),
}

/// Version navigation over one project, discarding stale results.
pub struct VersionBrowser<B: MemoryBackend> {
    journal: Arc<MemoryJournal<B>>,
    project_id: String,
    sequencer: RequestSequencer,
    current: Mutex<Option<BrowserView>>,
}

impl<B: MemoryBackend> VersionBrowser<B> {
    pub fn new(journal: Arc<MemoryJournal<B>>, project_id: impl Into<String>) -> Self {
        VersionBrowser {
            journal,
            project_id: project_id.into(),
            sequencer: RequestSequencer::new(),
            current: Mutex::new(None),
        }
    }

    /// Show the whole tree at `version`. Returns `None` when a newer
    /// navigation superseded this one before it finished.
    pub async fn show_snapshot(&self, version: usize) -> EngineResult<Option<BrowserView>> {
        let token = self.sequencer.begin();
        let replay = self.journal.snapshot_at(&self.project_id, version).await?;
        Ok(self.deliver(token, BrowserView::Snapshot { version, replay }))
    }

    /// Show what entry `version` changed in `path`.
    pub async fn show_file_diff(&self, version: usize, path: &str) -> EngineResult<Option<BrowserView>> {
        let token = self.sequencer.begin();
        let diff = self.journal.inspect_version(&self.project_id, version, path).await?;
        Ok(self.deliver(token, BrowserView::FileDiff(diff)))
    }

    /// Install `view` if `token` is still current. The check runs under the
    /// view lock so a result superseded mid-delivery cannot overwrite a newer one.
    pub fn deliver(&self, token: RequestToken, view: BrowserView) -> Option<BrowserView> {
        let mut current = self.current.lock();
        let accepted = self.sequencer.accept(token, view)?;
        *current = Some(accepted.clone());
        Some(accepted)
    }

    pub fn begin(&self) -> RequestToken {
        self.sequencer.begin()
    }

    pub fn current(&self) -> Option<BrowserView> {
        self.current.lock().clone()
    }
}
