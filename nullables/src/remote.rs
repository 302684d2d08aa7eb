//! Nullable remote: canned proposals instead of an on-chain indexer.

use econexus_store::{RemoteProposalSource, StoreError};
use econexus_types::{Proposal, ProposalId};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// A remote proposal source that serves a fixed list and records how often
/// it was asked.
pub struct NullRemote {
    proposals: Mutex<Vec<Proposal>>,
    available: AtomicBool,
    fetches: AtomicU64,
}

impl NullRemote {
    pub fn new(proposals: Vec<Proposal>) -> Self {
        Self {
            proposals: Mutex::new(proposals),
            available: AtomicBool::new(true),
            fetches: AtomicU64::new(0),
        }
    }

    /// A remote that reports itself unreachable.
    pub fn unavailable() -> Self {
        let remote = Self::new(Vec::new());
        remote.set_available(false);
        remote
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of fetch calls served.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl RemoteProposalSource for NullRemote {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn fetch_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        if !self.is_available() {
            return Err(StoreError::Backend("remote unavailable".to_string()));
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.proposals.lock().unwrap().clone())
    }

    fn fetch_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        if !self.is_available() {
            return Err(StoreError::Backend("remote unavailable".to_string()));
        }
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}
