//! Remote proposal source trait.

use econexus_types::{Proposal, ProposalId};

use crate::StoreError;

/// A read-only remote source of proposals (e.g. an on-chain indexer) consulted
/// only when the local collection has nothing to offer.
pub trait RemoteProposalSource: Send + Sync {
    /// Whether the remote is reachable right now. Checked before every fetch.
    fn is_available(&self) -> bool;

    /// Every proposal the remote knows about.
    fn fetch_proposals(&self) -> Result<Vec<Proposal>, StoreError>;

    /// A single proposal by id.
    fn fetch_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError>;
}
