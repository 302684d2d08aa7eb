//! Expiry sweep: close out proposals past their deadline and drop old ones.
//!
//! The sweep is pure. The store feeds it the persisted collection and writes
//! back the result, deleting the tally caches of whatever was removed.

use econexus_types::{Proposal, ProposalId, ProposalStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome of one expiry sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed_count: usize,
    pub kept_count: usize,
}

/// Proposals surviving a sweep plus the ids it removed.
#[derive(Debug, Default)]
pub struct Sweep {
    pub kept: Vec<Proposal>,
    pub removed: Vec<ProposalId>,
    /// Proposals switched from `active` to `expired` by this sweep.
    pub newly_expired: usize,
}

impl Sweep {
    pub fn report(&self) -> CleanupReport {
        CleanupReport {
            removed_count: self.removed.len(),
            kept_count: self.kept.len(),
        }
    }
}

/// Mark every active proposal with `end_time < now` expired, then remove
/// expired proposals nobody preserved once more than `retention_ms` has
/// passed since their deadline. Survivors keep their order.
pub fn sweep_expired(proposals: Vec<Proposal>, now: Timestamp, retention_ms: u64) -> Sweep {
    let mut sweep = Sweep::default();

    for mut proposal in proposals {
        if proposal.status == ProposalStatus::Active && proposal.end_time < now {
            proposal.status = ProposalStatus::Expired;
            sweep.newly_expired += 1;
        }

        let removable = !proposal.is_preserved()
            && proposal.status == ProposalStatus::Expired
            && proposal.end_time.elapsed_since(now) > retention_ms;

        if removable {
            sweep.removed.push(proposal.id);
        } else {
            sweep.kept.push(proposal);
        }
    }

    sweep
}
