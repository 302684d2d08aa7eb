//! Storage budget: activity logs and size-driven compaction.
//!
//! Size is measured the way the stored data is laid out: the JSON length of
//! the proposal collection plus the vote log plus the user history. When the
//! sum crosses the configured threshold the newest proposals and the tail of
//! each log survive. Preservation is not consulted here.

use econexus_types::{Proposal, ProposalId, Timestamp, VoteChoice, WalletAddress};
use serde::{Deserialize, Serialize};

use econexus_store::{json::encoded_len, StoreError};

use crate::params::StorageBudget;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ProposalSubmitted,
    VoteCast,
}

/// One entry of the vote log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteLogEntry {
    pub proposal_id: ProposalId,
    pub vote: VoteChoice,
    pub timestamp: Timestamp,
    pub voter: WalletAddress,
    /// Dropped by compaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}

/// One entry of the user action history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub proposal_id: ProposalId,
    pub timestamp: Timestamp,
    /// Dropped by compaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<WalletAddress>,
}

/// The three collections the budget covers.
#[derive(Clone, Debug, Default)]
pub struct StorageUsage {
    pub proposals: Vec<Proposal>,
    pub votes: Vec<VoteLogEntry>,
    pub history: Vec<HistoryEntry>,
}

impl StorageUsage {
    /// Combined encoded size in bytes.
    pub fn size(&self) -> Result<usize, StoreError> {
        Ok(encoded_len(&self.proposals)? + encoded_len(&self.votes)? + encoded_len(&self.history)?)
    }
}

/// Result of compacting [`StorageUsage`] down to budget.
#[derive(Debug)]
pub struct Compaction {
    pub usage: StorageUsage,
    pub evicted: Vec<ProposalId>,
}

/// Keep the `max_proposals` most recently created proposals (in their
/// original order), the last `max_votes` vote-log entries and the last
/// `max_history` history entries, the logs stripped to their compact shape.
///
/// Survivors are not re-sorted newest first: listings keep the submission
/// order they had before compaction.
pub fn compact(usage: StorageUsage, budget: &StorageBudget) -> Compaction {
    let StorageUsage {
        proposals,
        votes,
        history,
    } = usage;

    let mut by_recency: Vec<usize> = (0..proposals.len()).collect();
    by_recency.sort_by(|&a, &b| {
        proposals[b]
            .creation_time
            .cmp(&proposals[a].creation_time)
            .then(a.cmp(&b))
    });
    let mut keep = vec![false; proposals.len()];
    for &i in by_recency.iter().take(budget.max_proposals) {
        keep[i] = true;
    }

    let mut kept = Vec::with_capacity(budget.max_proposals.min(proposals.len()));
    let mut evicted = Vec::new();
    for (proposal, keep) in proposals.into_iter().zip(keep) {
        if keep {
            kept.push(proposal);
        } else {
            evicted.push(proposal.id);
        }
    }

    let votes = tail(votes, budget.max_votes)
        .map(|entry| VoteLogEntry {
            tx_id: None,
            ..entry
        })
        .collect();
    let history = tail(history, budget.max_history)
        .map(|entry| HistoryEntry {
            actor: None,
            ..entry
        })
        .collect();

    Compaction {
        usage: StorageUsage {
            proposals: kept,
            votes,
            history,
        },
        evicted,
    }
}

fn tail<T>(items: Vec<T>, n: usize) -> impl Iterator<Item = T> {
    let skip = items.len().saturating_sub(n);
    items.into_iter().skip(skip)
}

/// What [`enforce_storage_limits`](crate::ProposalStore::enforce_storage_limits) did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum StorageReport {
    /// Under the threshold; nothing changed.
    WithinBudget {
        current_size: usize,
        proposals_count: usize,
    },
    /// Compaction ran. Sizes in bytes.
    Compacted {
        old_size: usize,
        new_size: usize,
        proposals_kept: usize,
        proposals_removed: usize,
    },
}

impl StorageReport {
    /// Report used when the store could not be read.
    pub fn unavailable() -> Self {
        Self::WithinBudget {
            current_size: 0,
            proposals_count: 0,
        }
    }

    pub fn cleaned(&self) -> bool {
        matches!(self, Self::Compacted { .. })
    }
}
