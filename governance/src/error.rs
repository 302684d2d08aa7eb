use econexus_store::StoreError;
use econexus_types::{ProposalId, WalletAddress};
use std::fmt;
use thiserror::Error;

use crate::limits::RateLimitViolation;

/// Creator-only mutations of a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Delete,
    Update,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Update => "update",
        })
    }
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("Proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("No proposals found")]
    NoProposals,

    #[error("Proposal {0} already exists")]
    DuplicateProposal(ProposalId),

    #[error("Only the proposal creator can {0} this proposal")]
    NotCreator(Mutation),

    #[error("Cannot {0} proposal that has received votes")]
    HasVotes(Mutation),

    #[error("{0}")]
    RateLimited(#[from] RateLimitViolation),

    #[error("wallet {voter} has already voted on proposal {proposal}")]
    AlreadyVoted {
        voter: WalletAddress,
        proposal: ProposalId,
    },

    #[error("voting on proposal {0} is closed")]
    VotingClosed(ProposalId),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl GovernanceError {
    /// Whether this is a user-facing rejection (as opposed to an
    /// infrastructure fault).
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_messages_read_naturally() {
        assert_eq!(
            GovernanceError::NotCreator(Mutation::Delete).to_string(),
            "Only the proposal creator can delete this proposal"
        );
        assert_eq!(
            GovernanceError::HasVotes(Mutation::Update).to_string(),
            "Cannot update proposal that has received votes"
        );
    }

    #[test]
    fn rate_limit_message_passes_through() {
        let err: GovernanceError = RateLimitViolation::DailyLimit { max: 3 }.into();
        assert_eq!(err.to_string(), "Maximum 3 proposals per day reached");
        assert!(err.is_user_facing());
        assert!(!GovernanceError::Store(StoreError::Backend("x".into())).is_user_facing());
    }
}
