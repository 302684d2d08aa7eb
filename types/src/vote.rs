//! Votes and per-voter voting records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ProposalId, Timestamp, TypesError};

/// A yes/no vote on a proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    For,
    Against,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::For => "for",
            Self::Against => "against",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for" | "yes" => Ok(Self::For),
            "against" | "no" => Ok(Self::Against),
            _ => Err(TypesError::UnknownVote(s.to_string())),
        }
    }
}

/// One address's vote on one proposal. Never mutated once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingRecord {
    pub proposal_id: ProposalId,
    pub proposal_title: String,
    pub vote: VoteChoice,
    pub timestamp: Timestamp,
    pub tx_id: String,
    pub confirmed_round: u64,
}

/// Whether an address has voted on a proposal, and how.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingState {
    pub has_voted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_vote: Option<VoteChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_record: Option<VotingRecord>,
}

impl VotingState {
    pub fn from_record(record: Option<VotingRecord>) -> Self {
        match record {
            Some(record) => Self {
                has_voted: true,
                user_vote: Some(record.vote),
                voting_record: Some(record),
            },
            None => Self::default(),
        }
    }
}
