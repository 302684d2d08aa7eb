//! Climate-funding proposals and their lifecycle state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Timestamp, TypesError, WalletAddress};

/// Caller-supplied proposal identifier, typically derived from the
/// submission timestamp.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ProposalId(u64);

impl ProposalId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| TypesError::InvalidProposalId(s.to_string()))
    }
}

/// Lifecycle status of a proposal.
///
/// The store itself only ever assigns `Active` and `Expired`. `Passed` and
/// `Rejected` are written, if at all, by an external tallying process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Active,
    Passed,
    Rejected,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Passed => "passed",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "passed" => Ok(Self::Passed),
            "rejected" => Ok(Self::Rejected),
            "expired" => Ok(Self::Expired),
            _ => Err(TypesError::UnknownStatus(s.to_string())),
        }
    }
}

/// A climate-funding proposal as persisted in the proposal collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub creator: WalletAddress,
    pub funding_amount: f64,
    pub vote_yes: u64,
    pub vote_no: u64,
    pub status: ProposalStatus,
    /// Voting deadline.
    pub end_time: Timestamp,
    pub category: String,
    /// AI review score on a 0–10 scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f64>,
    pub creation_time: Timestamp,
    /// Addresses for which this proposal is exempt from the expiry sweep.
    #[serde(default)]
    pub preserved_by: Vec<WalletAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Proposal {
    pub fn total_votes(&self) -> u64 {
        self.vote_yes.saturating_add(self.vote_no)
    }

    pub fn has_votes(&self) -> bool {
        self.total_votes() > 0
    }

    pub fn is_preserved(&self) -> bool {
        !self.preserved_by.is_empty()
    }

    /// Whether votes are still being accepted at `now`.
    pub fn is_voting_open(&self, now: Timestamp) -> bool {
        self.status == ProposalStatus::Active && self.end_time > now
    }
}
