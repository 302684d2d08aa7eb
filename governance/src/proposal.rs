//! Submission and update inputs.

use econexus_types::{Proposal, ProposalId, ProposalStatus, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

use crate::error::GovernanceError;

/// Upper bound of the AI review score scale.
pub const MAX_AI_SCORE: f64 = 10.0;

/// A proposal as submitted by its creator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub creator: WalletAddress,
    pub funding_amount: f64,
    pub category: String,
    pub end_time: Timestamp,
    #[serde(default)]
    pub ai_score: Option<f64>,
    #[serde(default)]
    pub expected_impact: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewProposal {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        validate_title(&self.title)?;
        validate_funding(self.funding_amount)?;
        if let Some(score) = self.ai_score {
            if !score.is_finite() || !(0.0..=MAX_AI_SCORE).contains(&score) {
                return Err(GovernanceError::InvalidProposal(format!(
                    "AI score {score} is outside 0-{MAX_AI_SCORE}"
                )));
            }
        }
        Ok(())
    }

    /// The stored form: no votes, active, created at `now`, preserved for
    /// its creator.
    pub(crate) fn into_proposal(self, now: Timestamp) -> Proposal {
        Proposal {
            id: self.id,
            title: self.title,
            description: self.description,
            preserved_by: vec![self.creator.clone()],
            creator: self.creator,
            funding_amount: self.funding_amount,
            vote_yes: 0,
            vote_no: 0,
            status: ProposalStatus::Active,
            end_time: self.end_time,
            category: self.category,
            ai_score: self.ai_score,
            creation_time: now,
            expected_impact: non_blank(self.expected_impact),
            location: non_blank(self.location),
        }
    }
}

/// The creator-editable fields of a proposal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalUpdate {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub funding_amount: f64,
    pub category: String,
    /// Left unchanged when `None` or blank.
    #[serde(default)]
    pub expected_impact: Option<String>,
    /// Left unchanged when `None` or blank.
    #[serde(default)]
    pub location: Option<String>,
}

impl ProposalUpdate {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        validate_title(&self.title)?;
        validate_funding(self.funding_amount)
    }

    /// Overwrite the editable fields. Status, creation time and vote
    /// counters are never touched.
    pub(crate) fn apply_to(self, proposal: &mut Proposal) {
        proposal.title = self.title;
        proposal.description = self.description;
        proposal.funding_amount = self.funding_amount;
        proposal.category = self.category;
        if let Some(impact) = non_blank(self.expected_impact) {
            proposal.expected_impact = Some(impact);
        }
        if let Some(location) = non_blank(self.location) {
            proposal.location = Some(location);
        }
    }
}

fn validate_title(title: &str) -> Result<(), GovernanceError> {
    if title.trim().is_empty() {
        return Err(GovernanceError::InvalidProposal(
            "title must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_funding(amount: f64) -> Result<(), GovernanceError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(GovernanceError::InvalidProposal(format!(
            "funding amount {amount} must be a non-negative number"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
