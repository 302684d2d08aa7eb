//! Proposal filtering, per-proposal tallies and aggregate counts.

use econexus_types::{Proposal, ProposalId, ProposalStatus, Timestamp, WalletAddress};
use serde::{Deserialize, Serialize};

/// Conjunctive proposal filter with offset/limit paging.
///
/// A zero `offset` or `limit` is treated as unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalFilter {
    pub status: Option<ProposalStatus>,
    pub creator: Option<WalletAddress>,
    pub category: Option<String>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl ProposalFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: ProposalStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn creator(mut self, creator: WalletAddress) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, proposal: &Proposal) -> bool {
        self.status.map_or(true, |s| proposal.status == s)
            && self.creator.as_ref().map_or(true, |c| &proposal.creator == c)
            && self
                .category
                .as_deref()
                .map_or(true, |c| proposal.category == c)
    }

    /// Filter then page `proposals`, preserving their order.
    pub fn apply(&self, proposals: Vec<Proposal>) -> Vec<Proposal> {
        let offset = self.offset.filter(|o| *o > 0).unwrap_or(0);
        let limit = self.limit.filter(|l| *l > 0).unwrap_or(usize::MAX);
        proposals
            .into_iter()
            .filter(|p| self.matches(p))
            .skip(offset)
            .take(limit)
            .collect()
    }
}

/// Aggregate vote counts for one proposal, as cached under
/// `proposal_votes_{id}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalTally {
    pub proposal_id: ProposalId,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub total_votes: u64,
    /// Rounded to the nearest whole percent; 0 when there are no votes.
    pub yes_percentage: u8,
    pub no_percentage: u8,
    pub voting_deadline: Timestamp,
    pub is_voting_active: bool,
}

impl ProposalTally {
    pub fn from_proposal(proposal: &Proposal, now: Timestamp) -> Self {
        let total = proposal.total_votes();
        Self {
            proposal_id: proposal.id,
            yes_votes: proposal.vote_yes,
            no_votes: proposal.vote_no,
            total_votes: total,
            yes_percentage: rounded_percent(proposal.vote_yes, total),
            no_percentage: rounded_percent(proposal.vote_no, total),
            voting_deadline: proposal.end_time,
            is_voting_active: proposal.is_voting_open(now),
        }
    }
}

fn rounded_percent(part: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    // Half rounds up.
    let pct = (part as u128 * 200 + total as u128) / (total as u128 * 2);
    pct.min(100) as u8
}

/// Headline counts for the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaoStats {
    pub total_proposals: usize,
    pub active_proposals: usize,
    pub user_proposal_count: usize,
    pub user_vote_count: usize,
}

impl DaoStats {
    pub fn collect(proposals: &[Proposal], user: Option<&WalletAddress>, user_votes: usize) -> Self {
        Self {
            total_proposals: proposals.len(),
            active_proposals: proposals
                .iter()
                .filter(|p| p.status == ProposalStatus::Active)
                .count(),
            user_proposal_count: user
                .map(|u| proposals.iter().filter(|p| &p.creator == u).count())
                .unwrap_or(0),
            user_vote_count: user_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(id: u64, creator: &str, category: &str, status: ProposalStatus) -> Proposal {
        Proposal {
            id: ProposalId::new(id),
            title: format!("Proposal {id}"),
            description: String::new(),
            creator: WalletAddress::new(creator),
            funding_amount: 100.0,
            vote_yes: 0,
            vote_no: 0,
            status,
            end_time: Timestamp::from_millis(5_000),
            category: category.into(),
            ai_score: None,
            creation_time: Timestamp::from_millis(id),
            preserved_by: Vec::new(),
            expected_impact: None,
            location: None,
        }
    }

    fn sample() -> Vec<Proposal> {
        vec![
            proposal(1, "A", "reforestation", ProposalStatus::Active),
            proposal(2, "B", "reforestation", ProposalStatus::Expired),
            proposal(3, "A", "ocean-cleanup", ProposalStatus::Active),
            proposal(4, "A", "reforestation", ProposalStatus::Active),
            proposal(5, "C", "reforestation", ProposalStatus::Active),
        ]
    }

    fn ids(proposals: &[Proposal]) -> Vec<u64> {
        proposals.iter().map(|p| p.id.get()).collect()
    }

    #[test]
    fn filters_are_conjunctive() {
        let filter = ProposalFilter::new()
            .status(ProposalStatus::Active)
            .creator(WalletAddress::new("A"))
            .category("reforestation");
        assert_eq!(ids(&filter.apply(sample())), vec![1, 4]);
    }

    #[test]
    fn offset_then_limit() {
        let filter = ProposalFilter::new().offset(1).limit(2);
        assert_eq!(ids(&filter.apply(sample())), vec![2, 3]);
    }

    #[test]
    fn zero_paging_is_ignored() {
        let filter = ProposalFilter::new().offset(0).limit(0);
        assert_eq!(ids(&filter.apply(sample())).len(), 5);
    }

    #[test]
    fn tally_percentages_round() {
        let mut p = proposal(1, "A", "other", ProposalStatus::Active);
        p.vote_yes = 2;
        p.vote_no = 1;
        let tally = ProposalTally::from_proposal(&p, Timestamp::from_millis(1_000));
        assert_eq!(tally.total_votes, 3);
        assert_eq!(tally.yes_percentage, 67);
        assert_eq!(tally.no_percentage, 33);
        assert!(tally.is_voting_active);

        let closed = ProposalTally::from_proposal(&p, Timestamp::from_millis(5_000));
        assert!(!closed.is_voting_active);

        p.vote_yes = 1;
        p.vote_no = 1;
        let even = ProposalTally::from_proposal(&p, Timestamp::EPOCH);
        assert_eq!((even.yes_percentage, even.no_percentage), (50, 50));
    }

    #[test]
    fn empty_tally_is_zero_percent() {
        let p = proposal(1, "A", "other", ProposalStatus::Active);
        let tally = ProposalTally::from_proposal(&p, Timestamp::EPOCH);
        assert_eq!((tally.yes_percentage, tally.no_percentage), (0, 0));
    }

    #[test]
    fn stats_count_user_proposals() {
        let stats = DaoStats::collect(&sample(), Some(&WalletAddress::new("A")), 4);
        assert_eq!(stats.total_proposals, 5);
        assert_eq!(stats.active_proposals, 4);
        assert_eq!(stats.user_proposal_count, 3);
        assert_eq!(stats.user_vote_count, 4);
        assert_eq!(DaoStats::collect(&sample(), None, 0).user_proposal_count, 0);
    }
}
