//! Persisted key layout.
//!
//! | key | value |
//! |-----|-------|
//! | `climate_dao_proposals` | JSON array of proposals |
//! | `user_votes_{address}` | JSON array of one voter's records |
//! | `proposal_votes_{id}` | aggregate tally cache for one proposal |
//! | `climate_dao_votes` | vote activity log |
//! | `climate_dao_user_history` | user action log |
//! | `econexus_favorites` | favorite proposal ids |

use econexus_types::{ProposalId, WalletAddress};

pub const PROPOSALS: &str = "climate_dao_proposals";
pub const VOTE_LOG: &str = "climate_dao_votes";
pub const USER_HISTORY: &str = "climate_dao_user_history";
pub const FAVORITES: &str = "econexus_favorites";

/// Prefix shared by every per-proposal key (including tally caches).
pub const PROPOSAL_PREFIX: &str = "proposal_";
pub const PROPOSAL_VOTES_PREFIX: &str = "proposal_votes_";
pub const USER_VOTES_PREFIX: &str = "user_votes_";
/// Prefix of single-vote keys left behind by older clients.
pub const VOTE_PREFIX: &str = "vote_";

pub fn user_votes(voter: &WalletAddress) -> String {
    format!("{USER_VOTES_PREFIX}{voter}")
}

pub fn proposal_votes(id: ProposalId) -> String {
    format!("{PROPOSAL_VOTES_PREFIX}{id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_entity_keys() {
        assert_eq!(user_votes(&WalletAddress::new("ABC")), "user_votes_ABC");
        assert_eq!(proposal_votes(ProposalId::new(42)), "proposal_votes_42");
        assert!(proposal_votes(ProposalId::new(1)).starts_with(PROPOSAL_PREFIX));
    }
}
