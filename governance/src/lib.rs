//! Climate DAO governance: the proposal store.
//!
//! Proposals and votes live as JSON collections in a [`KvStore`](econexus_store::KvStore).
//! Submissions are rate limited per creator address; proposals past their
//! deadline are expired and eventually removed unless someone preserved
//! them; the combined size of proposals and activity logs is held under a
//! storage budget.
//!
//! Outcomes (`passed` / `rejected`) are decided elsewhere. Nothing in this
//! crate assigns them.

pub mod budget;
pub mod error;
pub mod favorites;
pub mod impact;
pub mod limits;
pub mod params;
pub mod proposal;
pub mod proposal_store;
pub mod query;
pub mod retention;

pub use budget::{ActivityKind, HistoryEntry, StorageReport, VoteLogEntry};
pub use error::{GovernanceError, Mutation};
pub use favorites::{FavoritesManager, FavoritesStats};
pub use impact::ImpactMetrics;
pub use limits::{RateLimitViolation, UserProposalLimits};
pub use params::{RateLimitProfile, RateLimits, StorageBudget, StoreParams};
pub use proposal::{NewProposal, ProposalUpdate};
pub use proposal_store::ProposalStore;
pub use query::{DaoStats, ProposalFilter, ProposalTally};
pub use retention::CleanupReport;
