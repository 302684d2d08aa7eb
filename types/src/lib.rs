//! Fundamental types for the EcoNexus DAO.
//!
//! This crate defines the domain types shared across every other crate in the
//! workspace: wallet addresses, millisecond timestamps and clocks, proposals,
//! votes and voting records.

pub mod address;
pub mod error;
pub mod proposal;
pub mod time;
pub mod vote;

pub use address::WalletAddress;
pub use error::TypesError;
pub use proposal::{Proposal, ProposalId, ProposalStatus};
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::{VoteChoice, VotingRecord, VotingState};
