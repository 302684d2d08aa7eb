//! Parse errors for the shared domain types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid proposal id: {0}")]
    InvalidProposalId(String),

    #[error("unknown proposal status: {0}")]
    UnknownStatus(String),

    #[error("unknown vote choice: {0} (expected \"for\" or \"against\")")]
    UnknownVote(String),
}
