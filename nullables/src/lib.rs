//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern: every external dependency
//! of the proposal store (clock, key-value medium, remote proposal source) is
//! abstracted behind a trait. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (advance time, inject write failures)
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod remote;
pub mod store;

pub use clock::NullClock;
pub use remote::NullRemote;
pub use store::NullKvStore;
