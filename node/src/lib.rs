//! EcoNexus node: wires configuration, LMDB storage and the proposal store
//! together and runs periodic maintenance.

pub mod config;
pub mod error;
pub mod maintenance;
pub mod node;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use maintenance::{run_maintenance, spawn_maintenance, MaintenanceReport};
pub use node::DaoNode;
pub use shutdown::ShutdownController;
