// Public modules
pub mod agent;
pub mod checkers;
pub mod config;
pub mod defaults;
pub mod error;
pub mod fixers;
pub mod http;
pub mod mask;
pub mod package_manager;
pub mod report;
pub mod status;
pub mod store;

// Internal modules - not part of public API
pub(crate) mod paths;
pub(crate) mod process;

// Re-export common types for convenience
pub use agent::SweepAgent;
pub use config::SweepConfig;
pub use error::{Error, ErrorCode, Result};
pub use report::SweepReport;
