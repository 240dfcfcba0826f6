//! Health probes, one module per dependency family.
//!
//! Every probe returns its family status plus a details map. Failures inside a
//! probe become status data at the probe boundary; nothing here returns `Err`
//! to the orchestrator.

pub mod database;
pub mod dependency;
pub mod deployment;
pub mod environment;
pub mod lock;
pub mod payment;
pub mod ui;

use serde::Serialize;
use serde_json::Value;

use crate::report::Details;

pub use database::DatabaseChecker;
pub use dependency::{DependencyChecker, DependencyReport};
pub use deployment::DeploymentChecker;
pub use environment::EnvironmentReport;
pub use lock::LockState;
pub use payment::PaymentChecker;
pub use ui::{RouteOutcome, StaticFileOutcome, UiChecker};

/// Family status plus diagnostics, as returned by every probe.
pub type Probe<S> = (S, Details);

/// Serialize a value into a details map; non-object values yield an empty map.
pub(crate) fn to_details<T: Serialize>(value: &T) -> Details {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => map,
        _ => Details::new(),
    }
}

/// Details carrying only an `error` message.
pub(crate) fn error_details(message: impl Into<String>) -> Details {
    let mut details = Details::new();
    details.insert("error".to_string(), Value::String(message.into()));
    details
}
