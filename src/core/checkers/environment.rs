use serde::{Deserialize, Serialize};

use crate::config::{SweepConfig, OPTIONAL_KEYS, REQUIRED_KEYS};

/// Presence of the required and optional configuration keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentReport {
    pub missing_required: Vec<String>,
    pub present: Vec<String>,
    pub missing_optional: Vec<String>,
    pub all_required_present: bool,
}

/// Partition the known keys into present and missing. Pure; no I/O.
pub fn check(config: &SweepConfig) -> EnvironmentReport {
    let (present, missing_required): (Vec<&str>, Vec<&str>) =
        REQUIRED_KEYS.iter().copied().partition(|key| config.is_set(key));

    let missing_optional = OPTIONAL_KEYS
        .iter()
        .filter(|key| !config.is_set(key))
        .map(|key| key.to_string())
        .collect();

    EnvironmentReport {
        all_required_present: missing_required.is_empty(),
        missing_required: missing_required.into_iter().map(String::from).collect(),
        present: present.into_iter().map(String::from).collect(),
        missing_optional,
    }
}
