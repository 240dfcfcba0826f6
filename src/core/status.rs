//! Status vocabulary and the classification policy.
//!
//! Each probe family reports its own closed status enum; all of them widen into
//! `CheckStatus`, the report vocabulary. Turning a status into an error or a
//! warning is a single lookup in `classify`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckCategory {
    Deployment,
    Connection,
    Database,
    Payment,
    Ui,
    Dependency,
    AiAgentStatus,
}

impl CheckCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckCategory::Deployment => "deployment",
            CheckCategory::Connection => "connection",
            CheckCategory::Database => "database",
            CheckCategory::Payment => "payment",
            CheckCategory::Ui => "ui",
            CheckCategory::Dependency => "dependency",
            CheckCategory::AiAgentStatus => "ai-agent-status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Configured,
    Unhealthy,
    Unconfigured,
    Warning,
    Error,
    Suspended,
    Missing,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Healthy => "healthy",
            CheckStatus::Configured => "configured",
            CheckStatus::Unhealthy => "unhealthy",
            CheckStatus::Unconfigured => "unconfigured",
            CheckStatus::Warning => "warning",
            CheckStatus::Error => "error",
            CheckStatus::Suspended => "suspended",
            CheckStatus::Missing => "missing",
        }
    }

    /// Healthy, or configured and acceptable.
    pub fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Healthy | CheckStatus::Configured)
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment platforms and the first-party health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Healthy,
    Unhealthy,
    Suspended,
    Unconfigured,
    TransportError,
}

impl From<DeploymentStatus> for CheckStatus {
    fn from(status: DeploymentStatus) -> Self {
        match status {
            DeploymentStatus::Healthy => CheckStatus::Healthy,
            DeploymentStatus::Unhealthy => CheckStatus::Unhealthy,
            DeploymentStatus::Suspended => CheckStatus::Suspended,
            DeploymentStatus::Unconfigured => CheckStatus::Unconfigured,
            DeploymentStatus::TransportError => CheckStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseStatus {
    Healthy,
    Unconfigured,
    Error,
}

impl From<DatabaseStatus> for CheckStatus {
    fn from(status: DatabaseStatus) -> Self {
        match status {
            DatabaseStatus::Healthy => CheckStatus::Healthy,
            DatabaseStatus::Unconfigured => CheckStatus::Unconfigured,
            DatabaseStatus::Error => CheckStatus::Error,
        }
    }
}

/// Payment providers are only format-validated, never called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Configured,
    Warning,
    Unconfigured,
}

impl From<PaymentStatus> for CheckStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Configured => CheckStatus::Configured,
            PaymentStatus::Warning => CheckStatus::Warning,
            PaymentStatus::Unconfigured => CheckStatus::Unconfigured,
        }
    }
}

/// Whether a missing integration is itself a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Mandatory,
    Optional,
}

/// What the orchestrator does with an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Healthy,
    Warning,
    Error { can_auto_fix: bool },
}

/// The classification table.
///
/// No probe status is auto-fixable on its own; the stale lock is detected by
/// the lock inspector and classified there.
pub fn classify(status: CheckStatus, requirement: Requirement) -> Severity {
    match (status, requirement) {
        (CheckStatus::Healthy | CheckStatus::Configured, _) => Severity::Healthy,
        (CheckStatus::Unconfigured, Requirement::Mandatory) => {
            Severity::Error { can_auto_fix: false }
        }
        (CheckStatus::Unconfigured, Requirement::Optional) => Severity::Warning,
        (CheckStatus::Warning | CheckStatus::Missing, _) => Severity::Warning,
        (CheckStatus::Unhealthy | CheckStatus::Suspended | CheckStatus::Error, _) => {
            Severity::Error { can_auto_fix: false }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_depends_on_requirement() {
        assert_eq!(
            classify(CheckStatus::Unconfigured, Requirement::Mandatory),
            Severity::Error { can_auto_fix: false }
        );
        assert_eq!(
            classify(CheckStatus::Unconfigured, Requirement::Optional),
            Severity::Warning
        );
    }

    #[test]
    fn failures_are_never_auto_fixable() {
        for status in [CheckStatus::Unhealthy, CheckStatus::Suspended, CheckStatus::Error] {
            for requirement in [Requirement::Mandatory, Requirement::Optional] {
                assert_eq!(
                    classify(status, requirement),
                    Severity::Error { can_auto_fix: false }
                );
            }
        }
    }

    #[test]
    fn configured_counts_as_healthy() {
        assert!(CheckStatus::Configured.is_ok());
        assert_eq!(
            classify(CheckStatus::Configured, Requirement::Optional),
            Severity::Healthy
        );
        assert_eq!(
            classify(CheckStatus::Missing, Requirement::Mandatory),
            Severity::Warning
        );
    }

    #[test]
    fn transport_errors_widen_to_error() {
        assert_eq!(
            CheckStatus::from(DeploymentStatus::TransportError),
            CheckStatus::Error
        );
        assert_eq!(
            serde_json::to_value(CheckCategory::AiAgentStatus).unwrap(),
            "ai-agent-status"
        );
    }
}
