//! Package-manager seam for the dependency checker and fixer.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::SweepConfig;
use crate::defaults::PackageManagerConfig;
use crate::error::{Error, Result};
use crate::utils::command;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
}

pub trait PackageManager: Send + Sync {
    /// List packages with a newer release, for the project owning `manifest`.
    fn list_outdated(&self, manifest: &Path) -> Result<Vec<OutdatedPackage>>;

    /// Upgrade a single package in place.
    fn upgrade(&self, package: &str) -> Result<()>;
}

/// Drives the configured package-manager commands (pip by default).
pub struct CommandPackageManager {
    commands: PackageManagerConfig,
    work_dir: PathBuf,
    list_timeout: Duration,
    upgrade_timeout: Duration,
}

impl CommandPackageManager {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            commands: config.defaults.package_manager.clone(),
            work_dir: config.work_dir.clone(),
            list_timeout: config.defaults.timeouts.package_list(),
            upgrade_timeout: config.defaults.timeouts.package_upgrade(),
        }
    }
}

impl PackageManager for CommandPackageManager {
    fn list_outdated(&self, manifest: &Path) -> Result<Vec<OutdatedPackage>> {
        let dir = manifest
            .parent()
            .filter(|p| p.is_dir())
            .unwrap_or(self.work_dir.as_path());

        let output =
            command::run_with_timeout(&self.commands.list_outdated, &[], dir, self.list_timeout)?;
        parse_outdated(&output.stdout)
    }

    fn upgrade(&self, package: &str) -> Result<()> {
        command::run_with_timeout(
            &self.commands.upgrade,
            &[package],
            &self.work_dir,
            self.upgrade_timeout,
        )?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct ListedPackage {
    name: String,
    #[serde(alias = "current")]
    version: String,
    #[serde(alias = "latest")]
    latest_version: String,
}

/// Parse `pip list --outdated --format=json` output.
pub fn parse_outdated(stdout: &str) -> Result<Vec<OutdatedPackage>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }

    let listed: Vec<ListedPackage> = serde_json::from_str(stdout).map_err(|e| {
        Error::internal_json(e.to_string(), Some("parse outdated package list".to_string()))
    })?;

    Ok(listed
        .into_iter()
        .map(|pkg| OutdatedPackage {
            name: pkg.name,
            current_version: pkg.version,
            latest_version: pkg.latest_version,
        })
        .collect())
}
