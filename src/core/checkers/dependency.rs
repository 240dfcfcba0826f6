use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::package_manager::{OutdatedPackage, PackageManager};

/// Freshness of one dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyReport {
    pub manifest: String,
    pub file_exists: bool,
    pub outdated_packages: Vec<OutdatedPackage>,
    pub issues: Vec<String>,
}

impl DependencyReport {
    fn empty(manifest: String) -> Self {
        Self {
            manifest,
            file_exists: false,
            outdated_packages: Vec::new(),
            issues: Vec::new(),
        }
    }
}

pub struct DependencyChecker<'a> {
    packages: &'a dyn PackageManager,
}

impl<'a> DependencyChecker<'a> {
    pub fn new(packages: &'a dyn PackageManager) -> Self {
        Self { packages }
    }

    /// Check one manifest. `label` is the manifest as configured, used in
    /// issue text so the report does not depend on the absolute work dir.
    pub fn check(&self, manifest: &Path, label: &str) -> DependencyReport {
        let mut report = DependencyReport::empty(label.to_string());

        if !manifest.is_file() {
            report.issues.push(format!("{} not found", label));
            return report;
        }
        report.file_exists = true;

        match self.packages.list_outdated(manifest) {
            Ok(outdated) => report.outdated_packages = outdated,
            Err(err) => report
                .issues
                .push(format!("Error checking outdated packages: {}", err.message)),
        }

        report
    }
}
