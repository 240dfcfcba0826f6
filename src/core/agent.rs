//! Sweep orchestration.
//!
//! One linear pass over the categories in a fixed order. Independent network
//! probes within a category run on scoped threads and are joined before any
//! classification, so the report is written from a single thread and lists
//! outcomes in invocation order.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use serde_json::Value;

use crate::checkers::{
    self, error_details, environment, lock, DatabaseChecker, DependencyChecker,
    DependencyReport, DeploymentChecker, LockState, PaymentChecker, Probe, UiChecker,
};
use crate::config::SweepConfig;
use crate::error::Result;
use crate::fixers::{FixAction, Fixers};
use crate::http::{HttpProbe, ReqwestProbe};
use crate::package_manager::{CommandPackageManager, PackageManager};
use crate::report::{Details, SweepReport};
use crate::status::{
    classify, CheckCategory, CheckStatus, DeploymentStatus, Requirement, Severity,
};

/// Catalogue entry: how a probe's non-healthy status is worded.
struct ProbeSpec {
    name: &'static str,
    requirement: Requirement,
    issue: &'static str,
    unconfigured: &'static str,
}

const RENDER_BACKEND: ProbeSpec = ProbeSpec {
    name: "render_backend",
    requirement: Requirement::Mandatory,
    issue: "Render deployment issue",
    unconfigured: "Render not configured",
};

const BACKEND_HEALTHZ: ProbeSpec = ProbeSpec {
    name: "backend_healthz",
    requirement: Requirement::Mandatory,
    issue: "Backend health check failed",
    unconfigured: "BACKEND_URL not set, skipping health check",
};

const VERCEL_FRONTEND: ProbeSpec = ProbeSpec {
    name: "vercel_frontend",
    requirement: Requirement::Optional,
    issue: "Vercel deployment issue",
    unconfigured: "Vercel not configured",
};

const DATABASE: ProbeSpec = ProbeSpec {
    name: "database",
    requirement: Requirement::Mandatory,
    issue: "Database issue",
    unconfigured: "Database not configured",
};

const PAYPAL: ProbeSpec = ProbeSpec {
    name: "paypal",
    requirement: Requirement::Optional,
    issue: "PayPal configuration issue",
    unconfigured: "PayPal not configured",
};

const STRIPE: ProbeSpec = ProbeSpec {
    name: "stripe",
    requirement: Requirement::Optional,
    issue: "Stripe configuration issue",
    unconfigured: "Stripe not configured",
};

const EMPIRE_AUTOMATION: ProbeSpec = ProbeSpec {
    name: "empire_automation",
    requirement: Requirement::Optional,
    issue: "Empire automation issue",
    unconfigured: "Empire automation is not enabled",
};

const EMPIRE_AUTOMATION_PROCESS: &str = "empire_automation_process";

impl ProbeSpec {
    fn message(&self, status: CheckStatus, details: &Details) -> String {
        if status == CheckStatus::Unconfigured && self.requirement == Requirement::Optional {
            return self.unconfigured.to_string();
        }
        let reason = details
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        format!("{}: {}", self.issue, reason)
    }
}

pub struct SweepAgent<'a> {
    config: &'a SweepConfig,
    auto_fix: bool,
    http: Arc<dyn HttpProbe>,
    packages: Arc<dyn PackageManager>,
}

impl<'a> SweepAgent<'a> {
    /// Agent with the real HTTP client and package manager.
    pub fn new(config: &'a SweepConfig, auto_fix: bool) -> Result<Self> {
        let http = ReqwestProbe::new(config.defaults.timeouts.http())?;
        Ok(Self {
            config,
            auto_fix,
            http: Arc::new(http),
            packages: Arc::new(CommandPackageManager::from_config(config)),
        })
    }

    pub fn with_http(mut self, http: Arc<dyn HttpProbe>) -> Self {
        self.http = http;
        self
    }

    pub fn with_package_manager(mut self, packages: Arc<dyn PackageManager>) -> Self {
        self.packages = packages;
        self
    }

    /// Run every category once and return the finished report.
    ///
    /// Fixers exist only when `auto_fix` was requested; otherwise auto-fixable
    /// errors stay flagged and nothing is remediated.
    pub fn run_full_sweep(&self) -> SweepReport {
        crate::log_status!("sweep", "Starting full system sweep");
        let mut sweep = Sweep::default();

        self.check_deployments(&mut sweep);
        self.check_environment(&mut sweep);
        self.check_dependencies(&mut sweep);
        self.check_database(&mut sweep);
        self.check_payments(&mut sweep);
        self.check_ui(&mut sweep);
        self.check_ai_agents(&mut sweep);

        if self.auto_fix {
            let fixers = Fixers::new(self.config, self.packages.as_ref());
            for action in &sweep.pending {
                let success = fixers.apply(action);
                sweep.report.add_fix(action.describe(), success);
            }
        }

        let summary = sweep.report.summary();
        crate::log_status!(
            "sweep",
            "Sweep completed: {} errors ({} auto-fixable), {} warnings, {} fixes",
            summary.total_errors,
            summary.auto_fixable_errors,
            summary.warnings,
            summary.fixes_applied
        );
        sweep.report
    }

    fn check_deployments(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Deployment.as_str());
        let checker = DeploymentChecker::new(self.config, self.http.as_ref());

        let (render, healthz, vercel) = thread::scope(|scope| {
            let render = scope.spawn(|| checker.check_render());
            let healthz = scope.spawn(|| checker.check_backend_healthz());
            let vercel = scope.spawn(|| checker.check_vercel());
            (
                joined(render, DeploymentStatus::TransportError),
                healthz.join().unwrap_or_else(|_| {
                    Some((DeploymentStatus::TransportError, panicked()))
                }),
                joined(vercel, DeploymentStatus::TransportError),
            )
        });

        sweep.deployment(&RENDER_BACKEND, render);
        match healthz {
            Some(probe) => sweep.deployment(&BACKEND_HEALTHZ, probe),
            None => sweep.report.add_warning(BACKEND_HEALTHZ.unconfigured),
        }
        sweep.deployment(&VERCEL_FRONTEND, vercel);
    }

    fn check_environment(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Connection.as_str());
        let env = environment::check(self.config);

        let status = if env.all_required_present {
            CheckStatus::Healthy
        } else {
            CheckStatus::Unhealthy
        };
        sweep
            .report
            .add_connection_check("environment_variables", status, checkers::to_details(&env));

        for key in &env.missing_required {
            sweep.raise(format!("Required environment variable missing: {}", key), None);
        }
        for key in &env.missing_optional {
            sweep
                .report
                .add_warning(format!("Optional environment variable missing: {}", key));
        }
    }

    fn check_dependencies(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Dependency.as_str());
        let checker = DependencyChecker::new(self.packages.as_ref());

        // Manifests that are not part of this checkout are skipped, not reported.
        let manifests: Vec<(&str, PathBuf)> = self
            .config
            .defaults
            .dependency_manifests
            .iter()
            .map(|label| (label.as_str(), self.config.resolve(label)))
            .filter(|(label, path)| {
                let present = path.is_file();
                if !present {
                    crate::log_verbose!("sweep", "Skipping {}: not present", label);
                }
                present
            })
            .collect();

        let reports: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = manifests
                .iter()
                .map(|(label, path)| {
                    let checker = &checker;
                    scope.spawn(move || checker.check(path, label))
                })
                .collect();

            handles
                .into_iter()
                .zip(&manifests)
                .map(|(handle, (label, _))| {
                    handle.join().unwrap_or_else(|_| DependencyReport {
                        manifest: label.to_string(),
                        file_exists: true,
                        outdated_packages: Vec::new(),
                        issues: vec!["Error checking outdated packages: probe panicked".to_string()],
                    })
                })
                .collect()
        });

        for dep in reports {
            for issue in &dep.issues {
                sweep.report.add_warning(format!("Dependency issue: {}", issue));
            }

            if dep.outdated_packages.is_empty() {
                continue;
            }
            sweep.report.add_warning(format!(
                "Found {} outdated packages in {}",
                dep.outdated_packages.len(),
                dep.manifest
            ));

            if self.config.auto_update_dependencies() {
                sweep.pending.push(FixAction::UpdateDependencies {
                    packages: dep.outdated_packages,
                });
            }
        }
    }

    fn check_database(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Database.as_str());
        let (status, details) = DatabaseChecker::new(self.config).check();
        let status = CheckStatus::from(status);

        if status == CheckStatus::Healthy {
            sweep
                .report
                .add_connection_check(DATABASE.name, status, details.clone());
        }
        sweep.triage(&DATABASE, status, &details);
        sweep.report.add_database_check(status, details);
    }

    fn check_payments(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Payment.as_str());
        let checker = PaymentChecker::new(self.config);

        for (spec, (status, details)) in [
            (&PAYPAL, checker.check_paypal()),
            (&STRIPE, checker.check_stripe()),
        ] {
            let status = CheckStatus::from(status);
            sweep.triage(spec, status, &details);
            sweep.report.add_payment_check(spec.name, status, details);
        }
    }

    fn check_ui(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::Ui.as_str());
        let checker = UiChecker::new(self.config, self.http.as_ref());

        match checker.check_routes() {
            Some(routes) => {
                for route in routes {
                    let status = if route.accessible {
                        CheckStatus::Healthy
                    } else {
                        CheckStatus::Error
                    };
                    if let Severity::Error { .. } = classify(status, Requirement::Mandatory) {
                        sweep.raise(format!("Frontend route {} not accessible", route.path), None);
                    }
                    sweep
                        .report
                        .add_ui_check(&format!("route_{}", route.path), status, route.details);
                }
            }
            None => sweep
                .report
                .add_warning("FRONTEND_URL not set, skipping UI checks"),
        }

        for file in checker.check_static_files() {
            let status = if file.exists {
                CheckStatus::Healthy
            } else {
                CheckStatus::Missing
            };
            if classify(status, Requirement::Optional) == Severity::Warning {
                sweep
                    .report
                    .add_warning(format!("Static file missing: {}", file.name));
            }
            sweep
                .report
                .add_ui_check(&format!("static_file_{}", file.name), status, file.details);
        }
    }

    fn check_ai_agents(&self, sweep: &mut Sweep) {
        crate::log_status!("sweep", "Checking {}", CheckCategory::AiAgentStatus.as_str());
        let enabled = self.config.automation_enabled();
        let lock_path = self.config.lock_file();

        let mut details = Details::new();
        details.insert("enabled".to_string(), Value::Bool(enabled));
        details.insert(
            "lock_file".to_string(),
            Value::String(lock_path.display().to_string()),
        );
        details.insert("lock_file_exists".to_string(), Value::Bool(lock_path.exists()));

        let status = if enabled {
            CheckStatus::Healthy
        } else {
            CheckStatus::Unconfigured
        };
        sweep.triage(&EMPIRE_AUTOMATION, status, &details);
        sweep
            .report
            .add_ai_agent_check(EMPIRE_AUTOMATION.name, status, details);

        match lock::inspect(&lock_path) {
            LockState::Absent => {}
            LockState::Held { pid } => {
                let mut details = Details::new();
                details.insert("pid".to_string(), Value::from(pid));
                details.insert("status".to_string(), Value::from("running"));
                sweep
                    .report
                    .add_ai_agent_check(EMPIRE_AUTOMATION_PROCESS, CheckStatus::Healthy, details);
            }
            LockState::Stale { pid } => {
                sweep.raise(
                    format!("Stale lock file found for PID {}", pid),
                    Some(FixAction::RemoveStaleLock { path: lock_path }),
                );
            }
            LockState::Unreadable { error } => {
                sweep
                    .report
                    .add_warning(format!("Error checking lock file: {}", error));
            }
        }
    }
}

/// Report under construction plus the fixes its errors call for.
#[derive(Default)]
struct Sweep {
    report: SweepReport,
    pending: Vec<FixAction>,
}

impl Sweep {
    /// Record an error. It is auto-fixable exactly when a fix action exists.
    fn raise(&mut self, message: String, fix: Option<FixAction>) {
        self.report.add_error(message, fix.is_some());
        if let Some(action) = fix {
            self.pending.push(action);
        }
    }

    fn triage(&mut self, spec: &ProbeSpec, status: CheckStatus, details: &Details) {
        crate::log_verbose!("sweep", "{}: {}", spec.name, status);
        match classify(status, spec.requirement) {
            Severity::Healthy => {}
            Severity::Warning => self.report.add_warning(spec.message(status, details)),
            Severity::Error { .. } => self.raise(spec.message(status, details), None),
        }
    }

    fn deployment(&mut self, spec: &ProbeSpec, (status, details): Probe<DeploymentStatus>) {
        let status = CheckStatus::from(status);
        self.triage(spec, status, &details);
        self.report.add_deployment_check(spec.name, status, details);
    }
}

fn joined<S>(handle: ScopedJoinHandle<'_, Probe<S>>, failed: S) -> Probe<S> {
    handle.join().unwrap_or_else(|_| (failed, panicked()))
}

fn panicked() -> Details {
    error_details("Probe thread panicked")
}
