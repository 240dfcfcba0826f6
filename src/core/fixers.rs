//! Narrow remediation actions.
//!
//! Every fixer returns `true`/`false` and is safe to run more than once. Errors
//! are logged and folded into `false`; nothing here propagates to the caller.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::config::SweepConfig;
use crate::error::{Error, Result};
use crate::package_manager::{OutdatedPackage, PackageManager};
use crate::utils::command;

/// A remediation the orchestrator (or an operator) can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixAction {
    RemoveStaleLock { path: PathBuf },
    UpdateDependencies { packages: Vec<OutdatedPackage> },
    ClearCache,
    RestartService { name: String },
    RebuildFrontend,
}

impl FixAction {
    /// Text recorded in the report's fix list.
    pub fn describe(&self) -> String {
        match self {
            FixAction::RemoveStaleLock { path } => {
                format!("Remove stale lock file {}", path.display())
            }
            FixAction::UpdateDependencies { packages } => {
                format!("Attempted to update {} packages", packages.len())
            }
            FixAction::ClearCache => "Clear cache".to_string(),
            FixAction::RestartService { name } => format!("Restart service {}", name),
            FixAction::RebuildFrontend => "Rebuild frontend".to_string(),
        }
    }
}

pub struct Fixers<'a> {
    config: &'a SweepConfig,
    packages: &'a dyn PackageManager,
}

impl<'a> Fixers<'a> {
    pub fn new(config: &'a SweepConfig, packages: &'a dyn PackageManager) -> Self {
        Self { config, packages }
    }

    pub fn apply(&self, action: &FixAction) -> bool {
        crate::log_status!("fix", "{}", action.describe());
        let success = match action {
            FixAction::RemoveStaleLock { path } => self.remove_stale_lock(path),
            FixAction::UpdateDependencies { packages } => self.update_dependencies(packages),
            FixAction::ClearCache => self.clear_cache(),
            FixAction::RestartService { name } => self.restart_service(name),
            FixAction::RebuildFrontend => self.rebuild_frontend(),
        };
        crate::log_verbose!(
            "fix",
            "{}: {}",
            action.describe(),
            if success { "ok" } else { "failed" }
        );
        success
    }

    /// Delete the lock file. Already gone counts as success.
    pub fn remove_stale_lock(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => {
                crate::log_status!("fix", "Removed stale lock file {}", path.display());
                true
            }
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                crate::log_status!("fix", "Failed to remove {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Upgrade up to `max_dependency_upgrades` packages, one at a time.
    ///
    /// Requires `AUTO_UPDATE_DEPENDENCIES`; without it the package manager is
    /// never invoked. Stops at the first failed upgrade.
    pub fn update_dependencies(&self, packages: &[OutdatedPackage]) -> bool {
        if !self.config.auto_update_dependencies() {
            crate::log_status!("fix", "Dependency auto-update disabled");
            return false;
        }

        let limit = self.config.defaults.max_dependency_upgrades;
        for package in packages.iter().take(limit) {
            if let Err(err) = self.packages.upgrade(&package.name) {
                crate::log_status!("fix", "Failed to update {}: {}", package.name, err.message);
                return false;
            }
            crate::log_verbose!(
                "fix",
                "Updated {} {} -> {}",
                package.name,
                package.current_version,
                package.latest_version
            );
        }
        true
    }

    /// Flush the default Redis database. False when `REDIS_URL` is unset.
    pub fn clear_cache(&self) -> bool {
        let Some(url) = self.config.redis_url() else {
            crate::log_status!("fix", "REDIS_URL not set, skipping cache clear");
            return false;
        };

        match flush_redis(url, self.config.defaults.timeouts.http()) {
            Ok(()) => true,
            Err(err) => {
                crate::log_status!(
                    "fix",
                    "Cache clear failed for {}: {}",
                    crate::mask::mask_url(url),
                    err.message
                );
                false
            }
        }
    }

    /// No process manager is available here; always false.
    pub fn restart_service(&self, name: &str) -> bool {
        crate::log_status!("fix", "Restarting {} is not supported in this deployment", name);
        false
    }

    /// Run the frontend build when the project descriptor exists.
    pub fn rebuild_frontend(&self) -> bool {
        let frontend = &self.config.defaults.frontend;
        let dir = self.config.resolve(&frontend.dir);
        if !dir.join(&frontend.descriptor).is_file() {
            crate::log_status!(
                "fix",
                "No {} in {}, skipping frontend rebuild",
                frontend.descriptor,
                dir.display()
            );
            return false;
        }

        match command::run_with_timeout(
            &frontend.build_command,
            &[],
            &dir,
            self.config.defaults.timeouts.build(),
        ) {
            Ok(_) => true,
            Err(err) => {
                crate::log_status!("fix", "Frontend build failed: {}", err.message);
                false
            }
        }
    }
}

/// Connection setup may send commands before `FLUSHDB`, so the whole
/// exchange runs on a worker bounded by `timeout`.
fn flush_redis(url: &str, timeout: Duration) -> Result<()> {
    let url = url.to_string();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(flush_redis_blocking(&url, timeout));
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(_) => Err(Error::internal_unexpected(format!(
            "FLUSHDB did not complete within {}s",
            timeout.as_secs()
        ))),
    }
}

fn flush_redis_blocking(url: &str, timeout: Duration) -> Result<()> {
    let client = redis::Client::open(url)
        .map_err(|e| Error::config_invalid_value("REDIS_URL", None, e.to_string()))?;
    let mut conn = client
        .get_connection_with_timeout(timeout)
        .map_err(|e| Error::http_transport(crate::mask::mask_url(url), e.to_string()))?;
    conn.set_read_timeout(Some(timeout))
        .and_then(|()| conn.set_write_timeout(Some(timeout)))
        .map_err(|e| Error::internal_unexpected(format!("Redis socket setup failed: {}", e)))?;
    redis::cmd("FLUSHDB")
        .query::<()>(&mut conn)
        .map_err(|e| Error::internal_unexpected(format!("FLUSHDB failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records upgrade calls; fails on the package named `broken`.
    #[derive(Default)]
    struct RecordingManager {
        upgraded: Mutex<Vec<String>>,
    }

    impl PackageManager for RecordingManager {
        fn list_outdated(&self, _manifest: &Path) -> Result<Vec<OutdatedPackage>> {
            Ok(Vec::new())
        }

        fn upgrade(&self, package: &str) -> Result<()> {
            self.upgraded.lock().unwrap().push(package.to_string());
            if package == "broken" {
                return Err(Error::internal_unexpected("upgrade failed"));
            }
            Ok(())
        }
    }

    fn packages(names: &[&str]) -> Vec<OutdatedPackage> {
        names
            .iter()
            .map(|name| OutdatedPackage {
                name: name.to_string(),
                current_version: "1.0".to_string(),
                latest_version: "2.0".to_string(),
            })
            .collect()
    }

    fn config(vars: &[(&str, &str)], dir: &Path) -> SweepConfig {
        SweepConfig::from_vars(vars.iter().copied(), dir)
    }

    #[test]
    fn stale_lock_removal_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("empire.lock");
        fs::write(&lock, "999999").unwrap();
        let config = config(&[], dir.path());
        let manager = RecordingManager::default();
        let fixers = Fixers::new(&config, &manager);

        assert!(fixers.remove_stale_lock(&lock));
        assert!(!lock.exists());
        assert!(fixers.remove_stale_lock(&lock));
    }

    #[test]
    fn dependency_update_is_gated_by_flag() {
        let dir = TempDir::new().unwrap();
        let config = config(&[], dir.path());
        let manager = RecordingManager::default();

        assert!(!Fixers::new(&config, &manager).update_dependencies(&packages(&["requests"])));
        assert!(manager.upgraded.lock().unwrap().is_empty());
    }

    #[test]
    fn dependency_update_is_bounded() {
        let dir = TempDir::new().unwrap();
        let config = config(&[("AUTO_UPDATE_DEPENDENCIES", "true")], dir.path());
        let manager = RecordingManager::default();

        let list = packages(&["a", "b", "c", "d", "e", "f", "g"]);
        assert!(Fixers::new(&config, &manager).update_dependencies(&list));
        assert_eq!(*manager.upgraded.lock().unwrap(), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn dependency_update_stops_at_first_failure() {
        let dir = TempDir::new().unwrap();
        let config = config(&[("AUTO_UPDATE_DEPENDENCIES", "1")], dir.path());
        let manager = RecordingManager::default();

        let list = packages(&["a", "broken", "c"]);
        assert!(!Fixers::new(&config, &manager).update_dependencies(&list));
        assert_eq!(*manager.upgraded.lock().unwrap(), vec!["a", "broken"]);
    }

    #[test]
    fn cache_clear_without_redis_is_false() {
        let dir = TempDir::new().unwrap();
        let config = config(&[], dir.path());
        let manager = RecordingManager::default();
        assert!(!Fixers::new(&config, &manager).clear_cache());
    }

    #[test]
    fn cache_clear_on_unreachable_redis_is_false() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&[("REDIS_URL", "redis://127.0.0.1:1/0")], dir.path());
        config.defaults.timeouts.http_secs = 1;
        let manager = RecordingManager::default();
        assert!(!Fixers::new(&config, &manager).clear_cache());
    }

    #[test]
    fn cache_clear_on_stalled_redis_is_bounded() {
        use std::net::TcpListener;
        use std::time::Instant;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        std::thread::spawn(move || {
            let (_stream, _) = listener.accept().unwrap();
            std::thread::sleep(Duration::from_secs(20));
        });

        let dir = TempDir::new().unwrap();
        let url = format!("redis://127.0.0.1:{}/0", port);
        let mut config = config(&[("REDIS_URL", url.as_str())], dir.path());
        config.defaults.timeouts.http_secs = 1;
        let manager = RecordingManager::default();

        let started = Instant::now();
        assert!(!Fixers::new(&config, &manager).clear_cache());
        assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
    }

    #[test]
    fn restart_is_unsupported() {
        let dir = TempDir::new().unwrap();
        let config = config(&[], dir.path());
        let manager = RecordingManager::default();
        let fixers = Fixers::new(&config, &manager);

        let action = FixAction::RestartService { name: "aether-api".to_string() };
        assert!(!fixers.apply(&action));
        assert_eq!(action.describe(), "Restart service aether-api");
    }

    #[test]
    fn rebuild_without_descriptor_is_false() {
        let dir = TempDir::new().unwrap();
        let config = config(&[], dir.path());
        let manager = RecordingManager::default();
        assert!(!Fixers::new(&config, &manager).apply(&FixAction::RebuildFrontend));
    }

    #[cfg(unix)]
    #[test]
    fn rebuild_runs_build_command_in_frontend_dir() {
        let dir = TempDir::new().unwrap();
        let frontend = dir.path().join("frontend");
        fs::create_dir(&frontend).unwrap();
        fs::write(frontend.join("package.json"), "{}").unwrap();

        let mut config = config(&[], dir.path());
        config.defaults.frontend.build_command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "touch built.marker".to_string(),
        ];
        let manager = RecordingManager::default();

        assert!(Fixers::new(&config, &manager).rebuild_frontend());
        assert!(frontend.join("built.marker").exists());

        config.defaults.frontend.build_command =
            vec!["sh".to_string(), "-c".to_string(), "exit 2".to_string()];
        assert!(!Fixers::new(&config, &manager).rebuild_frontend());
    }

    #[test]
    fn stale_lock_description_names_the_path() {
        let action = FixAction::RemoveStaleLock {
            path: PathBuf::from("/tmp/empire_automation.lock"),
        };
        assert_eq!(
            action.describe(),
            "Remove stale lock file /tmp/empire_automation.lock"
        );
    }
}
