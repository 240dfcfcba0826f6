use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// All sweep settings that can be overridden via sweep.json.
///
/// Credentials never live here; they come from the environment snapshot in
/// `config::SweepConfig`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    #[serde(default = "default_render_api_base")]
    pub render_api_base: String,

    #[serde(default = "default_vercel_api_base")]
    pub vercel_api_base: String,

    #[serde(default = "default_frontend_routes")]
    pub frontend_routes: Vec<FrontendRoute>,

    #[serde(default = "default_static_files")]
    pub static_files: Vec<String>,

    #[serde(default = "default_dependency_manifests")]
    pub dependency_manifests: Vec<String>,

    #[serde(default)]
    pub package_manager: PackageManagerConfig,

    #[serde(default = "default_max_dependency_upgrades")]
    pub max_dependency_upgrades: usize,

    #[serde(default)]
    pub frontend: FrontendBuildConfig,

    #[serde(default = "default_report_path")]
    pub report_path: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeouts: TimeoutsConfig::default(),
            render_api_base: default_render_api_base(),
            vercel_api_base: default_vercel_api_base(),
            frontend_routes: default_frontend_routes(),
            static_files: default_static_files(),
            dependency_manifests: default_dependency_manifests(),
            package_manager: PackageManagerConfig::default(),
            max_dependency_upgrades: default_max_dependency_upgrades(),
            frontend: FrontendBuildConfig::default(),
            report_path: default_report_path(),
        }
    }
}

/// Per-suspension-point timeouts, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    #[serde(default = "default_http_secs")]
    pub http_secs: u64,

    #[serde(default = "default_database_connect_secs")]
    pub database_connect_secs: u64,

    #[serde(default = "default_package_list_secs")]
    pub package_list_secs: u64,

    #[serde(default = "default_package_upgrade_secs")]
    pub package_upgrade_secs: u64,

    #[serde(default = "default_build_secs")]
    pub build_secs: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            http_secs: default_http_secs(),
            database_connect_secs: default_database_connect_secs(),
            package_list_secs: default_package_list_secs(),
            package_upgrade_secs: default_package_upgrade_secs(),
            build_secs: default_build_secs(),
        }
    }
}

impl TimeoutsConfig {
    pub fn http(&self) -> Duration {
        Duration::from_secs(self.http_secs)
    }

    pub fn database_connect(&self) -> Duration {
        Duration::from_secs(self.database_connect_secs)
    }

    pub fn package_list(&self) -> Duration {
        Duration::from_secs(self.package_list_secs)
    }

    pub fn package_upgrade(&self) -> Duration {
        Duration::from_secs(self.package_upgrade_secs)
    }

    pub fn build(&self) -> Duration {
        Duration::from_secs(self.build_secs)
    }
}

/// A frontend route probed relative to `FRONTEND_URL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendRoute {
    pub path: String,
    pub name: String,
}

/// Package manager invocations, as program followed by arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageManagerConfig {
    #[serde(default = "default_list_outdated_command")]
    pub list_outdated: Vec<String>,

    /// The package name is appended as the final argument.
    #[serde(default = "default_upgrade_command")]
    pub upgrade: Vec<String>,
}

impl Default for PackageManagerConfig {
    fn default() -> Self {
        Self {
            list_outdated: default_list_outdated_command(),
            upgrade: default_upgrade_command(),
        }
    }
}

/// Frontend project used by the rebuild fixer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendBuildConfig {
    #[serde(default = "default_frontend_dir")]
    pub dir: String,

    #[serde(default = "default_frontend_descriptor")]
    pub descriptor: String,

    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,
}

impl Default for FrontendBuildConfig {
    fn default() -> Self {
        Self {
            dir: default_frontend_dir(),
            descriptor: default_frontend_descriptor(),
            build_command: default_build_command(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_http_secs() -> u64 {
    10
}

fn default_database_connect_secs() -> u64 {
    5
}

fn default_package_list_secs() -> u64 {
    30
}

fn default_package_upgrade_secs() -> u64 {
    60
}

fn default_build_secs() -> u64 {
    300
}

fn default_render_api_base() -> String {
    "https://api.render.com/v1".to_string()
}

fn default_vercel_api_base() -> String {
    "https://api.vercel.com/v9".to_string()
}

fn default_frontend_routes() -> Vec<FrontendRoute> {
    [("/", "Home"), ("/dev", "Dev Dashboard"), ("/live", "Live Dashboard")]
        .into_iter()
        .map(|(path, name)| FrontendRoute {
            path: path.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn default_static_files() -> Vec<String> {
    vec![
        "index.html".to_string(),
        "app.js".to_string(),
        "style.css".to_string(),
    ]
}

fn default_dependency_manifests() -> Vec<String> {
    vec![
        "backend/requirements.txt".to_string(),
        "requirements.txt".to_string(),
    ]
}

fn default_list_outdated_command() -> Vec<String> {
    vec![
        "pip".to_string(),
        "list".to_string(),
        "--outdated".to_string(),
        "--format=json".to_string(),
    ]
}

fn default_upgrade_command() -> Vec<String> {
    vec![
        "pip".to_string(),
        "install".to_string(),
        "--upgrade".to_string(),
    ]
}

fn default_max_dependency_upgrades() -> usize {
    5
}

fn default_frontend_dir() -> String {
    "frontend".to_string()
}

fn default_frontend_descriptor() -> String {
    "package.json".to_string()
}

fn default_build_command() -> Vec<String> {
    vec!["npm".to_string(), "run".to_string(), "build".to_string()]
}

fn default_report_path() -> String {
    "sweep_report.json".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Load settings from a sweep.json file, merging with built-in defaults.
///
/// A missing file yields the built-in defaults. An unreadable or invalid file
/// is an error.
pub fn load_from(path: &Path) -> crate::Result<Defaults> {
    if !path.exists() {
        return Ok(Defaults::default());
    }

    let content = fs::read_to_string(path).map_err(|e| {
        crate::Error::internal_io(e.to_string(), Some(format!("read {}", path.display())))
    })?;

    serde_json::from_str(&content)
        .map_err(|e| crate::Error::config_invalid_json(path.display().to_string(), e))
}
