//! Process configuration snapshot.
//!
//! Built once at startup from the environment plus an optional sweep.json and
//! passed by reference into the agent, checkers and fixers. Nothing below the
//! CLI reads `std::env` directly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::defaults::{self, Defaults};
use crate::error::Result;
use crate::paths;

pub const RENDER_API_KEY: &str = "RENDER_API_KEY";
pub const RENDER_SERVICE_ID: &str = "RENDER_SERVICE_ID";
pub const VERCEL_TOKEN: &str = "VERCEL_TOKEN";
pub const VERCEL_PROJECT_ID: &str = "VERCEL_PROJECT_ID";
pub const BACKEND_URL: &str = "BACKEND_URL";
pub const FRONTEND_URL: &str = "FRONTEND_URL";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const PAYPAL_CLIENT_ID: &str = "PAYPAL_CLIENT_ID";
pub const PAYPAL_SECRET: &str = "PAYPAL_SECRET";
pub const PAYPAL_MODE: &str = "PAYPAL_MODE";
pub const STRIPE_API_KEY: &str = "STRIPE_API_KEY";
pub const REDIS_URL: &str = "REDIS_URL";
pub const SECRET_KEY: &str = "SECRET_KEY";
pub const AUTO_UPDATE_DEPENDENCIES: &str = "AUTO_UPDATE_DEPENDENCIES";
pub const EMPIRE_AUTOMATION_ENABLED: &str = "EMPIRE_AUTOMATION_ENABLED";
pub const EMPIRE_LOCK_FILE: &str = "EMPIRE_LOCK_FILE";
pub const SWEEP_CONFIG: &str = "SWEEP_CONFIG";
pub const SWEEP_REPORT_PATH: &str = "SWEEP_REPORT_PATH";

/// Keys whose absence is an error.
pub const REQUIRED_KEYS: &[&str] = &[
    DATABASE_URL,
    PAYPAL_CLIENT_ID,
    PAYPAL_SECRET,
    RENDER_API_KEY,
    RENDER_SERVICE_ID,
];

/// Keys whose absence is only a warning.
pub const OPTIONAL_KEYS: &[&str] = &[VERCEL_TOKEN, VERCEL_PROJECT_ID, REDIS_URL, SECRET_KEY];

const KNOWN_KEYS: &[&str] = &[
    RENDER_API_KEY,
    RENDER_SERVICE_ID,
    VERCEL_TOKEN,
    VERCEL_PROJECT_ID,
    BACKEND_URL,
    FRONTEND_URL,
    DATABASE_URL,
    PAYPAL_CLIENT_ID,
    PAYPAL_SECRET,
    PAYPAL_MODE,
    STRIPE_API_KEY,
    REDIS_URL,
    SECRET_KEY,
    AUTO_UPDATE_DEPENDENCIES,
    EMPIRE_AUTOMATION_ENABLED,
    EMPIRE_LOCK_FILE,
    SWEEP_CONFIG,
    SWEEP_REPORT_PATH,
];

pub const DEFAULT_LOCK_FILE: &str = "/tmp/empire_automation.lock";
const DEFAULT_PAYPAL_MODE: &str = "sandbox";

#[derive(Clone)]
pub struct SweepConfig {
    vars: BTreeMap<String, String>,
    pub work_dir: PathBuf,
    pub defaults: Defaults,
}

// Values are credentials; only key names are ever printed.
impl fmt::Debug for SweepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweepConfig")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("work_dir", &self.work_dir)
            .field("defaults", &self.defaults)
            .finish()
    }
}

impl SweepConfig {
    /// Snapshot the process environment and load settings for `work_dir`.
    pub fn load(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = Self::from_vars(std::env::vars(), work_dir);
        let settings = paths::settings_file(&config.work_dir, config.get(SWEEP_CONFIG));
        let defaults = defaults::load_from(&settings)?;
        Ok(config.with_defaults(defaults))
    }

    /// Build from explicit key/value pairs with built-in defaults.
    ///
    /// Unknown keys are dropped and empty values count as absent.
    pub fn from_vars<I, K, V>(vars: I, work_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, v)| KNOWN_KEYS.contains(&k.as_str()) && !v.trim().is_empty())
            .collect();

        Self {
            vars,
            work_dir: work_dir.into(),
            defaults: Defaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    fn flag(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn render_api_key(&self) -> Option<&str> {
        self.get(RENDER_API_KEY)
    }

    pub fn render_service_id(&self) -> Option<&str> {
        self.get(RENDER_SERVICE_ID)
    }

    pub fn vercel_token(&self) -> Option<&str> {
        self.get(VERCEL_TOKEN)
    }

    pub fn vercel_project_id(&self) -> Option<&str> {
        self.get(VERCEL_PROJECT_ID)
    }

    pub fn backend_url(&self) -> Option<&str> {
        self.get(BACKEND_URL).map(|url| url.trim_end_matches('/'))
    }

    pub fn frontend_url(&self) -> Option<&str> {
        self.get(FRONTEND_URL).map(|url| url.trim_end_matches('/'))
    }

    pub fn database_url(&self) -> Option<&str> {
        self.get(DATABASE_URL)
    }

    pub fn paypal_client_id(&self) -> Option<&str> {
        self.get(PAYPAL_CLIENT_ID)
    }

    pub fn paypal_secret(&self) -> Option<&str> {
        self.get(PAYPAL_SECRET)
    }

    pub fn paypal_mode(&self) -> &str {
        self.get(PAYPAL_MODE).unwrap_or(DEFAULT_PAYPAL_MODE)
    }

    pub fn stripe_api_key(&self) -> Option<&str> {
        self.get(STRIPE_API_KEY)
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.get(REDIS_URL)
    }

    pub fn auto_update_dependencies(&self) -> bool {
        self.flag(AUTO_UPDATE_DEPENDENCIES)
    }

    pub fn automation_enabled(&self) -> bool {
        self.flag(EMPIRE_AUTOMATION_ENABLED)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.resolve(self.get(EMPIRE_LOCK_FILE).unwrap_or(DEFAULT_LOCK_FILE))
    }

    pub fn report_path(&self) -> PathBuf {
        let raw = self
            .get(SWEEP_REPORT_PATH)
            .unwrap_or(self.defaults.report_path.as_str());
        self.resolve(raw)
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        paths::resolve(&self.work_dir, raw)
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}
