//! Database reachability: one connection, one `SELECT 1`, no pool.

use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use postgres::NoTls;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

use super::{error_details, Probe};
use crate::config::SweepConfig;
use crate::mask::mask_url;
use crate::report::Details;
use crate::status::DatabaseStatus;

/// Why a round-trip failed; `kind` lands in `details.error_type`.
#[derive(Debug)]
struct DbFailure {
    kind: &'static str,
    message: String,
}

impl DbFailure {
    fn new(kind: &'static str, message: impl ToString) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

pub struct DatabaseChecker<'a> {
    config: &'a SweepConfig,
}

impl<'a> DatabaseChecker<'a> {
    pub fn new(config: &'a SweepConfig) -> Self {
        Self { config }
    }

    pub fn check(&self) -> Probe<DatabaseStatus> {
        let Some(url) = self.config.database_url() else {
            return (DatabaseStatus::Unconfigured, error_details("DATABASE_URL not set"));
        };

        let mut details = Details::new();
        details.insert("configured".to_string(), Value::Bool(true));
        details.insert("url_pattern".to_string(), Value::String(mask_url(url)));

        let timeout = self.config.defaults.timeouts.database_connect();
        let outcome = match scheme_of(url) {
            Some("postgres" | "postgresql") => ping_postgres(url, timeout),
            Some("sqlite") => self.ping_sqlite(url, timeout),
            Some(other) => Err(DbFailure::new(
                "UnsupportedScheme",
                format!("Unsupported database scheme '{}'", other),
            )),
            None => Err(DbFailure::new(
                "UnsupportedScheme",
                "DATABASE_URL has no scheme",
            )),
        };

        match outcome {
            Ok(()) => {
                details.insert("connection_successful".to_string(), Value::Bool(true));
                (DatabaseStatus::Healthy, details)
            }
            Err(failure) => {
                crate::log_verbose!("database", "{} ({})", failure.kind, mask_url(url));
                details.insert("error".to_string(), Value::String(failure.message));
                details.insert("error_type".to_string(), Value::String(failure.kind.to_string()));
                (DatabaseStatus::Error, details)
            }
        }
    }

    fn ping_sqlite(&self, url: &str, timeout: Duration) -> Result<(), DbFailure> {
        let raw = url.trim_start_matches("sqlite://");
        if raw.is_empty() {
            return Err(DbFailure::new("InvalidUrl", "sqlite URL has no path"));
        }
        let path = self.config.resolve(raw);
        ping_sqlite_file(&path, timeout)
    }
}

fn scheme_of(url: &str) -> Option<&str> {
    url.split_once("://")
        .map(|(scheme, _)| scheme)
        .filter(|scheme| !scheme.is_empty())
}

/// Bounds the whole round-trip: `connect_timeout` covers only the TCP
/// connect, not the startup handshake or the query. A wedged server leaves
/// the worker thread parked until the peer hangs up.
fn ping_postgres(url: &str, timeout: Duration) -> Result<(), DbFailure> {
    let url = url.to_string();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(postgres_round_trip(&url, timeout));
    });

    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(DbFailure::new(
            "TimeoutError",
            format!("No response within {}s", timeout.as_secs()),
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(DbFailure::new(
            "ConnectionError",
            "Database worker exited without a result",
        )),
    }
}

fn postgres_round_trip(url: &str, timeout: Duration) -> Result<(), DbFailure> {
    let mut config: postgres::Config = url
        .parse()
        .map_err(|e| DbFailure::new("InvalidUrl", e))?;
    config.connect_timeout(timeout);

    let mut client = config
        .connect(NoTls)
        .map_err(|e| DbFailure::new("ConnectionError", e))?;
    client
        .simple_query("SELECT 1")
        .map_err(|e| DbFailure::new("QueryError", e))?;
    Ok(())
}

// Read-only open: a missing file is an error, never created.
fn ping_sqlite_file(path: &Path, timeout: Duration) -> Result<(), DbFailure> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| DbFailure::new("ConnectionError", e))?;
    conn.busy_timeout(timeout)
        .map_err(|e| DbFailure::new("ConnectionError", e))?;

    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(|e| DbFailure::new("QueryError", e))?;
    Ok(())
}
