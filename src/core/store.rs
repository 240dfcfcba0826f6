//! Persisted copy of the most recent sweep report.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};
use crate::report::SweepReport;

/// Write the structured form to `path`, creating parent directories.
///
/// Writes to a sibling temp file and renames, so readers never observe a
/// half-written report.
pub fn save(report: &SweepReport, path: &Path) -> Result<()> {
    let json = report.to_json()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("write {}", tmp.display())))
    })?;
    fs::rename(&tmp, path).map_err(|e| {
        Error::internal_io(e.to_string(), Some(format!("rename to {}", path.display())))
    })
}

pub fn load(path: &Path) -> Result<SweepReport> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::report_not_found(path.display().to_string()))
        }
        Err(e) => {
            return Err(Error::internal_io(
                e.to_string(),
                Some(format!("read {}", path.display())),
            ))
        }
    };

    SweepReport::from_json(&raw)
}
