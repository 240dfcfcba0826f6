use std::path::{Path, PathBuf};

/// Default settings file name, resolved against the working directory.
pub const SETTINGS_FILE: &str = "sweep.json";

/// Resolve a configured path: expand `~`, then anchor relative paths at `base`.
pub fn resolve(base: &Path, raw: &str) -> PathBuf {
    let expanded = shellexpand::tilde(raw);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Settings file path: explicit override, else `<work_dir>/sweep.json`.
pub fn settings_file(work_dir: &Path, explicit: Option<&str>) -> PathBuf {
    resolve(work_dir, explicit.unwrap_or(SETTINGS_FILE))
}
