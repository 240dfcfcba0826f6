//! Lock file left by the automation cron wrapper.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::process;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    Absent,
    /// Owner is alive; the automation is running.
    Held { pid: i32 },
    /// Owner is gone; the file can be removed.
    Stale { pid: i32 },
    /// Present but not a usable PID record.
    Unreadable { error: String },
}

/// Read-only inspection; never modifies the file.
pub fn inspect(path: &Path) -> LockState {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return LockState::Absent,
        Err(e) => return LockState::Unreadable { error: e.to_string() },
    };

    let pid = match raw.trim().parse::<i32>() {
        Ok(pid) if pid > 0 => pid,
        _ => {
            return LockState::Unreadable {
                error: format!("invalid PID '{}'", raw.trim()),
            }
        }
    };

    if process::is_alive(pid) {
        LockState::Held { pid }
    } else {
        LockState::Stale { pid }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(inspect(&dir.path().join("empire.lock")), LockState::Absent);
    }

    #[test]
    fn live_owner_holds_the_lock() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("empire.lock");
        let pid = std::process::id() as i32;
        fs::write(&lock, format!("{}\n", pid)).unwrap();

        assert_eq!(inspect(&lock), LockState::Held { pid });
    }

    #[test]
    fn dead_owner_is_stale_and_file_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("empire.lock");
        fs::write(&lock, i32::MAX.to_string()).unwrap();

        assert_eq!(inspect(&lock), LockState::Stale { pid: i32::MAX });
        assert!(lock.exists());
    }

    #[test]
    fn garbage_and_group_pids_are_unreadable() {
        let dir = TempDir::new().unwrap();
        let lock = dir.path().join("empire.lock");

        for content in ["not-a-pid", "0", "-12", ""] {
            fs::write(&lock, content).unwrap();
            assert!(matches!(inspect(&lock), LockState::Unreadable { .. }), "{:?}", content);
        }
    }
}
