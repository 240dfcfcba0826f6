//! Process liveness for lock-file owners.

/// Whether `pid` names a live process.
///
/// Uses signal 0, which performs the permission and existence checks without
/// delivering anything. `EPERM` means the process exists but belongs to
/// another user, so it still counts as alive.
#[cfg(unix)]
pub fn is_alive(pid: i32) -> bool {
    // 0 and negatives address process groups, never a single owner.
    if pid <= 0 {
        return false;
    }

    // SAFETY: signal 0 delivers nothing and kill(2) touches no memory.
    let rc = unsafe { libc::kill(pid, 0) };
    if rc == 0 {
        return true;
    }

    std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

/// SIGKILL every process in group `pgid`. Errors (group already gone) are
/// ignored.
#[cfg(unix)]
pub fn kill_group(pgid: u32) {
    let Ok(pgid) = i32::try_from(pgid) else {
        return;
    };
    if pgid <= 0 {
        return;
    }
    // SAFETY: kill(2) with a negative pid signals a process group and
    // touches no memory.
    unsafe {
        libc::kill(-pgid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
pub fn kill_group(_pgid: u32) {}

#[cfg(not(unix))]
pub fn is_alive(_pid: i32) -> bool {
    // Without signal-0 probing every recorded owner is treated as live, so a
    // lock is never removed on a guess.
    true
}
