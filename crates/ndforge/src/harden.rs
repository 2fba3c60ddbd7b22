//! Post-initialization privilege lock-down, applied once per peer before
//! its event loop starts.

/// Narrow what the process can do after sockets are open. Best effort: a
/// refusal is logged, not fatal, since the tool still works unhardened.
pub fn lock_down() {
    #[cfg(target_os = "linux")]
    {
        let res = unsafe { libc::prctl(libc::PR_SET_NO_NEW_PRIVS, 1u64, 0u64, 0u64, 0u64) };
        if res != 0 {
            tracing::warn!(
                error = %std::io::Error::last_os_error(),
                "could not apply no_new_privs"
            );
        }
    }
}
